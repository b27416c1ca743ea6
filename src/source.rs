//! Streaming reader that turns an OSM XML document into one element at a time.
//!
//! Only the subtree of the element being built is held in memory; everything
//! else is discarded as soon as the pull parser moves past it.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};

/// Top-level element kinds the source yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Node,
    Way,
    Relation,
}

impl ElementKind {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"node" => Some(ElementKind::Node),
            b"way" => Some(ElementKind::Way),
            b"relation" => Some(ElementKind::Relation),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Way => "way",
            ElementKind::Relation => "relation",
        }
    }
}

/// Attributes of one XML element, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn read(event: &BytesStart<'_>) -> Result<Self> {
        let mut attributes = Vec::new();
        for attr in event.attributes().with_checks(false) {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            attributes.push((key, attr.unescape_value()?.into_owned()));
        }
        Ok(Attributes(attributes))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Attributes(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// A descendant of a top-level element, such as `<tag>` or `<nd>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub name: String,
    pub attributes: Attributes,
}

impl Child {
    fn read(event: &BytesStart<'_>) -> Result<Self> {
        Ok(Child {
            name: String::from_utf8_lossy(event.name().as_ref()).into_owned(),
            attributes: Attributes::read(event)?,
        })
    }
}

/// A fully materialized node, way or relation.
///
/// `children` holds every descendant element in document order, flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub attributes: Attributes,
    pub children: Vec<Child>,
}

impl Element {
    pub fn new(kind: ElementKind, attributes: Attributes) -> Self {
        Element {
            kind,
            attributes,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, name: &str, attributes: Attributes) -> Self {
        self.children.push(Child {
            name: name.to_string(),
            attributes,
        });
        self
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Child> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    fn read(kind: ElementKind, event: &BytesStart<'_>) -> Result<Self> {
        Ok(Element::new(kind, Attributes::read(event)?))
    }
}

/// Forward-only iterator over the nodes, ways and relations of a document.
///
/// After the first error the iterator is exhausted.
pub struct ElementSource<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    finished: bool,
}

impl ElementSource<BufReader<File>> {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(ElementSource::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ElementSource<R> {
    pub fn new(input: R) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.trim_text(true);
        ElementSource {
            reader,
            buf: Vec::new(),
            finished: false,
        }
    }

    fn next_element(&mut self) -> Result<Option<Element>> {
        let mut current: Option<Element> = None;
        let mut depth = 0usize;

        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Eof => {
                    return match current {
                        Some(element) => Err(Error::Truncated {
                            element: element.kind.as_str(),
                        }),
                        None => Ok(None),
                    };
                }
                Event::Start(e) => {
                    if let Some(element) = current.as_mut() {
                        element.children.push(Child::read(&e)?);
                        depth += 1;
                    } else if let Some(kind) = ElementKind::from_name(e.name().as_ref()) {
                        current = Some(Element::read(kind, &e)?);
                        depth = 1;
                    }
                }
                Event::Empty(e) => {
                    if let Some(element) = current.as_mut() {
                        element.children.push(Child::read(&e)?);
                    } else if let Some(kind) = ElementKind::from_name(e.name().as_ref()) {
                        return Ok(Some(Element::read(kind, &e)?));
                    }
                }
                Event::End(_) => {
                    if current.is_some() {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(current);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for ElementSource<R> {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_element() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
