//! Drives the conversion one element at a time: read, shape, validate, write.

use std::io::{BufRead, Write};

use tracing::info;

use crate::classify::TagClassifier;
use crate::config::Config;
use crate::error::Result;
use crate::record::ShapedElement;
use crate::shape::Shaper;
use crate::source::{Element, ElementSource};
use crate::validate::{SchemaValidator, Validate};
use crate::writer::CsvTables;

/// Row counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessStats {
    pub nodes: usize,
    pub ways: usize,
    pub node_tags: usize,
    pub way_tags: usize,
    pub way_nodes: usize,
    pub dropped_tags: usize,
    pub skipped_elements: usize,
}

impl ProcessStats {
    pub fn elements(&self) -> usize {
        self.nodes + self.ways + self.skipped_elements
    }

    fn record(&mut self, element: &Element, shaped: &ShapedElement) {
        let tag_children = element.children_named("tag").count();
        self.dropped_tags += tag_children.saturating_sub(shaped.tags().len());
        match shaped {
            ShapedElement::Node { tags, .. } => {
                self.nodes += 1;
                self.node_tags += tags.len();
            }
            ShapedElement::Way { nodes, tags, .. } => {
                self.ways += 1;
                self.way_nodes += nodes.len();
                self.way_tags += tags.len();
            }
        }
    }
}

/// Streams every element of `source` into `tables`.
///
/// The first error of any kind stops the run; rows already written stay in
/// the tables and should be treated as incomplete. `on_element` is called
/// after each element is consumed, for progress reporting.
pub fn process_elements<R, W>(
    source: ElementSource<R>,
    shaper: &Shaper,
    validator: Option<&dyn Validate>,
    tables: &mut CsvTables<W>,
    mut on_element: impl FnMut(&ProcessStats),
) -> Result<ProcessStats>
where
    R: BufRead,
    W: Write,
{
    let mut stats = ProcessStats::default();

    for element in source {
        let element = element?;
        match shaper.shape(&element)? {
            Some(shaped) => {
                if let Some(validator) = validator {
                    validator.validate(&shaped)?;
                }
                tables.write(&shaped)?;
                stats.record(&element, &shaped);
            }
            None => stats.skipped_elements += 1,
        }
        on_element(&stats);
    }

    tables.flush()?;
    Ok(stats)
}

/// Converts the document at `config.input` into the five table files.
pub fn process_map(config: &Config) -> Result<ProcessStats> {
    process_map_with_progress(config, |_| {})
}

pub fn process_map_with_progress(
    config: &Config,
    on_element: impl FnMut(&ProcessStats),
) -> Result<ProcessStats> {
    info!(
        input = %config.input.display(),
        output = %config.output.dir().display(),
        validate = config.validate,
        "processing map"
    );

    let shaper = Shaper::new(TagClassifier::new(config.classifier.clone())?);
    let source = ElementSource::from_path(&config.input)?;
    let mut tables = CsvTables::create(&config.output)?;
    let validator = SchemaValidator;
    let validator = config.validate.then_some(&validator as &dyn Validate);

    let stats = process_elements(source, &shaper, validator, &mut tables, on_element)?;

    info!(
        nodes = stats.nodes,
        ways = stats.ways,
        node_tags = stats.node_tags,
        way_tags = stats.way_tags,
        way_nodes = stats.way_nodes,
        dropped_tags = stats.dropped_tags,
        skipped = stats.skipped_elements,
        "finished processing map"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassifierConfig;
    use crate::error::Error;
    use crate::record::Table;

    const OSM_SAMPLE: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<osm version="0.6" generator="test">
  <node id="1" lat="25.1" lon="-80.2" user="a" uid="1" version="1" changeset="1" timestamp="T"/>
  <node id="2" lat="25.2" lon="-80.3" user="b" uid="2" version="1" changeset="1" timestamp="T">
    <tag k="addr:postcode" v="FL 33101-2345"/>
    <tag k="bad.key" v="x"/>
  </node>
  <way id="10" user="c" uid="3" version="1" changeset="1" timestamp="T">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="name" v="Main St"/>
  </way>
  <relation id="100" user="d" uid="4" version="1" changeset="1" timestamp="T">
    <member type="way" ref="10" role=""/>
  </relation>
</osm>
"#;

    fn shaper() -> Shaper {
        Shaper::new(TagClassifier::new(ClassifierConfig::default()).unwrap())
    }

    fn run(xml: &str, validator: Option<&dyn Validate>) -> (Result<ProcessStats>, Vec<String>) {
        let mut tables =
            CsvTables::new(Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new()).unwrap();
        let result = process_elements(
            ElementSource::new(xml.as_bytes()),
            &shaper(),
            validator,
            &mut tables,
            |_| {},
        );
        let files = tables
            .into_inner()
            .unwrap()
            .into_iter()
            .map(|bytes| String::from_utf8(bytes).unwrap())
            .collect();
        (result, files)
    }

    #[test]
    fn counts_rows_per_table() {
        let (result, files) = run(OSM_SAMPLE, None);
        let stats = result.unwrap();

        assert_eq!(
            stats,
            ProcessStats {
                nodes: 2,
                ways: 1,
                node_tags: 1,
                way_tags: 1,
                way_nodes: 2,
                dropped_tags: 1,
                skipped_elements: 1,
            }
        );
        assert_eq!(stats.elements(), 4);
        assert_eq!(files[1], "id,key,value,type\n2,postcode,33101,addr\n");
        assert_eq!(files[3], "id,node_id,position\n10,1,0\n10,2,1\n");
        assert_eq!(files[4], "id,key,value,type\n10,name,Main St,regular\n");
    }

    #[test]
    fn progress_callback_sees_every_element() {
        let mut tables =
            CsvTables::new(Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new()).unwrap();
        let mut seen = Vec::new();
        process_elements(
            ElementSource::new(OSM_SAMPLE.as_bytes()),
            &shaper(),
            None,
            &mut tables,
            |stats| seen.push(stats.elements()),
        )
        .unwrap();
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn validation_failure_stops_before_writing_the_element() {
        let xml = r#"<osm>
  <node id="1" lat="25.1" lon="-80.2" user="a" uid="1" version="1" changeset="1" timestamp="T"/>
  <node id="2" lat="north" lon="-80.2" user="a" uid="1" version="1" changeset="1" timestamp="T"/>
  <node id="3" lat="25.3" lon="-80.2" user="a" uid="1" version="1" changeset="1" timestamp="T"/>
</osm>"#;
        let (result, files) = run(xml, Some(&SchemaValidator));

        match result {
            Err(Error::Validation(err)) => {
                assert_eq!(err.table, Table::Nodes);
                assert_eq!(err.field, "lat");
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
        assert_eq!(files[0].lines().count(), 2);
    }

    #[test]
    fn without_validation_bad_values_pass_through() {
        let xml = r#"<osm><node id="x" lat="north" lon="?" user="a" uid="1" version="1" changeset="1" timestamp="T"/></osm>"#;
        let (result, files) = run(xml, None);
        assert_eq!(result.unwrap().nodes, 1);
        assert!(files[0].ends_with("x,north,?,a,1,1,1,T\n"));
    }

    #[test]
    fn missing_attribute_aborts_the_run() {
        let xml = r#"<osm>
  <way id="5" user="u" uid="1" version="1" timestamp="T"><nd ref="1"/></way>
  <node id="3" lat="25.3" lon="-80.2" user="a" uid="1" version="1" changeset="1" timestamp="T"/>
</osm>"#;
        let (result, files) = run(xml, None);
        assert!(matches!(
            result,
            Err(Error::MissingAttribute {
                element: "way",
                attribute: "changeset",
                ..
            })
        ));
        assert_eq!(files[0], "id,lat,lon,user,uid,version,changeset,timestamp\n");
    }
}
