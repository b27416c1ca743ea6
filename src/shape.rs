//! Shapes one node or way element into its table rows.

use tracing::trace;

use crate::classify::TagClassifier;
use crate::error::{Error, Result};
use crate::record::{NodeRecord, ShapedElement, TagRecord, WayNodeRecord, WayRecord};
use crate::source::{Attributes, Element, ElementKind};

const TAG: &str = "tag";
const NODE_REF: &str = "nd";

pub struct Shaper {
    classifier: TagClassifier,
}

fn require(
    attributes: &Attributes,
    element: &'static str,
    id: Option<&str>,
    attribute: &'static str,
) -> Result<String> {
    attributes
        .get(attribute)
        .map(str::to_string)
        .ok_or_else(|| Error::MissingAttribute {
            element,
            id: id.map(str::to_string),
            attribute,
        })
}

impl Shaper {
    pub fn new(classifier: TagClassifier) -> Self {
        Shaper { classifier }
    }

    /// Relations and anything else that is not a node or way shape to `None`.
    pub fn shape(&self, element: &Element) -> Result<Option<ShapedElement>> {
        let shaped = match element.kind {
            ElementKind::Node => self.shape_node(element)?,
            ElementKind::Way => self.shape_way(element)?,
            ElementKind::Relation => return Ok(None),
        };
        trace!(
            kind = element.kind.as_str(),
            id = shaped.id(),
            tags = shaped.tags().len(),
            "shaped element"
        );
        Ok(Some(shaped))
    }

    fn shape_node(&self, element: &Element) -> Result<ShapedElement> {
        let attributes = &element.attributes;
        let id = require(attributes, "node", None, "id")?;
        let field = |name| require(attributes, "node", Some(id.as_str()), name);

        let node = NodeRecord {
            lat: field("lat")?,
            lon: field("lon")?,
            user: field("user")?,
            uid: field("uid")?,
            version: field("version")?,
            changeset: field("changeset")?,
            timestamp: field("timestamp")?,
            id: id.clone(),
        };
        let tags = self.shape_tags(&node.id, element)?;
        Ok(ShapedElement::Node { node, tags })
    }

    fn shape_way(&self, element: &Element) -> Result<ShapedElement> {
        let attributes = &element.attributes;
        let id = require(attributes, "way", None, "id")?;
        let field = |name| require(attributes, "way", Some(id.as_str()), name);

        let way = WayRecord {
            user: field("user")?,
            uid: field("uid")?,
            version: field("version")?,
            changeset: field("changeset")?,
            timestamp: field("timestamp")?,
            id: id.clone(),
        };

        let nodes = element
            .children_named(NODE_REF)
            .enumerate()
            .map(|(position, child)| {
                Ok(WayNodeRecord {
                    id: way.id.clone(),
                    node_id: require(&child.attributes, NODE_REF, Some(way.id.as_str()), "ref")?,
                    position,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let tags = self.shape_tags(&way.id, element)?;
        Ok(ShapedElement::Way { way, nodes, tags })
    }

    fn shape_tags(&self, owner_id: &str, element: &Element) -> Result<Vec<TagRecord>> {
        let mut tags = Vec::new();
        for child in element.children_named(TAG) {
            let key = require(&child.attributes, TAG, Some(owner_id), "k")?;
            if self.classifier.is_problem_key(&key) {
                trace!(
                    owner_id,
                    key = key.as_str(),
                    "dropping tag with problem characters in key"
                );
                continue;
            }
            let value = require(&child.attributes, TAG, Some(owner_id), "v")?;
            tags.extend(self.classifier.classify(owner_id, &key, &value));
        }
        Ok(tags)
    }
}
