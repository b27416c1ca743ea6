//! Per-table schema checks for shaped elements.
//!
//! Validation is optional and much slower than shaping alone, so the
//! pipeline only runs it when asked to.

use crate::error::ValidationError;
use crate::record::{NodeRecord, ShapedElement, Table, TagRecord, WayNodeRecord, WayRecord};

/// Checks a shaped element before any of its rows are written.
pub trait Validate {
    fn validate(&self, element: &ShapedElement) -> Result<(), ValidationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldType {
    Integer,
    Float,
    Text,
}

impl FieldType {
    fn check(self, value: &str) -> Option<&'static str> {
        match self {
            FieldType::Integer => value
                .parse::<i64>()
                .is_err()
                .then_some("must be of integer type"),
            FieldType::Float => match value.parse::<f64>() {
                Ok(number) if number.is_finite() => None,
                _ => Some("must be of float type"),
            },
            FieldType::Text => None,
        }
    }
}

/// The built-in schema: integer ids and counters, float coordinates,
/// free text everywhere else.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

type Row<'a> = Vec<(&'static str, &'a str, FieldType)>;

fn node_row(node: &NodeRecord) -> Row<'_> {
    vec![
        ("id", node.id.as_str(), FieldType::Integer),
        ("lat", node.lat.as_str(), FieldType::Float),
        ("lon", node.lon.as_str(), FieldType::Float),
        ("user", node.user.as_str(), FieldType::Text),
        ("uid", node.uid.as_str(), FieldType::Integer),
        ("version", node.version.as_str(), FieldType::Text),
        ("changeset", node.changeset.as_str(), FieldType::Integer),
        ("timestamp", node.timestamp.as_str(), FieldType::Text),
    ]
}

fn way_row(way: &WayRecord) -> Row<'_> {
    vec![
        ("id", way.id.as_str(), FieldType::Integer),
        ("user", way.user.as_str(), FieldType::Text),
        ("uid", way.uid.as_str(), FieldType::Integer),
        ("version", way.version.as_str(), FieldType::Text),
        ("changeset", way.changeset.as_str(), FieldType::Integer),
        ("timestamp", way.timestamp.as_str(), FieldType::Text),
    ]
}

fn way_node_row(way_node: &WayNodeRecord) -> Row<'_> {
    vec![
        ("id", way_node.id.as_str(), FieldType::Integer),
        ("node_id", way_node.node_id.as_str(), FieldType::Integer),
    ]
}

fn tag_row(tag: &TagRecord) -> Row<'_> {
    vec![
        ("id", tag.id.as_str(), FieldType::Integer),
        ("key", tag.key.as_str(), FieldType::Text),
        ("value", tag.value.as_str(), FieldType::Text),
        ("type", tag.category.as_str(), FieldType::Text),
    ]
}

fn check_row(table: Table, index: Option<usize>, row: Row<'_>) -> Result<(), ValidationError> {
    for (name, value, field_type) in row {
        if let Some(problem) = field_type.check(value) {
            let field = match index {
                Some(index) => format!("[{index}].{name}"),
                None => name.to_string(),
            };
            return Err(ValidationError {
                table,
                field,
                problems: vec![format!("{problem} (got {value:?})")],
            });
        }
    }
    Ok(())
}

fn check_rows<'a, T: 'a>(
    table: Table,
    rows: &'a [T],
    to_row: fn(&'a T) -> Row<'a>,
) -> Result<(), ValidationError> {
    rows.iter()
        .enumerate()
        .try_for_each(|(index, row)| check_row(table, Some(index), to_row(row)))
}

impl Validate for SchemaValidator {
    fn validate(&self, element: &ShapedElement) -> Result<(), ValidationError> {
        match element {
            ShapedElement::Node { node, tags } => {
                check_row(Table::Nodes, None, node_row(node))?;
                check_rows(Table::NodeTags, tags, tag_row)
            }
            ShapedElement::Way { way, nodes, tags } => {
                check_row(Table::Ways, None, way_row(way))?;
                check_rows(Table::WayNodes, nodes, way_node_row)?;
                check_rows(Table::WayTags, tags, tag_row)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, lat: &str) -> NodeRecord {
        NodeRecord {
            id: id.to_string(),
            lat: lat.to_string(),
            lon: "-80.2".to_string(),
            user: "".to_string(),
            uid: "1".to_string(),
            version: "2".to_string(),
            changeset: "3".to_string(),
            timestamp: "2016-01-01T00:00:00Z".to_string(),
        }
    }

    fn tag(id: &str) -> TagRecord {
        TagRecord {
            id: id.to_string(),
            key: "street".to_string(),
            value: "Main Street".to_string(),
            category: "addr".to_string(),
        }
    }

    fn way(id: &str, refs: &[&str]) -> ShapedElement {
        ShapedElement::Way {
            way: WayRecord {
                id: id.to_string(),
                user: "u".to_string(),
                uid: "1".to_string(),
                version: "1".to_string(),
                changeset: "1".to_string(),
                timestamp: "T".to_string(),
            },
            nodes: refs
                .iter()
                .enumerate()
                .map(|(position, node_id)| WayNodeRecord {
                    id: id.to_string(),
                    node_id: node_id.to_string(),
                    position,
                })
                .collect(),
            tags: vec![tag(id)],
        }
    }

    #[test]
    fn well_formed_elements_pass() {
        let element = ShapedElement::Node {
            node: node("123", "25.1"),
            tags: vec![tag("123")],
        };
        assert_eq!(SchemaValidator.validate(&element), Ok(()));
        assert_eq!(SchemaValidator.validate(&way("5", &["1", "2"])), Ok(()));
    }

    #[test]
    fn non_numeric_coordinate_fails() {
        let element = ShapedElement::Node {
            node: node("123", "north"),
            tags: Vec::new(),
        };
        let err = SchemaValidator.validate(&element).unwrap_err();
        assert_eq!(err.table, Table::Nodes);
        assert_eq!(err.field, "lat");
        assert_eq!(err.problems, vec!["must be of float type (got \"north\")"]);
    }

    #[test]
    fn infinite_coordinate_fails() {
        let element = ShapedElement::Node {
            node: node("123", "inf"),
            tags: Vec::new(),
        };
        assert!(SchemaValidator.validate(&element).is_err());
    }

    #[test]
    fn bad_node_reference_names_its_row() {
        let err = SchemaValidator
            .validate(&way("5", &["1", "x2"]))
            .unwrap_err();
        assert_eq!(err.table, Table::WayNodes);
        assert_eq!(err.field, "[1].node_id");
    }

    #[test]
    fn first_failure_is_reported() {
        let element = ShapedElement::Node {
            node: node("abc", "north"),
            tags: vec![tag("abc")],
        };
        let err = SchemaValidator.validate(&element).unwrap_err();
        assert_eq!(err.table, Table::Nodes);
        assert_eq!(err.field, "id");
    }
}
