//! Flat records produced from one node or way, and the tables they land in.

use serde::Serialize;

/// The five output tables. Column order matches the downstream SQL schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Nodes,
    NodeTags,
    Ways,
    WayNodes,
    WayTags,
}

pub const NODE_FIELDS: [&str; 8] = [
    "id",
    "lat",
    "lon",
    "user",
    "uid",
    "version",
    "changeset",
    "timestamp",
];
pub const NODE_TAGS_FIELDS: [&str; 4] = ["id", "key", "value", "type"];
pub const WAY_FIELDS: [&str; 6] = ["id", "user", "uid", "version", "changeset", "timestamp"];
pub const WAY_NODES_FIELDS: [&str; 3] = ["id", "node_id", "position"];
pub const WAY_TAGS_FIELDS: [&str; 4] = ["id", "key", "value", "type"];

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Nodes,
        Table::NodeTags,
        Table::Ways,
        Table::WayNodes,
        Table::WayTags,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Table::Nodes => "nodes.csv",
            Table::NodeTags => "nodes_tags.csv",
            Table::Ways => "ways.csv",
            Table::WayNodes => "ways_nodes.csv",
            Table::WayTags => "ways_tags.csv",
        }
    }

    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Table::Nodes => &NODE_FIELDS,
            Table::NodeTags => &NODE_TAGS_FIELDS,
            Table::Ways => &WAY_FIELDS,
            Table::WayNodes => &WAY_NODES_FIELDS,
            Table::WayTags => &WAY_TAGS_FIELDS,
        }
    }

    /// Name used in validation messages.
    pub fn label(self) -> &'static str {
        match self {
            Table::Nodes => "node",
            Table::NodeTags => "node_tags",
            Table::Ways => "way",
            Table::WayNodes => "way_nodes",
            Table::WayTags => "way_tags",
        }
    }
}

/// Attribute values are kept as the raw document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRecord {
    pub id: String,
    pub lat: String,
    pub lon: String,
    pub user: String,
    pub uid: String,
    pub version: String,
    pub changeset: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WayRecord {
    pub id: String,
    pub user: String,
    pub uid: String,
    pub version: String,
    pub changeset: String,
    pub timestamp: String,
}

/// One step of a way's path; `position` is zero-based in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WayNodeRecord {
    pub id: String,
    pub node_id: String,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    pub id: String,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapedElement {
    Node {
        node: NodeRecord,
        tags: Vec<TagRecord>,
    },
    Way {
        way: WayRecord,
        nodes: Vec<WayNodeRecord>,
        tags: Vec<TagRecord>,
    },
}

impl ShapedElement {
    pub fn id(&self) -> &str {
        match self {
            ShapedElement::Node { node, .. } => &node.id,
            ShapedElement::Way { way, .. } => &way.id,
        }
    }

    pub fn tags(&self) -> &[TagRecord] {
        match self {
            ShapedElement::Node { tags, .. } | ShapedElement::Way { tags, .. } => tags,
        }
    }
}
