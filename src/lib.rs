//! Converts an OpenStreetMap XML export into five flat CSV tables ready for
//! bulk loading into a relational database:
//!
//! | file             | columns                                               |
//! |------------------|-------------------------------------------------------|
//! | `nodes.csv`      | id, lat, lon, user, uid, version, changeset, timestamp |
//! | `nodes_tags.csv` | id, key, value, type                                  |
//! | `ways.csv`       | id, user, uid, version, changeset, timestamp          |
//! | `ways_nodes.csv` | id, node_id, position                                 |
//! | `ways_tags.csv`  | id, key, value, type                                  |
//!
//! The document is streamed one element at a time, so memory use is bounded
//! by the largest single node or way rather than by the file size.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod shape;
pub mod source;
pub mod validate;
pub mod writer;

pub use classify::{ClassifierConfig, TagClassifier};
pub use config::{Config, OutputPaths};
pub use error::{Error, Result, ValidationError};
pub use pipeline::{process_elements, process_map, process_map_with_progress, ProcessStats};
pub use record::{ShapedElement, Table, TagRecord};
pub use shape::Shaper;
pub use source::{Element, ElementKind, ElementSource};
pub use validate::{SchemaValidator, Validate};
pub use writer::CsvTables;
