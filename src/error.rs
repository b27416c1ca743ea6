//! Error types for the conversion run.
//!
//! Every error is fatal to the run: nothing here is retried or skipped.

use thiserror::Error;

use crate::record::Table;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("<{element}{}> is missing required attribute '{attribute}'", id_suffix(.id))]
    MissingAttribute {
        element: &'static str,
        id: Option<String>,
        attribute: &'static str,
    },

    #[error("document ended inside <{element}>")]
    Truncated { element: &'static str },

    #[error("invalid {name} pattern '{pattern}': {source}")]
    InvalidPattern {
        name: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

fn id_suffix(id: &Option<String>) -> String {
    match id {
        Some(id) => format!(" id=\"{id}\""),
        None => String::new(),
    }
}

/// A shaped row that does not match its table schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Element of type '{}' has the following errors:\n{field}: {}",
    .table.label(),
    .problems.join("; ")
)]
pub struct ValidationError {
    pub table: Table,
    pub field: String,
    pub problems: Vec<String>,
}

pub type Result<T> = std::result::Result<T, Error>;
