//! Run configuration.

use std::path::{Path, PathBuf};

use crate::classify::ClassifierConfig;
use crate::record::Table;

/// Where the five table files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    dir: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        OutputPaths { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, table: Table) -> PathBuf {
        self.dir.join(table.file_name())
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        OutputPaths::in_dir(".")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: OutputPaths,
    /// Run the schema validator on every shaped element (slow).
    pub validate: bool,
    pub classifier: ClassifierConfig,
}

impl Config {
    pub fn new(input: impl Into<PathBuf>, output: OutputPaths) -> Self {
        Config {
            input: input.into(),
            output,
            validate: false,
            classifier: ClassifierConfig::default(),
        }
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }
}
