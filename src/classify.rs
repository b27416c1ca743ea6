//! Tag classification and value cleanup.
//!
//! A raw `k`/`v` pair either gets dropped (problem characters in the key),
//! split into a category and short key (`addr:street` -> `addr` / `street`),
//! or kept whole under the default category. Street suffixes and postcodes
//! are cleaned up on the way through.

use std::collections::HashMap;

use regex::Regex;
use tracing::trace;

use crate::error::{Error, Result};
use crate::record::TagRecord;

pub const DEFAULT_CATEGORY: &str = "regular";
pub const DEFAULT_POSTCODE_PATTERN: &str = "3[0-9]{4}";

const LOWER_COLON: &str = r"^[a-z_]+:[a-z_]+";
const PROBLEM_CHARS: &str = r#"[=+/&<>;'"?%#$@,. \t\r\n]"#;

const STREET_KEY: &str = "addr:street";
const POSTCODE_KEY: &str = "addr:postcode";

pub const STREET_ABBREVIATIONS: [(&str, &str); 15] = [
    ("St", "Street"),
    ("St.", "Street"),
    ("Ave", "Avenue"),
    ("Rd.", "Road"),
    ("Rd", "Road"),
    ("Pl", "Place"),
    ("Pl.", "Place"),
    ("Trl", "Trail"),
    ("Ln", "Lane"),
    ("Dr", "Drive"),
    ("Dr.", "Drive"),
    ("Ct", "Court"),
    ("Ct.", "Court"),
    ("Cir", "Circle"),
    ("Ter", "Terrace"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Category for keys without a `prefix:` namespace.
    pub default_category: String,
    /// First match replaces the whole `addr:postcode` value.
    pub postcode_pattern: String,
    /// Last-token replacements for `addr:street`, matched case-sensitively.
    pub street_abbreviations: HashMap<String, String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            default_category: DEFAULT_CATEGORY.to_string(),
            postcode_pattern: DEFAULT_POSTCODE_PATTERN.to_string(),
            street_abbreviations: STREET_ABBREVIATIONS
                .iter()
                .map(|(short, full)| (short.to_string(), full.to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TagClassifier {
    default_category: String,
    lower_colon: Regex,
    problem_chars: Regex,
    postcode: Regex,
    street_abbreviations: HashMap<String, String>,
}

fn compile(name: &'static str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        name,
        pattern: pattern.to_string(),
        source,
    })
}

impl TagClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        Ok(TagClassifier {
            default_category: config.default_category,
            lower_colon: compile("namespaced key", LOWER_COLON)?,
            problem_chars: compile("problem character", PROBLEM_CHARS)?,
            postcode: compile("postcode", &config.postcode_pattern)?,
            street_abbreviations: config.street_abbreviations,
        })
    }

    pub fn is_problem_key(&self, key: &str) -> bool {
        self.problem_chars.is_match(key)
    }

    /// Classify one tag of the element `owner_id`. `None` means the tag is dropped.
    pub fn classify(&self, owner_id: &str, key: &str, value: &str) -> Option<TagRecord> {
        if self.is_problem_key(key) {
            trace!(owner_id, key, "dropping tag with problem characters in key");
            return None;
        }

        let record = if self.lower_colon.is_match(key) {
            let (category, short_key) = key.split_once(':')?;
            TagRecord {
                id: owner_id.to_string(),
                key: short_key.to_string(),
                value: self.normalize_value(key, value),
                category: category.to_string(),
            }
        } else {
            TagRecord {
                id: owner_id.to_string(),
                key: key.to_string(),
                value: value.to_string(),
                category: self.default_category.clone(),
            }
        };
        Some(record)
    }

    fn normalize_value(&self, key: &str, value: &str) -> String {
        match key {
            STREET_KEY => self.expand_street(value),
            POSTCODE_KEY => self.extract_postcode(value),
            _ => None,
        }
        .unwrap_or_else(|| value.to_string())
    }

    fn expand_street(&self, value: &str) -> Option<String> {
        let tokens: Vec<&str> = value.split_whitespace().collect();
        let (last, rest) = tokens.split_last()?;
        let full = self.street_abbreviations.get(*last)?;

        let mut expanded = rest.to_vec();
        expanded.push(full.as_str());
        Some(expanded.join(" "))
    }

    fn extract_postcode(&self, value: &str) -> Option<String> {
        self.postcode
            .find(value)
            .map(|found| found.as_str().to_string())
    }
}
