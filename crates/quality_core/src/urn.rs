//! Table URN parsing.

use crate::{QualityError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn urn_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<project>[A-Za-z0-9_-]+)[.:](?P<dataset>[A-Za-z0-9_]+)\.(?P<table>[A-Za-z0-9_$-]+)$")
            .expect("static URN pattern is valid")
    })
}

/// Fully-qualified table identifier, `project.dataset.table`.
///
/// The legacy `project:dataset.table` form is accepted on parse and
/// normalised to the dotted form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableUrn {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableUrn {
    /// Parses a table URN.
    pub fn parse(urn: &str) -> Result<Self> {
        let captures = urn_pattern()
            .captures(urn.trim())
            .ok_or_else(|| QualityError::InvalidUrn(urn.to_string()))?;

        Ok(Self {
            project: captures["project"].to_string(),
            dataset: captures["dataset"].to_string(),
            table: captures["table"].to_string(),
        })
    }
}

impl FromStr for TableUrn {
    type Err = QualityError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TableUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}
