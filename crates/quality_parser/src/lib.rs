//! Loader for tolerance specs, table metadata and audit fixtures (YAML/TOML formats).
//!
//! Every input file is a serde document; the format is picked from the file
//! extension. Tolerance specs are checked for consistency once loaded, so the
//! engine only ever sees specs whose tolerances belong to their table.
//!
//! # Example
//!
//! ```rust
//! use quality_core::MetricType;
//! use quality_parser::parse_tolerance_spec_yaml;
//!
//! let yaml = r#"
//! urn: project.dataset.orders
//! tolerances:
//!   - field_id: email
//!     metric_name: nullness_pct
//!     tolerance_rules:
//!       - comparator: less_than
//!         value: 5
//! "#;
//!
//! let spec = parse_tolerance_spec_yaml(yaml).expect("Failed to parse tolerance spec");
//! assert_eq!(spec.tolerances[0].metric_name, MetricType::NullnessPct);
//! assert_eq!(spec.tolerances[0].table_urn, "project.dataset.orders");
//! ```

mod fixture;

pub use fixture::*;

use quality_core::{QualityError, TableSpec, ToleranceSpec};
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading input files.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// Document parsed but is not consistent
    #[error(transparent)]
    Invalid(#[from] QualityError),
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported input file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
}

/// Parse any document from a YAML string.
pub fn parse_yaml<T: DeserializeOwned>(content: &str) -> Result<T> {
    Ok(serde_yaml_ng::from_str(content)?)
}

/// Parse any document from a TOML string.
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T> {
    toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))
}

/// Parse a document in the given format.
pub fn parse_str<T: DeserializeOwned>(content: &str, format: InputFormat) -> Result<T> {
    match format {
        InputFormat::Yaml => parse_yaml(content),
        InputFormat::Toml => parse_toml(content),
    }
}

/// Detect the input format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `InputFormat::Yaml`
/// * `.toml` → `InputFormat::Toml`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<InputFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(InputFormat::Yaml),
        "toml" => Ok(InputFormat::Toml),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a document from a file with automatic format detection.
pub fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, format)
}

/// Parse and check a tolerance spec in the given format.
///
/// Tolerances without a `table_urn` inherit the spec URN.
pub fn parse_tolerance_spec(content: &str, format: InputFormat) -> Result<ToleranceSpec> {
    let mut spec: ToleranceSpec = parse_str(content, format)?;
    spec.fill_table_urn();
    spec.validate()?;
    Ok(spec)
}

/// Parse and check a tolerance spec from a YAML string.
pub fn parse_tolerance_spec_yaml(content: &str) -> Result<ToleranceSpec> {
    parse_tolerance_spec(content, InputFormat::Yaml)
}

/// Load and check a tolerance spec file.
///
/// # Example
///
/// ```no_run
/// use quality_parser::load_tolerance_spec;
/// use std::path::Path;
///
/// let spec = load_tolerance_spec(Path::new("tolerances/orders.yml")).unwrap();
/// println!("Loaded {} tolerances for {}", spec.tolerances.len(), spec.urn);
/// ```
pub fn load_tolerance_spec(path: &Path) -> Result<ToleranceSpec> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_tolerance_spec(&content, format)
}

/// Load a table metadata file.
pub fn load_table_spec(path: &Path) -> Result<TableSpec> {
    parse_file(path)
}
