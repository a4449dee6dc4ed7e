//! Error types for the data quality model.
//!
//! This module defines the errors raised by the model itself (unknown enum
//! values, malformed URNs, inconsistent tolerance specs) and the errors that
//! external collaborators (stores, measurement delegates) report back.

use thiserror::Error;

/// Result type for data quality operations.
pub type Result<T> = std::result::Result<T, QualityError>;

/// Main error type for the data quality model and its collaborators.
#[derive(Error, Debug)]
pub enum QualityError {
    /// A requested entity does not exist in a store
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity (e.g. "tolerance spec", "table metadata")
        entity: String,
        /// Identifier that was looked up
        id: String,
    },

    /// A store failed to read or write
    #[error("Storage error: {0}")]
    Storage(String),

    /// A measurement delegate could not produce a metric
    #[error("Measurement failed for '{urn}': {message}")]
    Measurement {
        /// Table being measured
        urn: String,
        /// Failure details
        message: String,
    },

    /// Table URN does not have the `project.dataset.table` shape
    #[error("Invalid table URN: {0}")]
    InvalidUrn(String),

    /// Metric type name is not recognised
    #[error("Unknown metric type: {0}")]
    UnknownMetricType(String),

    /// Comparator name is not recognised
    #[error("Unknown comparator: {0}")]
    UnknownComparator(String),

    /// Tolerance spec is internally inconsistent
    #[error("Invalid tolerance spec for '{urn}': {message}")]
    InvalidToleranceSpec {
        /// Table the spec belongs to
        urn: String,
        /// Description of the inconsistency
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl QualityError {
    /// Creates a new not-found error.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a new storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a new measurement error.
    pub fn measurement(urn: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Measurement {
            urn: urn.into(),
            message: message.into(),
        }
    }

    /// Creates a new invalid tolerance spec error.
    pub fn invalid_tolerance_spec(urn: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidToleranceSpec {
            urn: urn.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QualityError::not_found("tolerance spec", "p.d.t");
        assert_eq!(err.to_string(), "tolerance spec not found: p.d.t");

        let err = QualityError::measurement("p.d.t", "query timed out");
        assert_eq!(
            err.to_string(),
            "Measurement failed for 'p.d.t': query timed out"
        );
    }
}
