//! Error types for the auditing engine.
//!
//! Upstream failures are wrapped with the table, profile or audit they
//! concern and keep the collaborator error as their `source()`. Data
//! integrity failures (missing metrics, empty audits) carry enough context to
//! name the metric involved.

use quality_core::{MetricType, Owner, QualityError};
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while generating metrics or auditing them.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Tolerance spec could not be fetched
    #[error("failed to get tolerance spec of {urn}")]
    ToleranceLookup {
        urn: String,
        #[source]
        source: QualityError,
    },

    /// Table metadata could not be fetched
    #[error("failed to get metadata of {urn}")]
    MetadataLookup {
        urn: String,
        #[source]
        source: QualityError,
    },

    /// Stored metrics could not be fetched
    #[error("failed to get metrics of profile {profile_id}")]
    MetricLookup {
        profile_id: String,
        #[source]
        source: QualityError,
    },

    /// Produced metrics could not be stored
    #[error("failed to store metrics of profile {profile_id}")]
    MetricStore {
        profile_id: String,
        #[source]
        source: QualityError,
    },

    /// Audit reports could not be stored
    #[error("failed to store audit result of {audit_id}")]
    AuditResultStore {
        audit_id: String,
        #[source]
        source: QualityError,
    },

    /// Status of a profile or audit could not be written
    #[error("failed to update status of {id}")]
    StatusUpdate {
        id: String,
        #[source]
        source: QualityError,
    },

    /// A measurement delegate failed
    #[error("{owner} profiling of {urn} failed")]
    Profiling {
        urn: String,
        owner: Owner,
        #[source]
        source: QualityError,
    },

    /// A measurement task ended without reporting a result
    #[error("profiling of {urn} ended without a result from every delegate")]
    ProfilingAborted { urn: String },

    /// The statistics stage failed
    #[error("failed to generate statistics of {urn}")]
    Statistics {
        urn: String,
        #[source]
        source: QualityError,
    },

    /// Unique-field metadata of a duplication tolerance is not a string list
    #[error("invalid unique fields type in {urn} tolerance spec")]
    InvalidUniqueFields { urn: String },

    /// A basic metric required by a quality formula is missing
    #[error("{metric} metric is required to calculate {spec} in group '{group}'")]
    MissingMetric {
        metric: MetricType,
        spec: String,
        group: String,
    },

    /// No quality metric matches a configured tolerance
    #[error("failed to find quality score for table {urn} field '{field_id}' metric {metric}")]
    MissingQualityScore {
        urn: String,
        field_id: String,
        metric: MetricType,
        condition: String,
    },

    /// An audited table with records produced no report
    #[error("failed to audit result of {urn}")]
    EmptyAuditResult { urn: String },

    /// Rule validation of an audit failed
    #[error("failed to validate quality metrics of {urn}")]
    Validation {
        urn: String,
        #[source]
        source: Box<EngineError>,
    },

    /// A non-optional quality spec of a type the calculator cannot produce
    #[error("{0} cannot be calculated from basic metrics")]
    UnsupportedQualityMetric(MetricType),
}

impl EngineError {
    /// Renders the error and every source, outermost first, joined by `": "`.
    pub fn display_chain(&self) -> String {
        let mut parts = vec![self.to_string()];
        let mut current = std::error::Error::source(self);
        while let Some(source) = current {
            parts.push(source.to_string());
            current = source.source();
        }
        parts.join(": ")
    }
}
