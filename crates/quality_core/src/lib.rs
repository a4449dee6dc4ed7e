//! # Data Quality Core
//!
//! Core data structures and collaborator traits for the Data Quality Auditor.
//!
//! This crate provides the model shared by every stage of a quality audit:
//! the metrics that get measured, the tolerances they are checked against and
//! the reports an audit produces.
//!
//! ## Key Concepts
//!
//! - **Basic metric**: a raw measurement (count, null count, unique count, sum, invalid count)
//! - **Quality metric**: a ratio derived from basic metrics (nullness, duplication, invalidity)
//! - **Tolerance**: a conjunctive rule set bounding one quality metric of a table or field
//! - **Audit report**: the outcome of checking one quality metric against its tolerance
//!
//! ## Example
//!
//! ```rust
//! use quality_core::{Comparator, MetricBuilder, MetricType, ToleranceBuilder};
//!
//! let tolerance = ToleranceBuilder::field("project.dataset.orders", "email", MetricType::NullnessPct)
//!     .rule(Comparator::LessThan, 5.0)
//!     .build();
//!
//! let metric = MetricBuilder::new(MetricType::NullnessPct, 2.5)
//!     .field("email")
//!     .build();
//!
//! assert!(tolerance.is_passed(metric.value));
//! ```

pub mod audit;
pub mod builder;
pub mod error;
pub mod finder;
pub mod metric;
pub mod ports;
pub mod profile;
pub mod table;
pub mod tolerance;
pub mod urn;

pub use audit::*;
pub use builder::*;
pub use error::*;
pub use finder::*;
pub use metric::*;
pub use ports::*;
pub use profile::*;
pub use table::*;
pub use tolerance::*;
pub use urn::*;
