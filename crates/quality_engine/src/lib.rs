//! # Data Quality Engine
//!
//! Metric generation and tolerance auditing for the Data Quality Auditor.
//! A profile run produces metrics in stages:
//!
//! - Statistics: the total record count of the profiled table
//! - Basic metrics: raw counts measured by the table and field delegates
//! - Quality metrics: ratios derived from the stored basic metrics
//!
//! An audit run then checks the quality metrics against the configured
//! tolerances and reduces the reports into a pass/fail summary.
//!
//! ## Example
//!
//! ```rust
//! use quality_core::{Comparator, MetricBuilder, MetricType, ToleranceBuilder};
//! use quality_engine::{calculate_quality_metrics, quality_metric_specs, RuleValidator};
//!
//! let tolerances = vec![
//!     ToleranceBuilder::field("p.d.orders", "email", MetricType::NullnessPct)
//!         .rule(Comparator::LessThan, 5.0)
//!         .build(),
//! ];
//! let basics = vec![
//!     MetricBuilder::new(MetricType::Count, 200.0).build(),
//!     MetricBuilder::new(MetricType::NullCount, 20.0).field("email").build(),
//! ];
//!
//! let specs = quality_metric_specs("p.d.orders", &tolerances);
//! let quality = calculate_quality_metrics(&basics, &specs).unwrap();
//! let validated = RuleValidator::new().validate(&quality, &tolerances).unwrap();
//!
//! assert_eq!(validated[0].metric.value, 10.0);
//! assert!(!validated[0].pass_flag);
//! ```

mod auditor;
mod error;
mod multistage;
mod profiler;
mod quality;
mod rule;
mod service;
mod spec;
mod summary;

pub mod memory;

pub use auditor::*;
pub use error::*;
pub use multistage::*;
pub use profiler::*;
pub use quality::*;
pub use rule::*;
pub use service::*;
pub use spec::*;
pub use summary::*;
