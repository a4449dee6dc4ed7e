//! Predicate-based lookup over metric collections.
//!
//! Every downstream component locates metrics through [`MetricFinder`]. All
//! predicates are exact matches and are combined with AND.

use crate::{Category, Metric, MetricType, Owner};

#[derive(Debug, Clone)]
enum Predicate {
    Id(String),
    FieldId(String),
    Type(MetricType),
    Owner(Owner),
    Category(Category),
    Condition(String),
    Partition(String),
}

impl Predicate {
    fn matches(&self, metric: &Metric) -> bool {
        match self {
            Predicate::Id(id) => metric.id == *id,
            Predicate::FieldId(field_id) => metric.field_id == *field_id,
            Predicate::Type(metric_type) => metric.metric_type == *metric_type,
            Predicate::Owner(owner) => metric.owner() == *owner,
            Predicate::Category(category) => metric.category() == *category,
            Predicate::Condition(condition) => metric.condition == *condition,
            Predicate::Partition(group) => metric.group_value == *group,
        }
    }
}

/// Read-only query over a slice of metrics.
///
/// # Example
///
/// ```rust
/// use quality_core::{Metric, MetricFinder, MetricType, Owner};
///
/// let metrics = vec![
///     Metric::new(MetricType::Count, "", 200.0),
///     Metric::new(MetricType::NullCount, "email", 20.0),
/// ];
///
/// let count = MetricFinder::new(&metrics)
///     .with_type(MetricType::Count)
///     .with_owner(Owner::Table)
///     .find_one();
/// assert_eq!(count.map(|m| m.value), Some(200.0));
/// ```
#[derive(Debug, Clone)]
pub struct MetricFinder<'a> {
    metrics: &'a [Metric],
    predicates: Vec<Predicate>,
}

impl<'a> MetricFinder<'a> {
    /// Creates a finder with no predicates; it matches every metric.
    pub fn new(metrics: &'a [Metric]) -> Self {
        Self {
            metrics,
            predicates: Vec::new(),
        }
    }

    /// Matches metrics with the given ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Id(id.into()));
        self
    }

    /// Matches metrics of the given field (empty for table-level metrics).
    pub fn with_field_id(mut self, field_id: impl Into<String>) -> Self {
        self.predicates.push(Predicate::FieldId(field_id.into()));
        self
    }

    /// Matches metrics of the given type.
    pub fn with_type(mut self, metric_type: MetricType) -> Self {
        self.predicates.push(Predicate::Type(metric_type));
        self
    }

    /// Matches metrics with the given owner.
    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.predicates.push(Predicate::Owner(owner));
        self
    }

    /// Matches metrics of the given category.
    pub fn with_category(mut self, category: Category) -> Self {
        self.predicates.push(Predicate::Category(category));
        self
    }

    /// Matches metrics with the given condition.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Condition(condition.into()));
        self
    }

    /// Matches metrics of the given partition/group value.
    pub fn with_partition(mut self, group_value: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Partition(group_value.into()));
        self
    }

    fn matches(&self, metric: &Metric) -> bool {
        self.predicates.iter().all(|predicate| predicate.matches(metric))
    }

    /// Returns all matching metrics in input order.
    pub fn find(&self) -> Vec<&'a Metric> {
        self.metrics.iter().filter(|metric| self.matches(metric)).collect()
    }

    /// Returns the first matching metric in input order.
    pub fn find_one(&self) -> Option<&'a Metric> {
        self.metrics.iter().find(|metric| self.matches(metric))
    }
}
