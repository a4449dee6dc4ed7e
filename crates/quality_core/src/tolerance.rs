//! Tolerance rules and tolerance specs.
//!
//! A [`Tolerance`] bounds the acceptable range of one quality metric on one
//! table or field. Its rules are conjunctive: a value passes only if it
//! satisfies every [`ToleranceRule`].

use crate::{Metadata, MetricType, QualityError, Result, TableUrn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Comparison applied between a metric value and a rule value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// `actual < expected`
    LessThan,
    /// `actual <= expected`
    LessThanEq,
    /// `actual > expected`
    MoreThan,
    /// `actual >= expected`
    MoreThanEq,
}

impl Comparator {
    /// Returns the wire name of the comparator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::LessThan => "less_than",
            Comparator::LessThanEq => "less_than_eq",
            Comparator::MoreThan => "more_than",
            Comparator::MoreThanEq => "more_than_eq",
        }
    }

    /// Evaluates `actual <op> expected`.
    pub fn evaluate(&self, actual: f64, expected: f64) -> bool {
        match self {
            Comparator::LessThan => actual < expected,
            Comparator::LessThanEq => actual <= expected,
            Comparator::MoreThan => actual > expected,
            Comparator::MoreThanEq => actual >= expected,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = QualityError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "less_than" => Ok(Comparator::LessThan),
            "less_than_eq" => Ok(Comparator::LessThanEq),
            "more_than" => Ok(Comparator::MoreThan),
            "more_than_eq" => Ok(Comparator::MoreThanEq),
            other => Err(QualityError::UnknownComparator(other.to_string())),
        }
    }
}

/// A single bound on a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceRule {
    pub comparator: Comparator,
    pub value: f64,
}

impl ToleranceRule {
    /// Creates a new rule.
    pub fn new(comparator: Comparator, value: f64) -> Self {
        Self { comparator, value }
    }

    /// Returns true if `actual` satisfies the rule.
    pub fn is_satisfied_by(&self, actual: f64) -> bool {
        self.comparator.evaluate(actual, self.value)
    }
}

/// Rule set for one `(table|field, metric, condition)` tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Table the tolerance applies to
    #[serde(default)]
    pub table_urn: String,

    /// Field the tolerance applies to; empty for table-level tolerances
    #[serde(default)]
    pub field_id: String,

    /// Quality metric being bounded
    pub metric_name: MetricType,

    /// Invalidity condition, only for `invalid_pct`
    #[serde(default)]
    pub condition: String,

    /// Additional metadata (e.g. unique-field list for duplication)
    #[serde(default)]
    pub metadata: Metadata,

    /// Rules that must all hold
    pub tolerance_rules: Vec<ToleranceRule>,
}

impl Tolerance {
    /// Returns true if `value` satisfies every rule.
    pub fn is_passed(&self, value: f64) -> bool {
        self.tolerance_rules
            .iter()
            .all(|rule| rule.is_satisfied_by(value))
    }

    /// Returns true if the tolerance targets the whole table.
    pub fn is_table_level(&self) -> bool {
        self.field_id.is_empty()
    }
}

/// All tolerances configured for one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToleranceSpec {
    /// Table URN
    pub urn: String,

    /// Configured tolerances
    #[serde(default)]
    pub tolerances: Vec<Tolerance>,
}

impl ToleranceSpec {
    /// Creates a spec, stamping the URN onto every tolerance that lacks one.
    pub fn new(urn: impl Into<String>, tolerances: Vec<Tolerance>) -> Self {
        let mut spec = Self {
            urn: urn.into(),
            tolerances,
        };
        spec.fill_table_urn();
        spec
    }

    /// Stamps the spec URN onto every tolerance with an empty `table_urn`.
    pub fn fill_table_urn(&mut self) {
        for tolerance in &mut self.tolerances {
            if tolerance.table_urn.is_empty() {
                tolerance.table_urn = self.urn.clone();
            }
        }
    }

    /// Checks the spec for internal consistency.
    ///
    /// The URN must be well-formed, every tolerance must belong to it and
    /// carry at least one rule, conditions are only allowed (and required) on
    /// `invalid_pct`, and each `(field, metric, condition)` tuple may appear
    /// at most once.
    pub fn validate(&self) -> Result<()> {
        TableUrn::parse(&self.urn)?;

        let mut seen = HashSet::new();
        for tolerance in &self.tolerances {
            let target = describe(tolerance);

            if tolerance.table_urn != self.urn {
                return Err(QualityError::invalid_tolerance_spec(
                    &self.urn,
                    format!("{target} belongs to table '{}'", tolerance.table_urn),
                ));
            }

            if tolerance.tolerance_rules.is_empty() {
                return Err(QualityError::invalid_tolerance_spec(
                    &self.urn,
                    format!("{target} has no tolerance rules"),
                ));
            }

            let is_invalid_pct = tolerance.metric_name == MetricType::InvalidPct;
            if is_invalid_pct && tolerance.condition.is_empty() {
                return Err(QualityError::invalid_tolerance_spec(
                    &self.urn,
                    format!("{target} requires a condition"),
                ));
            }
            if !is_invalid_pct && !tolerance.condition.is_empty() {
                return Err(QualityError::invalid_tolerance_spec(
                    &self.urn,
                    format!("{target} does not accept a condition"),
                ));
            }

            let key = (
                tolerance.field_id.as_str(),
                tolerance.metric_name,
                tolerance.condition.as_str(),
            );
            if !seen.insert(key) {
                return Err(QualityError::invalid_tolerance_spec(
                    &self.urn,
                    format!("{target} is configured more than once"),
                ));
            }
        }

        Ok(())
    }
}

fn describe(tolerance: &Tolerance) -> String {
    let mut target = tolerance.metric_name.to_string();
    if !tolerance.field_id.is_empty() {
        target.push_str(&format!(" of field '{}'", tolerance.field_id));
    }
    if !tolerance.condition.is_empty() {
        target.push_str(&format!(" where '{}'", tolerance.condition));
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToleranceBuilder;

    #[test]
    fn test_comparators() {
        assert!(Comparator::LessThan.evaluate(1.0, 2.0));
        assert!(!Comparator::LessThan.evaluate(2.0, 2.0));
        assert!(Comparator::LessThanEq.evaluate(2.0, 2.0));
        assert!(Comparator::MoreThan.evaluate(3.0, 2.0));
        assert!(!Comparator::MoreThan.evaluate(2.0, 2.0));
        assert!(Comparator::MoreThanEq.evaluate(2.0, 2.0));
    }

    #[test]
    fn test_comparator_names() {
        assert_eq!("more_than_eq".parse::<Comparator>().unwrap(), Comparator::MoreThanEq);
        assert_eq!(Comparator::LessThanEq.to_string(), "less_than_eq");
        assert!(matches!(
            "greater_than".parse::<Comparator>(),
            Err(QualityError::UnknownComparator(_))
        ));
    }

    #[test]
    fn test_rules_are_conjunctive() {
        let tolerance = ToleranceBuilder::table("p.d.t", MetricType::RowCount)
            .rule(Comparator::MoreThanEq, 10.0)
            .rule(Comparator::LessThan, 100.0)
            .build();

        assert!(tolerance.is_passed(10.0));
        assert!(tolerance.is_passed(99.9));
        assert!(!tolerance.is_passed(100.0));
        assert!(!tolerance.is_passed(9.0));
    }

    #[test]
    fn test_validate_accepts_well_formed_spec() {
        let spec = ToleranceSpec::new(
            "p.d.t",
            vec![
                ToleranceBuilder::table("", MetricType::DuplicationPct)
                    .rule(Comparator::LessThanEq, 0.0)
                    .build(),
                ToleranceBuilder::field("", "age", MetricType::InvalidPct)
                    .condition("age < 0")
                    .rule(Comparator::LessThan, 1.0)
                    .build(),
                ToleranceBuilder::field("", "age", MetricType::InvalidPct)
                    .condition("age > 150")
                    .rule(Comparator::LessThan, 1.0)
                    .build(),
            ],
        );

        assert!(spec.tolerances.iter().all(|t| t.table_urn == "p.d.t"));
        spec.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let tolerance = ToleranceBuilder::field("p.d.t", "email", MetricType::NullnessPct)
            .rule(Comparator::LessThan, 5.0)
            .build();
        let spec = ToleranceSpec::new("p.d.t", vec![tolerance.clone(), tolerance]);

        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"), "{err}");
    }

    #[test]
    fn test_validate_rejects_missing_rules_and_misplaced_conditions() {
        let spec = ToleranceSpec::new(
            "p.d.t",
            vec![ToleranceBuilder::table("p.d.t", MetricType::RowCount).build()],
        );
        assert!(spec.validate().unwrap_err().to_string().contains("no tolerance rules"));

        let spec = ToleranceSpec::new(
            "p.d.t",
            vec![
                ToleranceBuilder::field("p.d.t", "email", MetricType::NullnessPct)
                    .condition("email = ''")
                    .rule(Comparator::LessThan, 5.0)
                    .build(),
            ],
        );
        assert!(spec.validate().unwrap_err().to_string().contains("does not accept"));

        let spec = ToleranceSpec::new(
            "p.d.t",
            vec![
                ToleranceBuilder::table("p.d.t", MetricType::InvalidPct)
                    .rule(Comparator::LessThan, 5.0)
                    .build(),
            ],
        );
        assert!(spec.validate().unwrap_err().to_string().contains("requires a condition"));
    }

    #[test]
    fn test_validate_rejects_bad_urn() {
        let spec = ToleranceSpec::new("not-a-urn", vec![]);
        assert!(matches!(spec.validate(), Err(QualityError::InvalidUrn(_))));
    }
}
