//! Table metadata: field names, types and nesting.
//!
//! Only the parts the auditor needs are modelled: the numeric-type gate for
//! `sum` metrics and the ability to address nested fields by dotted ID.

use serde::{Deserialize, Serialize};

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Bytes,
    #[serde(alias = "INT64")]
    Integer,
    #[serde(alias = "FLOAT64")]
    Float,
    Numeric,
    #[serde(alias = "BIGDECIMAL")]
    BigNumeric,
    #[serde(alias = "BOOL")]
    Boolean,
    Timestamp,
    Date,
    Time,
    Datetime,
    Geography,
    #[serde(alias = "STRUCT")]
    Record,
}

impl FieldType {
    /// Returns true for types a `sum` can be computed on.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Integer | FieldType::Float | FieldType::Numeric | FieldType::BigNumeric
        )
    }
}

/// Field mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    #[default]
    Nullable,
    Required,
    Repeated,
}

/// A single field of a table, possibly with nested fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name (not the full dotted ID)
    pub name: String,

    /// Declared type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Field mode
    #[serde(default)]
    pub mode: FieldMode,

    /// Nested fields of a `RECORD`
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl FieldSpec {
    /// Creates a nullable field without nested fields.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            mode: FieldMode::default(),
            fields: Vec::new(),
        }
    }

    /// Sets the field mode.
    pub fn with_mode(mut self, mode: FieldMode) -> Self {
        self.mode = mode;
        self
    }

    /// Adds a nested field.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }
}

/// Metadata of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Table name
    pub name: String,

    /// Field used to partition the table, if any
    #[serde(default)]
    pub partition_field: Option<String>,

    /// Top-level fields
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl TableSpec {
    /// Looks up a field by dotted ID (`address.city`).
    pub fn field(&self, field_id: &str) -> Option<&FieldSpec> {
        let mut parts = field_id.split('.');
        let first = parts.next()?;
        let mut current = self.fields.iter().find(|f| f.name == first)?;
        for part in parts {
            current = current.fields.iter().find(|f| f.name == part)?;
        }
        Some(current)
    }

    /// Returns true if the field exists and has a numeric type.
    pub fn is_numeric_field(&self, field_id: &str) -> bool {
        self.field(field_id)
            .is_some_and(|field| field.field_type.is_numeric())
    }

    /// Returns the dotted IDs of every field, depth first.
    pub fn field_ids(&self) -> Vec<String> {
        fn walk(prefix: &str, fields: &[FieldSpec], out: &mut Vec<String>) {
            for field in fields {
                let id = if prefix.is_empty() {
                    field.name.clone()
                } else {
                    format!("{prefix}.{}", field.name)
                };
                out.push(id.clone());
                walk(&id, &field.fields, out);
            }
        }

        let mut ids = Vec::new();
        walk("", &self.fields, &mut ids);
        ids
    }
}
