//! Promotion of nested sub-record fields to top-level columns.
//!
//! Many IG endpoints return rows whose cells are themselves records, e.g.
//! each open position is `{"position": {...}, "market": {...}}`. A
//! [`FlattenSpec`] declares which sub-fields to lift out of which nested
//! column, and [`FlattenSpec::flatten`] applies it.
//!
//! Flattening never overwrites data silently: a promoted column whose name
//! already exists fails with [`Error::SchemaCollision`] unless the name was
//! explicitly allowed to overlap.
//!
//! # Example
//!
//! ```
//! use ig_dealing_rs::table::{FlattenSpec, SubField, Table};
//! use serde_json::json;
//!
//! let table = Table::from_records(vec![json!({
//!     "position": {"dealId": "A1", "size": 5},
//!     "market": {"epic": "E1"}
//! })]).unwrap();
//!
//! let spec = FlattenSpec::new()
//!     .nest("position", [SubField::new("dealId"), SubField::renamed("size", "dealSize")])
//!     .nest("market", ["epic"]);
//!
//! let flat = spec.flatten(table).unwrap();
//! assert_eq!(flat.columns(), ["dealId", "dealSize", "epic"]);
//! assert_eq!(flat.get(0, "dealSize"), Some(&json!(5)));
//! ```

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::Table;
use crate::{Error, Result};

/// A sub-field to promote, optionally under a different name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubField {
    name: String,
    alias: Option<String>,
}

impl SubField {
    /// Promote `name` as-is.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    /// Promote `name` under `alias`.
    pub fn renamed(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// Key inside the sub-record.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn column_name(&self, parent: &str, prefix: bool) -> String {
        let base = self.alias.as_deref().unwrap_or(&self.name);
        if prefix {
            format!("{}_{}", parent, base)
        } else {
            base.to_string()
        }
    }
}

impl From<&str> for SubField {
    fn from(name: &str) -> Self {
        SubField::new(name)
    }
}

impl From<String> for SubField {
    fn from(name: String) -> Self {
        SubField::new(name)
    }
}

/// One nested column and the sub-fields promoted out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedField {
    parent: String,
    fields: Vec<SubField>,
}

impl NestedField {
    /// Name of the nested column.
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Sub-fields in promotion order.
    pub fn fields(&self) -> &[SubField] {
        &self.fields
    }
}

/// Declarative description of how to flatten a table.
///
/// Nested columns are processed in declaration order; within each, the
/// sub-fields are appended in declaration order after the surviving
/// original columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenSpec {
    nested: Vec<NestedField>,
    prefix: bool,
    overlap_allowed: BTreeSet<String>,
    schema_version: Option<String>,
}

impl FlattenSpec {
    /// An empty spec (flattening is the identity).
    pub fn new() -> Self {
        Self::default()
    }

    /// Promote `fields` out of the nested column `parent`.
    pub fn nest<I, F>(mut self, parent: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<SubField>,
    {
        self.nested.push(NestedField {
            parent: parent.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Name promoted columns `{parent}_{field}` instead of `{field}`.
    pub fn with_prefix(mut self, prefix: bool) -> Self {
        self.prefix = prefix;
        self
    }

    /// Allow a promoted column to replace an existing one of the same name.
    pub fn allow_overlap(mut self, column: impl Into<String>) -> Self {
        self.overlap_allowed.insert(column.into());
        self
    }

    /// Tag with the broker schema version these rules were written against.
    pub fn with_schema_version(mut self, version: impl Into<String>) -> Self {
        self.schema_version = Some(version.into());
        self
    }

    /// The schema version tag, if any.
    pub fn schema_version(&self) -> Option<&str> {
        self.schema_version.as_deref()
    }

    /// Nested columns in processing order.
    pub fn nested(&self) -> &[NestedField] {
        &self.nested
    }

    /// Columns a flattened table will have, given the original columns.
    ///
    /// This is the schema of the result for an empty input table.
    pub fn final_columns<S: AsRef<str>>(&self, columns: &[S]) -> Result<Vec<String>> {
        let table = Table::with_columns(columns.iter().map(|c| c.as_ref().to_string()));
        Ok(self.flatten(table)?.columns)
    }

    /// Flatten `table` according to this spec.
    ///
    /// Rows whose nested cell is `null` (or lacks a sub-field) get `null`
    /// in the promoted column. An empty table short-circuits to an empty
    /// table carrying the final column set; a nested column absent from
    /// an empty table is assumed to have been there.
    ///
    /// # Errors
    ///
    /// - [`Error::SchemaCollision`] if a promoted column already exists
    ///   and is not allowed to overlap, regardless of row count
    /// - [`Error::MissingColumn`] if a non-empty table lacks a nested column
    /// - [`Error::InvalidInput`] if a nested cell is neither a record nor `null`
    pub fn flatten(&self, mut table: Table) -> Result<Table> {
        for nested in &self.nested {
            let sub_records = match table.remove_column(&nested.parent) {
                Some(values) => values,
                None if table.is_empty() => Vec::new(),
                None => return Err(Error::MissingColumn(nested.parent.clone())),
            };

            for field in &nested.fields {
                let column = field.column_name(&nested.parent, self.prefix);
                if table.has_column(&column) && !self.overlap_allowed.contains(&column) {
                    return Err(Error::SchemaCollision {
                        field: column,
                        parent: nested.parent.clone(),
                        schema_version: self.schema_version.clone(),
                    });
                }

                let values = sub_records
                    .iter()
                    .map(|cell| project(cell, &nested.parent, &field.name))
                    .collect::<Result<Vec<_>>>()?;
                table.set_column(column, values);
            }
        }
        Ok(table)
    }

    /// Group promoted columns back under their nested column.
    ///
    /// Inverse of [`flatten`](Self::flatten) for the declared sub-fields: a
    /// row whose promoted values are all `null` gets a `null` nested cell.
    /// Promoted columns missing from the table are skipped.
    pub fn unflatten(&self, mut table: Table) -> Result<Table> {
        for nested in self.nested.iter().rev() {
            if table.has_column(&nested.parent) {
                return Err(Error::SchemaCollision {
                    field: nested.parent.clone(),
                    parent: nested.parent.clone(),
                    schema_version: self.schema_version.clone(),
                });
            }

            let mut columns = Vec::with_capacity(nested.fields.len());
            for field in nested.fields.iter().rev() {
                let column = field.column_name(&nested.parent, self.prefix);
                if let Some(values) = table.remove_column(&column) {
                    columns.push((field.name.as_str(), values));
                }
            }
            columns.reverse();

            let cells = (0..table.len())
                .map(|row| {
                    let record: Map<String, Value> = columns
                        .iter()
                        .map(|(name, values)| (name.to_string(), values[row].clone()))
                        .collect();
                    if record.values().all(Value::is_null) {
                        Value::Null
                    } else {
                        Value::Object(record)
                    }
                })
                .collect();
            table.set_column(nested.parent.clone(), cells);
        }
        Ok(table)
    }
}

fn project(cell: &Value, parent: &str, field: &str) -> Result<Value> {
    match cell {
        Value::Null => Ok(Value::Null),
        Value::Object(record) => Ok(record.get(field).cloned().unwrap_or(Value::Null)),
        other => Err(Error::InvalidInput(format!(
            "Column '{}' holds {} where a record was expected",
            parent, other
        ))),
    }
}
