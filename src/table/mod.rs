//! Tabular views over broker responses.
//!
//! Most list endpoints answer with an array of homogeneous JSON records.
//! [`Table`] keeps those records as rows over an explicit, ordered column
//! list so that reshaping (see [`flatten`]) can reason about the schema
//! even when there are no rows at all.

pub mod flatten;
pub mod schemas;

use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::{Map, Value};

use crate::{Error, Result};

pub use flatten::{FlattenSpec, NestedField, SubField};

/// An ordered collection of records sharing one column set.
///
/// Cells that a record does not provide are [`Value::Null`].
///
/// # Example
///
/// ```
/// use ig_dealing_rs::table::Table;
/// use serde_json::json;
///
/// let table = Table::from_records(vec![
///     json!({"epic": "CS.D.GBPUSD.TODAY.IP", "bid": 1.2712}),
///     json!({"epic": "IX.D.FTSE.DAILY.IP", "bid": 7321.5}),
/// ]).unwrap();
///
/// assert_eq!(table.columns(), ["epic", "bid"]);
/// assert_eq!(table.get(1, "epic"), Some(&json!("IX.D.FTSE.DAILY.IP")));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// An empty table with the given columns.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from JSON objects.
    ///
    /// Columns appear in first-seen order across all records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a record is not a JSON object.
    pub fn from_records(records: Vec<Value>) -> Result<Self> {
        let mut table = Table::default();
        for record in records {
            match record {
                Value::Object(map) => table.push_record(map),
                other => {
                    return Err(Error::InvalidInput(format!(
                        "Expected a JSON object row, got {}",
                        other
                    )))
                }
            }
        }
        Ok(table)
    }

    /// Build a table from the array stored under `key` in a response body.
    ///
    /// A missing or `null` array yields an empty table.
    pub fn from_field(body: &Value, key: &str) -> Result<Self> {
        match body.get(key) {
            None | Some(Value::Null) => Ok(Table::default()),
            Some(Value::Array(items)) => Table::from_records(items.clone()),
            Some(other) => Err(Error::InvalidInput(format!(
                "Expected '{}' to be an array, got {}",
                key, other
            ))),
        }
    }

    /// Append a record, adding any columns it introduces.
    pub fn push_record(&mut self, mut record: Map<String, Value>) {
        let mut row: Vec<Value> = self
            .columns
            .iter()
            .map(|column| record.remove(column).unwrap_or(Value::Null))
            .collect();

        for (column, value) in record {
            self.columns.push(column);
            for existing in &mut self.rows {
                existing.push(Value::Null);
            }
            row.push(value);
        }
        self.rows.push(row);
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns `true` if the column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// A single cell.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[index])
    }

    /// All values of a column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Iterate over rows as slices aligned with [`columns`](Self::columns).
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// A row as a JSON object.
    pub fn record(&self, row: usize) -> Option<Map<String, Value>> {
        self.rows.get(row).map(|values| {
            self.columns
                .iter()
                .cloned()
                .zip(values.iter().cloned())
                .collect()
        })
    }

    /// Every row as a JSON object.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        (0..self.rows.len()).filter_map(|i| self.record(i)).collect()
    }

    /// Remove a column, returning its values.
    pub(crate) fn remove_column(&mut self, name: &str) -> Option<Vec<Value>> {
        let index = self.column_index(name)?;
        self.columns.remove(index);
        Some(self.rows.iter_mut().map(|row| row.remove(index)).collect())
    }

    /// Replace a column's values in place, or append it as the last column.
    pub(crate) fn set_column(&mut self, name: String, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(&name) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            None => {
                self.columns.push(name);
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for record in self.to_records() {
            seq.serialize_element(&record)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_records_union_columns() {
        let table = Table::from_records(vec![
            json!({"a": 1, "b": 2}),
            json!({"b": 3, "c": 4}),
        ])
        .unwrap();

        assert_eq!(table.columns(), ["a", "b", "c"]);
        assert_eq!(table.get(0, "c"), Some(&Value::Null));
        assert_eq!(table.get(1, "a"), Some(&Value::Null));
        assert_eq!(table.get(1, "c"), Some(&json!(4)));
    }

    #[test]
    fn test_from_records_rejects_scalars() {
        assert!(matches!(
            Table::from_records(vec![json!(1)]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_field_missing_or_null() {
        assert!(Table::from_field(&json!({}), "markets").unwrap().is_empty());
        assert!(Table::from_field(&json!({"markets": null}), "markets")
            .unwrap()
            .is_empty());
        assert!(Table::from_field(&json!({"markets": "x"}), "markets").is_err());
    }

    #[test]
    fn test_set_column_replaces_in_place() {
        let mut table = Table::from_records(vec![json!({"a": 1, "b": 2})]).unwrap();
        table.set_column("a".into(), vec![json!(9)]);
        table.set_column("c".into(), vec![json!(3)]);

        assert_eq!(table.columns(), ["a", "b", "c"]);
        assert_eq!(table.record(0).unwrap(), json!({"a": 9, "b": 2, "c": 3}).as_object().cloned().unwrap());
    }

    #[test]
    fn test_remove_column() {
        let mut table = Table::from_records(vec![json!({"a": 1, "b": 2})]).unwrap();
        assert_eq!(table.remove_column("a"), Some(vec![json!(1)]));
        assert_eq!(table.columns(), ["b"]);
        assert_eq!(table.remove_column("a"), None);
    }

    #[test]
    fn test_serialize_as_records() {
        let table = Table::from_records(vec![json!({"a": 1}), json!({"a": 2})]).unwrap();
        assert_eq!(serde_json::to_value(&table).unwrap(), json!([{"a": 1}, {"a": 2}]));
    }
}
