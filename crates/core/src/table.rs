//! Attribute tables for areal observations
//!
//! An [`AttrTable`] pairs an ordered list of observation identifiers
//! (state or municipality codes, matching the `locations` of a GeoJSON
//! layer) with named columns of attribute values. It is the tabular
//! structure the autocorrelation dispatcher annotates and the chart
//! builders read from.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(v) => Some(*v as f64),
            AttributeValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to a JSON value (for GeoJSON properties and chart data).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AttributeValue::Null => serde_json::Value::Null,
            AttributeValue::Bool(b) => serde_json::Value::Bool(*b),
            AttributeValue::Int(v) => serde_json::Value::from(*v),
            AttributeValue::Float(v) => serde_json::Value::from(*v),
            AttributeValue::String(s) => serde_json::Value::from(s.clone()),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::String(v)
    }
}

/// Tabular attribute data keyed by observation identifier
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttrTable {
    /// Observation identifiers, in row order
    ids: Vec<String>,
    /// Named columns, each with one value per observation
    columns: HashMap<String, Vec<AttributeValue>>,
}

impl AttrTable {
    /// Create a table with the given observation identifiers and no columns.
    pub fn new(ids: Vec<String>) -> Self {
        Self {
            ids,
            columns: HashMap::new(),
        }
    }

    /// Number of observations (rows).
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Observation identifiers in row order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Row index of an observation identifier.
    pub fn row_index(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|i| i == id)
    }

    /// Column names (unordered).
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|s| s.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Insert or replace a column. The column must have one value per row.
    pub fn set_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<AttributeValue>,
    ) -> Result<()> {
        if values.len() != self.ids.len() {
            return Err(Error::LengthMismatch {
                what: "column",
                expected: self.ids.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(name.into(), values);
        Ok(())
    }

    /// Insert a float column.
    pub fn set_f64_column(&mut self, name: impl Into<String>, values: &[f64]) -> Result<()> {
        self.set_column(
            name,
            values.iter().map(|&v| AttributeValue::Float(v)).collect(),
        )
    }

    /// Insert an integer column.
    pub fn set_i64_column(&mut self, name: impl Into<String>, values: &[i64]) -> Result<()> {
        self.set_column(
            name,
            values.iter().map(|&v| AttributeValue::Int(v)).collect(),
        )
    }

    /// Insert a string column.
    pub fn set_str_column<S: AsRef<str>>(
        &mut self,
        name: impl Into<String>,
        values: &[S],
    ) -> Result<()> {
        self.set_column(
            name,
            values
                .iter()
                .map(|v| AttributeValue::String(v.as_ref().to_string()))
                .collect(),
        )
    }

    /// Raw column access.
    pub fn column(&self, name: &str) -> Result<&[AttributeValue]> {
        self.columns
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| Error::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Column as floats. Ints are widened; anything else is a type error.
    pub fn f64_column(&self, name: &str) -> Result<Vec<f64>> {
        self.column(name)?
            .iter()
            .map(|v| {
                v.as_f64().ok_or(Error::ColumnType {
                    name: name.to_string(),
                    expected: "numeric",
                })
            })
            .collect()
    }

    /// Column as strings.
    pub fn str_column(&self, name: &str) -> Result<Vec<String>> {
        self.column(name)?
            .iter()
            .map(|v| match v {
                AttributeValue::String(s) => Ok(s.clone()),
                _ => Err(Error::ColumnType {
                    name: name.to_string(),
                    expected: "string",
                }),
            })
            .collect()
    }

    /// Single cell lookup by observation id and column name.
    pub fn value(&self, id: &str, column: &str) -> Option<&AttributeValue> {
        let idx = self.row_index(id)?;
        self.columns.get(column).and_then(|col| col.get(idx))
    }

    /// Iterate one row as `(column name, value)` pairs.
    pub fn row(&self, idx: usize) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.columns
            .iter()
            .filter_map(move |(name, col)| col.get(idx).map(|v| (name.as_str(), v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> AttrTable {
        let mut t = AttrTable::new(vec!["06".into(), "48".into(), "36".into()]);
        t.set_f64_column("income", &[71_228.0, 64_034.0, 72_920.0]).unwrap();
        t.set_str_column("state", &["California", "Texas", "New York"]).unwrap();
        t
    }

    #[test]
    fn column_round_trip() {
        let t = sample_table();
        assert_eq!(t.len(), 3);
        assert_eq!(t.f64_column("income").unwrap()[1], 64_034.0);
        assert_eq!(t.str_column("state").unwrap()[2], "New York");
    }

    #[test]
    fn length_mismatch_rejected() {
        let mut t = sample_table();
        let err = t.set_f64_column("bad", &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn missing_column_is_error() {
        let t = sample_table();
        assert!(matches!(
            t.f64_column("nope"),
            Err(Error::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn type_mismatch_is_error() {
        let t = sample_table();
        assert!(matches!(
            t.f64_column("state"),
            Err(Error::ColumnType { expected: "numeric", .. })
        ));
    }

    #[test]
    fn int_column_widens_to_f64() {
        let mut t = sample_table();
        t.set_i64_column("quadrant", &[1, 0, 3]).unwrap();
        assert_eq!(t.f64_column("quadrant").unwrap(), vec![1.0, 0.0, 3.0]);
    }

    #[test]
    fn cell_lookup_by_id() {
        let t = sample_table();
        assert_eq!(
            t.value("48", "state"),
            Some(&AttributeValue::String("Texas".into()))
        );
        assert_eq!(t.value("99", "state"), None);
    }

    #[test]
    fn serde_round_trip() {
        let t = sample_table();
        let json = serde_json::to_string(&t).unwrap();
        let back: AttrTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ids(), t.ids());
        assert_eq!(back.f64_column("income").unwrap(), t.f64_column("income").unwrap());
    }
}
