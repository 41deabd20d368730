use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::dataset::{TabularResult, Value};

/// One result row keyed by column name. Every column of the source result is present,
/// NULL cells included, in the result's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    pub fn new(columns: Arc<[String]>, mut values: Vec<Value>) -> Self {
        values.resize(columns.len(), Value::Null);
        Self { columns, values }
    }

    /// Builds a record from `(column, value)` pairs, mostly for callers that assemble rows
    /// by hand.
    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        let (columns, values): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(k, v)| (k.into(), v)).unzip();
        Self::new(columns.into(), values)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    /// Text rendering of a cell; absent columns and NULL both render empty.
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(Value::to_string).unwrap_or_default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

pub fn normalize(result: &TabularResult) -> Vec<Record> {
    let columns: Arc<[String]> = result.columns.clone().into();
    result
        .rows
        .iter()
        .map(|row| Record::new(Arc::clone(&columns), row.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_are_padded_with_null() {
        let result = TabularResult {
            columns: vec!["a".to_string(), "b".to_string()],
            rows: vec![vec![Value::Integer(1)]],
        };
        let records = normalize(&result);
        assert_eq!(records[0].get("a"), Some(&Value::Integer(1)));
        assert_eq!(records[0].get("b"), Some(&Value::Null));
        assert_eq!(records[0].get("c"), None);
    }

    #[test]
    fn serializes_in_column_order() {
        let record = Record::from_pairs([
            ("week", Value::Integer(3)),
            ("home_bot_name", Value::Text("Alpha".to_string())),
            ("winning_bot_name", Value::Null),
        ]);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"week":3,"home_bot_name":"Alpha","winning_bot_name":null}"#
        );
    }
}
