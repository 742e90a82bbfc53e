//! Tabular query results.

use serde::Serialize;
use serde_json::Value;

/// One result row keyed by column name.
pub type Record = serde_json::Map<String, Value>;

/// Rows returned by a Cypher query, with columns in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultTable {
    /// Build a table from records. Missing cells become `null`.
    pub fn from_records(records: &[Record]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as JSON objects, the shape handed to the answer model.
    pub fn to_records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// Compact JSON text of the rows.
    pub fn to_context(&self) -> String {
        serde_json::to_string(&self.to_records()).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Render a cell for display. Strings lose their quotes; `null` is empty.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_records_unions_columns() {
        let records = vec![
            record(json!({"name": "Foo"})),
            record(json!({"name": "Bar", "count": 3})),
        ];
        let table = ResultTable::from_records(&records);
        assert_eq!(table.columns, vec!["name", "count"]);
        assert_eq!(table.rows[0], vec![json!("Foo"), Value::Null]);
        assert_eq!(table.rows[1], vec![json!("Bar"), json!(3)]);
    }

    #[test]
    fn test_empty() {
        let table = ResultTable::from_records(&[]);
        assert!(table.is_empty());
        assert_eq!(table.to_context(), "[]");
    }

    #[test]
    fn test_context_round_trips_cells() {
        let table = ResultTable::from_records(&[record(json!({"i.name": "Repository"}))]);
        assert_eq!(table.to_context(), r#"[{"i.name":"Repository"}]"#);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!("Foo")), "Foo");
        assert_eq!(cell_text(&Value::Null), "");
        assert_eq!(cell_text(&json!(42)), "42");
        assert_eq!(cell_text(&json!(["a", "b"])), "a, b");
    }
}
