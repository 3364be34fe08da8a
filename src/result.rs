//! Query Result - tabular output of a single statement

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Columns and rows returned by the engine for one statement.
///
/// Cells are nullable scalars: `Value::Null`, numbers and strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names in the order the engine reported them
    pub columns: Vec<String>,

    /// Rows in engine order, each with one cell per column
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Text form of a cell as shown to the user. NULL is spelled out.
pub fn display_cell(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text form of a cell for export, where NULL becomes an empty field.
pub fn export_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => display_cell(other),
    }
}
