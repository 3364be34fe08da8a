//! SQL Engine Module
//!
//! Thin wrapper around an in-memory SQLite connection. Parsing, planning and
//! storage all belong to SQLite; this module loads the practice datasets,
//! runs user queries and converts rows into [`QueryResult`].

use crate::catalog::Dataset;
use crate::error::{PracticeError, Result};
use crate::result::QueryResult;
use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection, Statement};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Column name and declared type, as reported by `pragma_table_info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

pub struct SqlEngine {
    conn: Connection,
}

impl SqlEngine {
    /// Open an empty in-memory database
    pub fn new() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| PracticeError::Dataset(format!("Failed to open SQL engine: {}", e)))?;
        Ok(Self { conn })
    }

    /// Replace whatever is loaded with `dataset`.
    pub fn load_dataset(&self, dataset: &Dataset) -> Result<()> {
        for table in self.tables()? {
            if let Err(e) = self
                .conn
                .execute_batch(&format!("DROP TABLE IF EXISTS \"{}\"", table.replace('"', "\"\"")))
            {
                warn!("Failed to drop table {}: {}", table, e);
            }
        }

        self.conn.execute_batch(dataset.script).map_err(|e| {
            PracticeError::Dataset(format!("Failed to load dataset '{}': {}", dataset.name, e))
        })?;

        info!("Loaded dataset: {}", dataset.name);
        Ok(())
    }

    /// User tables currently in the database
    pub fn tables(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .map_err(query_error)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(query_error)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(query_error)?;
        Ok(names)
    }

    /// Columns of `table` in declaration order
    pub fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, type FROM pragma_table_info(?1)")
            .map_err(query_error)?;
        let columns = stmt
            .query_map([table], |row| {
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    data_type: row.get::<_, String>(1)?.to_uppercase(),
                })
            })
            .map_err(query_error)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(query_error)?;
        Ok(columns)
    }

    /// Run every statement in `sql`, in order.
    ///
    /// The first statement that returns rows supplies the result. When none
    /// does, the first statement that has columns is returned with zero rows,
    /// and input made only of DDL/DML yields `None`. A failing statement
    /// stops the batch; statements before it stay applied. Engine failures
    /// come back as [`PracticeError::Query`] carrying SQLite's message
    /// unchanged.
    pub fn execute(&self, sql: &str) -> Result<Option<QueryResult>> {
        let sql = normalize_statement(sql);
        if sql.is_empty() {
            return Err(PracticeError::InvalidInput("Write a query first".to_string()));
        }

        let start = Instant::now();
        debug!("Executing query: {}", sql);

        let mut batch = Batch::new(&self.conn, sql);
        let mut with_rows: Option<QueryResult> = None;
        let mut without_rows: Option<QueryResult> = None;
        let mut statements = 0usize;

        while let Some(mut stmt) = batch.next().map_err(query_error)? {
            statements += 1;
            match collect_rows(&mut stmt)? {
                Some(result) if !result.is_empty() => {
                    with_rows.get_or_insert(result);
                }
                Some(result) => {
                    without_rows.get_or_insert(result);
                }
                None => {}
            }
        }

        let result = with_rows.or(without_rows);
        debug!(
            "Ran {} statement(s), {} rows returned in {}ms",
            statements,
            result.as_ref().map_or(0, QueryResult::row_count),
            start.elapsed().as_millis()
        );
        Ok(result)
    }
}

/// Step one prepared statement to completion.
///
/// `None` for statements without result columns.
fn collect_rows(stmt: &mut Statement<'_>) -> Result<Option<QueryResult>> {
    if stmt.column_count() == 0 {
        stmt.execute([]).map_err(query_error)?;
        return Ok(None);
    }

    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let mut rows = Vec::new();
    let mut cursor = stmt.query([]).map_err(query_error)?;
    while let Some(row) = cursor.next().map_err(query_error)? {
        let mut cells = Vec::with_capacity(width);
        for idx in 0..width {
            cells.push(to_json(row.get_ref(idx).map_err(query_error)?));
        }
        rows.push(cells);
    }

    Ok(Some(QueryResult::new(columns, rows)))
}

/// Trim whitespace and trailing semicolons.
fn normalize_statement(sql: &str) -> &str {
    sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}

fn query_error(err: rusqlite::Error) -> PracticeError {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(msg)) => PracticeError::Query(msg),
        other => PracticeError::Query(other.to_string()),
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<blob {} bytes>", b.len())),
    }
}
