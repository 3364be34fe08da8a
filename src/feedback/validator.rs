//! Result Validator
//!
//! Grades a query result against the expected shape of a challenge:
//! column names (order-sensitive, case-insensitive) and row count.
//! Cell values are never compared.

use crate::result::QueryResult;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub const NO_RESULTS_MESSAGE: &str = "Query returned no results";
pub const COLUMN_MISMATCH_MESSAGE: &str = "Column names don't match";
pub const SUCCESS_MESSAGE: &str = "Perfect! Your query matches the expected output. Well done!";

/// Expected shape of a correct answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
}

impl ExpectedOutput {
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: Some(columns.into_iter().map(Into::into).collect()),
            row_count: None,
        }
    }

    pub fn with_row_count(mut self, row_count: usize) -> Self {
        self.row_count = Some(row_count);
        self
    }
}

/// Verdict for one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub correct: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ValidationOutcome {
    fn pass() -> Self {
        Self {
            correct: true,
            message: SUCCESS_MESSAGE.to_string(),
            hint: None,
        }
    }

    fn fail(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            correct: false,
            message: message.into(),
            hint: Some(hint.into()),
        }
    }
}

/// Validate a result against the expected output.
///
/// A missing or zero-row result always fails, even when the expected row
/// count is zero.
pub fn validate(result: Option<&QueryResult>, expected: &ExpectedOutput) -> ValidationOutcome {
    let result = match result {
        Some(r) if !r.is_empty() => r,
        _ => {
            return ValidationOutcome::fail(
                NO_RESULTS_MESSAGE,
                "Your query executed but returned 0 rows. Check your WHERE clause and table name.",
            )
        }
    };

    if let Some(expected_columns) = &expected.columns {
        if !columns_match(&result.columns, expected_columns) {
            return ValidationOutcome::fail(
                COLUMN_MISMATCH_MESSAGE,
                format!(
                    "Expected columns: {}\nYour columns: {}",
                    expected_columns.iter().join(", "),
                    result.columns.iter().join(", ")
                ),
            );
        }
    }

    if let Some(expected_rows) = expected.row_count {
        let actual_rows = result.row_count();
        if actual_rows != expected_rows {
            return ValidationOutcome::fail(
                format!(
                    "Wrong number of rows: expected {}, got {}",
                    expected_rows, actual_rows
                ),
                format!(
                    "Expected {} rows, but got {} rows. Check your WHERE clause and LIMIT.",
                    expected_rows, actual_rows
                ),
            );
        }
    }

    ValidationOutcome::pass()
}

fn columns_match(actual: &[String], expected: &[String]) -> bool {
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected)
            .all(|(a, e)| a.to_lowercase() == e.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(columns: &[&str], rows: usize) -> QueryResult {
        QueryResult::new(
            columns.iter().map(|c| c.to_string()).collect(),
            (0..rows)
                .map(|i| columns.iter().map(|_| json!(i)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_case_is_ignored() {
        let expected = ExpectedOutput::columns(["ID", "Name"]);
        let outcome = validate(Some(&result(&["id", "name"], 3)), &expected);
        assert!(outcome.correct);
        assert_eq!(outcome.message, SUCCESS_MESSAGE);
        assert!(outcome.hint.is_none());

        let expected = ExpectedOutput::columns(["department", "COUNT(*)"]);
        assert!(validate(Some(&result(&["Department", "count(*)"], 4)), &expected).correct);
    }

    #[test]
    fn test_column_order_matters() {
        let expected = ExpectedOutput::columns(["first_name", "last_name", "salary"]);
        let outcome = validate(Some(&result(&["salary", "first_name", "last_name"], 2)), &expected);
        assert!(!outcome.correct);
        assert_eq!(outcome.message, COLUMN_MISMATCH_MESSAGE);
        let hint = outcome.hint.unwrap();
        assert!(hint.contains("first_name, last_name, salary"));
        assert!(hint.contains("salary, first_name, last_name"));
    }

    #[test]
    fn test_extra_or_missing_columns_fail() {
        let expected = ExpectedOutput::columns(["a", "b"]);
        assert!(!validate(Some(&result(&["a"], 1)), &expected).correct);
        assert!(!validate(Some(&result(&["a", "b", "c"], 1)), &expected).correct);
    }

    #[test]
    fn test_row_count() {
        let expected = ExpectedOutput::columns(["salary"]).with_row_count(5);
        assert!(validate(Some(&result(&["salary"], 5)), &expected).correct);

        for rows in [4, 6] {
            let outcome = validate(Some(&result(&["salary"], rows)), &expected);
            assert!(!outcome.correct);
            assert!(outcome.message.contains("5"));
            assert!(outcome.message.contains(&rows.to_string()));
        }
    }

    #[test]
    fn test_row_count_without_columns() {
        let expected = ExpectedOutput {
            columns: None,
            row_count: Some(2),
        };
        assert!(validate(Some(&result(&["anything"], 2)), &expected).correct);
    }

    #[test]
    fn test_zero_rows_always_fail() {
        let expected = ExpectedOutput::columns(["id"]).with_row_count(0);
        let outcome = validate(Some(&result(&["id"], 0)), &expected);
        assert!(!outcome.correct);
        assert_eq!(outcome.message, NO_RESULTS_MESSAGE);

        let outcome = validate(None, &ExpectedOutput::default());
        assert!(!outcome.correct);
        assert_eq!(outcome.message, NO_RESULTS_MESSAGE);
    }

    #[test]
    fn test_columns_checked_before_rows() {
        let expected = ExpectedOutput::columns(["a"]).with_row_count(1);
        let outcome = validate(Some(&result(&["b"], 3)), &expected);
        assert_eq!(outcome.message, COLUMN_MISMATCH_MESSAGE);
    }
}
