//! Error Hint Engine
//!
//! Turns raw engine error text into a user-facing hint. Classification is an
//! ordered table of rules; the first rule whose predicate matches the message
//! decides the outcome. Matching is substring-based on SQLite's wording.

use super::similarity::find_similar_columns;
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;

pub const FALLBACK_HINT: &str = "Check your SQL syntax and table/column names.";

lazy_static! {
    static ref NO_SUCH_TABLE: Regex = Regex::new(r"no such table: (\w+)").unwrap();
    static ref NO_SUCH_COLUMN: Regex = Regex::new(r"no such column: (\w+)").unwrap();
    static ref NEAR_FRAGMENT: Regex = Regex::new(r#"near "([^"]+)""#).unwrap();
    static ref DEFAULT_ENGINE: ErrorHintEngine = ErrorHintEngine::new();
}

/// Error hint taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    MissingTable,
    MissingColumn,
    SyntaxError,
    AmbiguousColumn,
    Unclassified,
    /// Category contributed by a rule registered with [`ErrorHintEngine::with_rule`]
    Custom(&'static str),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MissingTable => write!(f, "MissingTable"),
            ErrorKind::MissingColumn => write!(f, "MissingColumn"),
            ErrorKind::SyntaxError => write!(f, "SyntaxError"),
            ErrorKind::AmbiguousColumn => write!(f, "AmbiguousColumn"),
            ErrorKind::Unclassified => write!(f, "Unclassified"),
            ErrorKind::Custom(name) => write!(f, "Custom({})", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorClassification {
    pub kind: ErrorKind,
    pub hint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorClassification {
    fn unclassified() -> Self {
        Self {
            kind: ErrorKind::Unclassified,
            hint: FALLBACK_HINT.to_string(),
            suggestion: None,
        }
    }
}

/// What the caller knows about the dataset the query ran against
#[derive(Debug, Clone, Copy)]
pub struct HintContext<'a> {
    pub current_table: &'a str,
    pub known_columns: &'a [String],
}

/// Hint text and optional suggestion produced by a rule
pub type RuleOutput = (String, Option<String>);

/// One entry of the classification table.
///
/// `build` may return `None` when the message matched but lacks the detail
/// the rule needs; the engine then falls back to the generic hint without
/// trying later rules.
#[derive(Clone, Copy)]
pub struct HintRule {
    pub kind: ErrorKind,
    pub matches: fn(&str) -> bool,
    pub build: fn(&str, &HintContext<'_>) -> Option<RuleOutput>,
}

impl fmt::Debug for HintRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HintRule").field("kind", &self.kind).finish()
    }
}

/// Ordered rule table
#[derive(Debug, Clone)]
pub struct ErrorHintEngine {
    rules: Vec<HintRule>,
}

impl ErrorHintEngine {
    pub fn new() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    /// Append a rule. It is consulted after every rule already registered.
    pub fn with_rule(mut self, rule: HintRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[HintRule] {
        &self.rules
    }

    pub fn classify(&self, raw_message: &str, context: &HintContext<'_>) -> ErrorClassification {
        let Some(rule) = self.rules.iter().find(|rule| (rule.matches)(raw_message)) else {
            return ErrorClassification::unclassified();
        };

        match (rule.build)(raw_message, context) {
            Some((hint, suggestion)) => ErrorClassification {
                kind: rule.kind,
                hint,
                suggestion,
            },
            None => ErrorClassification::unclassified(),
        }
    }
}

impl Default for ErrorHintEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify with the built-in rules.
pub fn classify(
    raw_message: &str,
    current_table: &str,
    known_columns: &[String],
) -> ErrorClassification {
    DEFAULT_ENGINE.classify(
        raw_message,
        &HintContext {
            current_table,
            known_columns,
        },
    )
}

fn builtin_rules() -> Vec<HintRule> {
    vec![
        HintRule {
            kind: ErrorKind::MissingTable,
            matches: |msg| msg.contains("no such table"),
            build: missing_table,
        },
        HintRule {
            kind: ErrorKind::MissingColumn,
            matches: |msg| msg.contains("no such column"),
            build: missing_column,
        },
        HintRule {
            kind: ErrorKind::SyntaxError,
            matches: |msg| msg.contains("syntax error"),
            build: syntax_error,
        },
        HintRule {
            kind: ErrorKind::AmbiguousColumn,
            matches: |msg| msg.contains("ambiguous"),
            build: ambiguous_column,
        },
    ]
}

fn capture<'m>(pattern: &Regex, msg: &'m str) -> Option<&'m str> {
    pattern
        .captures(msg)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn missing_table(msg: &str, ctx: &HintContext<'_>) -> Option<RuleOutput> {
    let table = capture(&NO_SUCH_TABLE, msg)?;
    Some((
        format!("Table \"{}\" doesn't exist in the database.", table),
        Some(format!(
            "Did you mean \"{}\"? Make sure you're using the correct dataset.",
            ctx.current_table
        )),
    ))
}

fn missing_column(msg: &str, ctx: &HintContext<'_>) -> Option<RuleOutput> {
    let column = capture(&NO_SUCH_COLUMN, msg)?;
    let similar = find_similar_columns(column, ctx.known_columns);

    let suggestion = if similar.is_empty() {
        "Check the table schema for available columns.".to_string()
    } else {
        format!(
            "Did you mean: {}? Check the table schema for all available columns.",
            similar.iter().join(", ")
        )
    };

    Some((
        format!(
            "Column \"{}\" doesn't exist in the {} table.",
            column, ctx.current_table
        ),
        Some(suggestion),
    ))
}

fn syntax_error(msg: &str, _ctx: &HintContext<'_>) -> Option<RuleOutput> {
    let hint = "Your SQL syntax has an error.".to_string();
    if !msg.contains("near") {
        return Some((hint, None));
    }

    let mut suggestion = String::from(
        "Common syntax issues:\n\
         - Missing comma between column names\n\
         - Unmatched quotes (' or \")\n\
         - Missing closing parenthesis )\n\
         - Wrong keyword order (WHERE comes after FROM)",
    );
    if let Some(fragment) = capture(&NEAR_FRAGMENT, msg) {
        suggestion.push_str(&format!("\n- Check around: \"{}\"", fragment));
    }

    Some((hint, Some(suggestion)))
}

fn ambiguous_column(_msg: &str, ctx: &HintContext<'_>) -> Option<RuleOutput> {
    Some((
        "Column name exists in multiple tables.".to_string(),
        Some(format!(
            "Specify which table: table_name.column_name (for example {}.name instead of just name)",
            ctx.current_table
        )),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee_columns() -> Vec<String> {
        ["employee_id", "first_name", "last_name", "salary", "department"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_missing_table() {
        let c = classify("no such table: emplyees", "employees", &employee_columns());
        assert_eq!(c.kind, ErrorKind::MissingTable);
        assert!(c.hint.contains("emplyees"));
        assert!(c.suggestion.unwrap().contains("\"employees\""));
    }

    #[test]
    fn test_missing_column_with_suggestions() {
        let c = classify("no such column: salery", "employees", &employee_columns());
        assert_eq!(c.kind, ErrorKind::MissingColumn);
        assert!(c.hint.contains("salery"));
        assert!(c.hint.contains("employees"));
        assert!(c.suggestion.unwrap().contains("Did you mean: salary?"));
    }

    #[test]
    fn test_missing_column_without_suggestions() {
        let c = classify("no such column: xyz123", "employees", &employee_columns());
        assert_eq!(c.kind, ErrorKind::MissingColumn);
        assert_eq!(
            c.suggestion.as_deref(),
            Some("Check the table schema for available columns.")
        );
    }

    #[test]
    fn test_syntax_error_near_fragment() {
        let c = classify("syntax error near \"FORM\"", "employees", &[]);
        assert_eq!(c.kind, ErrorKind::SyntaxError);
        assert!(c.suggestion.unwrap().contains("\"FORM\""));

        // SQLite's own wording puts the fragment first.
        let c = classify("near \"FORM\": syntax error", "employees", &[]);
        assert_eq!(c.kind, ErrorKind::SyntaxError);
        assert!(c.suggestion.unwrap().contains("FORM"));
    }

    #[test]
    fn test_syntax_error_near_without_fragment() {
        let c = classify("syntax error near end of input", "employees", &[]);
        assert_eq!(c.kind, ErrorKind::SyntaxError);
        let suggestion = c.suggestion.unwrap();
        assert!(suggestion.starts_with("Common syntax issues:"));
        assert!(suggestion.contains("Missing comma between column names"));
        assert!(!suggestion.contains("Check around"));
    }

    #[test]
    fn test_syntax_error_without_near() {
        let c = classify("incomplete input: syntax error", "employees", &[]);
        assert_eq!(c.kind, ErrorKind::SyntaxError);
        assert!(c.suggestion.is_none());
    }

    #[test]
    fn test_ambiguous_column() {
        let c = classify("ambiguous column name: customer_id", "orders", &[]);
        assert_eq!(c.kind, ErrorKind::AmbiguousColumn);
        assert!(c.suggestion.unwrap().contains("orders.name"));
    }

    #[test]
    fn test_first_rule_wins() {
        // Mentions both a missing table and a syntax error; table rule is earlier.
        let c = classify("no such table: foo (syntax error)", "employees", &[]);
        assert_eq!(c.kind, ErrorKind::MissingTable);
    }

    #[test]
    fn test_unextractable_identifier_falls_back() {
        let c = classify("no such table", "employees", &[]);
        assert_eq!(c.kind, ErrorKind::Unclassified);
        assert_eq!(c.hint, FALLBACK_HINT);
    }

    #[test]
    fn test_unclassified() {
        let c = classify("datatype mismatch", "employees", &[]);
        assert_eq!(c.kind, ErrorKind::Unclassified);
        assert_eq!(c.hint, FALLBACK_HINT);
        assert!(c.suggestion.is_none());
    }

    #[test]
    fn test_custom_rule_is_consulted_after_builtins() {
        let engine = ErrorHintEngine::new().with_rule(HintRule {
            kind: ErrorKind::Custom("ReadOnly"),
            matches: |msg| msg.contains("readonly"),
            build: |_, _| Some(("The practice database is read-only.".to_string(), None)),
        });
        let ctx = HintContext {
            current_table: "employees",
            known_columns: &[],
        };

        let c = engine.classify("attempt to write a readonly database", &ctx);
        assert_eq!(c.kind, ErrorKind::Custom("ReadOnly"));
        assert_eq!(engine.rules().len(), 5);

        let c = engine.classify("no such table: x", &ctx);
        assert_eq!(c.kind, ErrorKind::MissingTable);
    }
}
