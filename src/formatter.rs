//! SQL pretty-printer
//!
//! Puts each major clause on its own line and upper-cases keywords. It works
//! on text, not a parse tree, so keywords inside string literals are touched
//! as well.

use crate::error::{PracticeError, Result};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    // Multi-word clauses come first so they stay on one line.
    static ref CLAUSE: Regex = Regex::new(
        r"(?i)\b(LEFT JOIN|RIGHT JOIN|INNER JOIN|OUTER JOIN|GROUP BY|ORDER BY|SELECT|FROM|WHERE|HAVING|LIMIT|OFFSET|JOIN)\b"
    )
    .unwrap();
    static ref KEYWORD: Regex = Regex::new(
        r"(?i)\b(SELECT|FROM|WHERE|ORDER|BY|GROUP|HAVING|LIMIT|OFFSET|JOIN|LEFT|RIGHT|INNER|OUTER|ON|AND|OR|NOT|IN|LIKE|BETWEEN|AS|DISTINCT|COUNT|SUM|AVG|MIN|MAX|ASC|DESC)\b"
    )
    .unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

pub fn format_query(sql: &str) -> Result<String> {
    let collapsed = WHITESPACE.replace_all(sql.trim(), " ");
    if collapsed.is_empty() {
        return Err(PracticeError::InvalidInput("Write a query first".to_string()));
    }

    let broken = CLAUSE.replace_all(&collapsed, |caps: &Captures| {
        format!("\n{}", caps[1].to_uppercase())
    });
    let upper = KEYWORD.replace_all(&broken, |caps: &Captures| caps[1].to_uppercase());

    let trimmed = upper
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");

    Ok(BLANK_LINES.replace_all(&trimmed, "\n\n").trim().to_string())
}
