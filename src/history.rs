//! Query history (most recent first)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

const PREVIEW_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub dataset: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// First line-ish of the query for list display
    pub fn preview(&self) -> String {
        if self.query.chars().count() > PREVIEW_CHARS {
            let head: String = self.query.chars().take(PREVIEW_CHARS).collect();
            format!("{}...", head)
        } else {
            self.query.clone()
        }
    }
}

/// Bounded list of executed queries, newest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryHistory {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl QueryHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    /// Rebuild from persisted entries, keeping at most `limit`.
    pub fn from_entries(entries: Vec<HistoryEntry>, limit: usize) -> Self {
        let mut entries: VecDeque<HistoryEntry> = entries.into();
        entries.truncate(limit);
        Self { entries, limit }
    }

    /// Record a query. Re-running the newest query is not recorded again.
    /// Returns whether the history changed.
    pub fn record(&mut self, query: &str, dataset: &str, timestamp: DateTime<Utc>) -> bool {
        if self.entries.front().map_or(false, |e| e.query == query) {
            return false;
        }

        self.entries.push_front(HistoryEntry {
            query: query.to_string(),
            dataset: dataset.to_string(),
            timestamp,
        });
        self.entries.truncate(self.limit);
        true
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for QueryHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

/// Coarse relative time: "just now", "5 min ago", "3 hr ago", "2 days ago".
pub fn time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds().max(0);
    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3600 {
        format!("{} min ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hr ago", seconds / 3600)
    } else {
        format!("{} days ago", seconds / 86400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_newest_first_and_dedup() {
        let mut history = QueryHistory::new(10);
        assert!(history.record("SELECT 1", "employees", at(0)));
        assert!(history.record("SELECT 2", "employees", at(1)));
        assert!(!history.record("SELECT 2", "employees", at(2)));
        // Only the newest entry is checked for duplicates.
        assert!(history.record("SELECT 1", "orders", at(3)));

        let queries: Vec<&str> = history.entries().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["SELECT 1", "SELECT 2", "SELECT 1"]);
        assert_eq!(history.get(0).unwrap().dataset, "orders");
    }

    #[test]
    fn test_limit() {
        let mut history = QueryHistory::new(3);
        for i in 0..5 {
            history.record(&format!("SELECT {}", i), "sales", at(i));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.get(0).unwrap().query, "SELECT 4");
        assert_eq!(history.get(2).unwrap().query, "SELECT 2");

        let restored = QueryHistory::from_entries(history.to_vec(), 2);
        assert_eq!(restored.len(), 2);
    }

    #[test]
    fn test_preview() {
        let short = HistoryEntry {
            query: "SELECT * FROM sales".to_string(),
            dataset: "sales".to_string(),
            timestamp: at(0),
        };
        assert_eq!(short.preview(), "SELECT * FROM sales");

        let long = HistoryEntry {
            query: "x".repeat(80),
            ..short
        };
        assert_eq!(long.preview(), format!("{}...", "x".repeat(60)));
    }

    #[test]
    fn test_time_ago() {
        let now = at(0);
        assert_eq!(time_ago(now - Duration::seconds(59), now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5 min ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3 hr ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2 days ago");
        assert_eq!(time_ago(now + Duration::seconds(10), now), "just now");
    }
}
