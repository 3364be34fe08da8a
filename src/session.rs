//! Practice Session
//!
//! Owns everything that changes while someone practices: the loaded dataset,
//! completed challenges and query history. Grading and hinting stay pure;
//! the session only feeds them the right context.

use crate::catalog::{Catalog, Challenge};
use crate::config::PracticeConfig;
use crate::error::{PracticeError, Result};
use crate::feedback::{classify, validate, ErrorClassification, ValidationOutcome};
use crate::history::{HistoryEntry, QueryHistory};
use crate::progress::{Progress, ProgressSummary};
use crate::result::QueryResult;
use crate::sql_engine::{ColumnInfo, SqlEngine};
use crate::store::{ProgressStore, HISTORY_KEY, PROGRESS_KEY};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

/// Schema listing for the loaded dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSchema {
    pub name: String,
    pub rows: u32,
    pub columns: Vec<ColumnInfo>,
}

impl DatasetSchema {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Result of running a query in free practice
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Rows(QueryResult),
    /// The statement ran but produced no rows (or no result set at all)
    NoRows,
    Failed {
        message: String,
        classification: ErrorClassification,
    },
}

/// Result of submitting an answer to a challenge
#[derive(Debug, Clone)]
pub struct Submission {
    pub challenge_id: u32,
    pub outcome: ValidationOutcome,
    /// What the query returned, for side-by-side display
    pub result: Option<QueryResult>,
    /// Hint for an engine error, when the query did not run
    pub error: Option<ErrorClassification>,
    /// Next challenge to offer, if any
    pub next_challenge_id: Option<u32>,
}

pub struct PracticeSession {
    catalog: Catalog,
    engine: SqlEngine,
    store: ProgressStore,
    progress: Progress,
    history: QueryHistory,
    current: DatasetSchema,
}

impl PracticeSession {
    /// Open a session backed by the store in `config.home`.
    pub fn open(config: &PracticeConfig) -> Result<Self> {
        let store = ProgressStore::open(&config.home)?;
        Self::with_store(store, config)
    }

    /// Session whose progress is forgotten when it is dropped
    pub fn in_memory() -> Result<Self> {
        Self::with_store(ProgressStore::in_memory()?, &PracticeConfig::default())
    }

    pub fn with_store(store: ProgressStore, config: &PracticeConfig) -> Result<Self> {
        let catalog = Catalog::bundled()?;
        let engine = SqlEngine::new()?;

        let progress: Progress = store.get_json(PROGRESS_KEY)?.unwrap_or_default();
        let entries: Vec<HistoryEntry> = store.get_json(HISTORY_KEY)?.unwrap_or_default();
        let history = QueryHistory::from_entries(entries, config.history_limit);
        debug!(
            "Restored {} completed challenges and {} history entries",
            progress.completed_count(),
            history.len()
        );

        let current = load_schema(&catalog, &engine, &config.default_dataset)?;

        Ok(Self {
            catalog,
            engine,
            store,
            progress,
            history,
            current,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current_dataset(&self) -> &DatasetSchema {
        &self.current
    }

    /// Load another dataset, replacing the current one.
    pub fn switch_dataset(&mut self, name: &str) -> Result<&DatasetSchema> {
        info!("Switching to dataset: {}", name);
        self.current = load_schema(&self.catalog, &self.engine, name)?;
        Ok(&self.current)
    }

    /// Run a query against the current dataset.
    ///
    /// Engine errors are not returned as `Err`; they become
    /// [`QueryOutcome::Failed`] with a hint attached.
    pub fn run_query(&mut self, query: &str) -> Result<QueryOutcome> {
        let query = non_empty(query)?;
        self.record_history(query)?;

        match self.engine.execute(query) {
            Ok(Some(result)) if !result.is_empty() => Ok(QueryOutcome::Rows(result)),
            Ok(_) => Ok(QueryOutcome::NoRows),
            Err(PracticeError::Query(message)) => {
                let classification = self.classify_current(&message);
                Ok(QueryOutcome::Failed {
                    message,
                    classification,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Grade `query` as an answer to challenge `challenge_id`.
    ///
    /// The challenge's dataset is reloaded first so earlier statements cannot
    /// affect the result. A correct answer is recorded in progress.
    pub fn submit(&mut self, challenge_id: u32, query: &str) -> Result<Submission> {
        let query = non_empty(query)?;
        let challenge = self.challenge(challenge_id)?.clone();

        self.switch_dataset(&challenge.dataset)?;

        let next_challenge_id = self.catalog.next_challenge_id(challenge_id);
        let result = match self.engine.execute(query) {
            Ok(result) => result,
            Err(PracticeError::Query(message)) => {
                let classification = self.classify_current(&message);
                return Ok(Submission {
                    challenge_id,
                    outcome: ValidationOutcome {
                        correct: false,
                        message: "Query Error".to_string(),
                        hint: Some(message),
                    },
                    result: None,
                    error: Some(classification),
                    next_challenge_id,
                });
            }
            Err(e) => return Err(e),
        };

        let outcome = validate(result.as_ref(), &challenge.expected_output);
        if outcome.correct {
            info!("Challenge {} solved", challenge_id);
            self.progress.mark_completed(challenge_id);
            self.store.put_json(PROGRESS_KEY, &self.progress)?;
        }

        Ok(Submission {
            challenge_id,
            outcome,
            result,
            error: None,
            next_challenge_id,
        })
    }

    pub fn challenge(&self, id: u32) -> Result<&Challenge> {
        self.catalog
            .challenge(id)
            .ok_or_else(|| PracticeError::Challenge(format!("No challenge with id {}", id)))
    }

    pub fn is_completed(&self, challenge_id: u32) -> bool {
        self.progress.is_completed(challenge_id)
    }

    pub fn progress_summary(&self) -> ProgressSummary {
        self.progress.summary(self.catalog.challenges().len())
    }

    pub fn reset_progress(&mut self) -> Result<()> {
        self.progress.reset();
        self.store.remove(PROGRESS_KEY)?;
        info!("Progress reset");
        Ok(())
    }

    pub fn history(&self) -> &QueryHistory {
        &self.history
    }

    /// Query text of the `position`-th history entry, counting from 1 at
    /// the newest as the history listing does.
    pub fn recall_query(&self, position: usize) -> Result<String> {
        position
            .checked_sub(1)
            .and_then(|index| self.history.get(index))
            .map(|entry| entry.query.clone())
            .ok_or_else(|| {
                PracticeError::InvalidInput(format!(
                    "No history entry {} (history has {})",
                    position,
                    self.history.len()
                ))
            })
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.history.clear();
        self.store.remove(HISTORY_KEY)
    }

    fn record_history(&mut self, query: &str) -> Result<()> {
        if self.history.record(query, &self.current.name, Utc::now()) {
            self.store.put_json(HISTORY_KEY, &self.history.to_vec())?;
        }
        Ok(())
    }

    fn classify_current(&self, message: &str) -> ErrorClassification {
        classify(message, &self.current.name, &self.current.column_names())
    }
}

fn non_empty(query: &str) -> Result<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(PracticeError::InvalidInput("Write a query first".to_string()));
    }
    Ok(query)
}

fn load_schema(catalog: &Catalog, engine: &SqlEngine, name: &str) -> Result<DatasetSchema> {
    let dataset = catalog.dataset(name).ok_or_else(|| {
        PracticeError::Dataset(format!(
            "Dataset \"{}\" not found (available: {})",
            name,
            catalog.dataset_names().join(", ")
        ))
    })?;

    engine.load_dataset(dataset)?;
    Ok(DatasetSchema {
        name: dataset.name.clone(),
        rows: dataset.rows,
        columns: engine.table_columns(dataset.table_name())?,
    })
}
