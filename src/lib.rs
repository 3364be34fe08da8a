pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod feedback;
pub mod formatter;
pub mod history;
pub mod progress;
pub mod result;
pub mod session;
pub mod sql_engine;
pub mod store;

pub use catalog::{Catalog, Challenge, Dataset};
pub use config::PracticeConfig;
pub use error::{PracticeError, Result};
pub use feedback::{
    classify, find_similar_columns, levenshtein_distance, validate, ErrorClassification,
    ErrorKind, ExpectedOutput, ValidationOutcome,
};
pub use result::QueryResult;
pub use session::{PracticeSession, QueryOutcome, Submission};
pub use sql_engine::SqlEngine;
