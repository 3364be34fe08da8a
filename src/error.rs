use thiserror::Error;

#[derive(Error, Debug)]
pub enum PracticeError {
    /// Raw engine error text, displayed verbatim so hints can match on it.
    #[error("{0}")]
    Query(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Challenge error: {0}")]
    Challenge(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, PracticeError>;
