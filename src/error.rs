use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Tushare error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Schema mismatch at row {row}: {reason}")]
    SchemaMismatch { row: usize, reason: String },

    #[error("Store error: {0}")]
    Store(String),
}

impl From<clickhouse::error::Error> for AppError {
    fn from(err: clickhouse::error::Error) -> Self {
        AppError::Store(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
