use thiserror::Error;

pub type Result<T> = std::result::Result<T, MoneypitError>;

#[derive(Debug, Error)]
pub enum MoneypitError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No idea how to parse it: {0}")]
    UnrecognizedFile(String),

    #[error("Malformed statement line: {0}")]
    MalformedLine(String),

    #[error("Bad date '{0}': {1}")]
    BadDate(String, String),

    #[error("No such category")]
    UnknownCategory,

    #[error("No such rule: {0}")]
    UnknownRule(i64),

    #[error("No such transaction: {0}")]
    UnknownTransaction(i64),

    #[error("No such file: {0}")]
    UnknownFile(i64),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}
