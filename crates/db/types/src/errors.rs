use beacon_primitives::Checkpoint;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DbError {
    #[error("entry with idx does not exist")]
    NonExistentEntry,

    #[error("entry already exists for checkpoint {0}")]
    EntryAlreadyExists(Checkpoint),

    #[error("IO Error: {0}")]
    IoError(String),

    #[error("operation timed out")]
    TimedOut,

    #[error("operation aborted")]
    Aborted,

    /// A database worker task failed in an way that could not be determined.
    #[error("worked task exited strangely")]
    WorkerFailedStrangely,

    #[error("codec error {0}")]
    CodecError(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for DbError {
    fn from(value: anyhow::Error) -> Self {
        Self::Other(value.to_string())
    }
}

impl From<std::io::Error> for DbError {
    fn from(value: std::io::Error) -> Self {
        Self::IoError(value.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
