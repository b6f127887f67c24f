use beacon_db_types::DbError;
use beacon_primitives::Checkpoint;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    /// Nothing resident and no head state to reload from. Never swallowed.
    #[error("no seed state available to reload {0}")]
    NoSeedState(Checkpoint),

    #[error("checkpoint cache invariant violated: {0}")]
    InvariantViolation(String),

    #[error("blocking task failed: {0}")]
    WorkerFailed(String),

    #[error("persistence: {0}")]
    Db(#[from] DbError),
}

#[derive(Debug, Clone, Error)]
pub enum StateLoadError {
    #[error("seed state incompatible with stored state: {0}")]
    IncompatibleSeed(String),

    #[error("malformed state bytes: {0}")]
    Malformed(String),

    #[error("{0}")]
    Other(String),
}
