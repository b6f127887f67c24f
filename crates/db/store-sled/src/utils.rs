use beacon_db_types::DbError;

pub(crate) fn sled_err(e: sled::Error) -> DbError {
    match e {
        sled::Error::Io(io) => DbError::IoError(io.to_string()),
        other => DbError::Other(other.to_string()),
    }
}
