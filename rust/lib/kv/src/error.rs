use thiserror::Error;

#[derive(Error, Debug)]
pub enum KVError {
    /// The backend could not be reached (I/O failure, closed database, timeout).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
