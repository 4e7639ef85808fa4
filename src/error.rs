use thiserror::Error;

#[derive(Debug, Error)]
pub enum CountdownError {
    #[error("Could not load the events: {0}")]
    StorageRead(#[source] StorageError),
    #[error("Could not save the events: {0}")]
    StorageWrite(#[source] StorageError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("An event with id {0} already exists")]
    DuplicateEventId(String),
    #[error("IO error: {0:?}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to serialize configuration: {0:?}")]
    RonError(#[from] ron::Error),
    #[error("Failed to parse configuration: {0:?}")]
    RonSpannedError(#[from] ron::error::SpannedError),
    #[error("The tick interval must be at least one millisecond")]
    InvalidTickInterval,
    #[error("Could not determine the configuration directory")]
    NoProjectDirs,
    #[error("Failed to join task (this should never happen, please report): {0:?}")]
    JoinError(#[from] tokio::task::JoinError),
}

/// Why a storage slot could not be read or written
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage access failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored events are malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Input rejected before it reaches the store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("You need to give the event a name!")]
    EmptyName,
    #[error("The chosen date must be in the future")]
    DateNotInFuture,
    #[error("The chosen time does not exist on that date")]
    NonexistentLocalTime,
}
