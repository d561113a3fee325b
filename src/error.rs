use std::time::Duration;

/// Failures of the renderer session.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The session could not be started at all.
    #[error("could not start renderer session: {0}")]
    Launch(String),
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("timed out after {waited:?} waiting for `{selector}`")]
    Timeout { selector: String, waited: Duration },
    #[error("invalid selector `{0}`")]
    Selector(String),
}

/// A showtime string that is not `H:MM` with an optional AM/PM suffix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed showtime {0:?}")]
pub struct MalformedTime(pub String);

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("store document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not replace store file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Conditions that abort a whole ingestion run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Launch(RenderError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
