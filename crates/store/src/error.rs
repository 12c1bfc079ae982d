use jobreview_core::{CoreError, DbId, JobId};

/// Failures reported by the job's backing store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Backing store unavailable: {0}")]
    Unavailable(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The review was stored but its cached draft could not be cleared.
    #[error("Review for job {job} was submitted but its cached draft is stale: {reason}")]
    StaleDraft { job: JobId, reason: String },
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            CoreError::Validation(msg) => Self::Rejected(msg),
            CoreError::Conflict(msg) => Self::Conflict(msg),
        }
    }
}

/// Failures reading or writing the local review cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize review snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Corrupt review snapshot '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Unsupported snapshot version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Only draft reviews can be cached (job {job})")]
    NotDraft { job: JobId },
}
