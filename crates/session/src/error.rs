use jobreview_core::{CoreError, FrameNumber, IssueId};
use jobreview_store::{CacheError, StoreError};

/// Why a review operation failed. Carried by every failure action.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error("Review session has not been initialized")]
    NotInitialized,

    #[error("No issue is being drafted")]
    NoIssueDraft,

    #[error("Issue {id} is not on frame {frame}")]
    IssueNotFound { id: IssueId, frame: FrameNumber },
}
