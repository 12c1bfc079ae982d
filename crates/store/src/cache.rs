//! Local cache contract and the snapshot format written to it.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use jobreview_core::{JobId, Review, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Current on-disk snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Cache key of the draft review for `job`.
pub fn cache_key(job: JobId) -> String {
    format!("job-{job}-review")
}

/// Parse a job id back out of a [`cache_key`].
pub fn job_from_key(key: &str) -> Option<JobId> {
    key.strip_prefix("job-")?
        .strip_suffix("-review")?
        .parse()
        .ok()
}

/// A recoverable copy of a draft review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSnapshot {
    pub version: u32,
    pub saved_at: Timestamp,
    pub review: Review,
}

impl ReviewSnapshot {
    /// Snapshot a draft review. Persisted reviews are never cached.
    pub fn capture(review: &Review) -> Result<Self, CacheError> {
        if !review.is_draft() {
            return Err(CacheError::NotDraft { job: review.job });
        }
        Ok(Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            review: review.clone(),
        })
    }

    /// Check a snapshot read back from the cache under `job`.
    pub fn verify(self, job: JobId) -> Result<Self, CacheError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(CacheError::UnsupportedVersion {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        if self.review.job != job {
            return Err(CacheError::Corrupt {
                key: cache_key(job),
                reason: format!("snapshot belongs to job {}", self.review.job),
            });
        }
        if !self.review.is_draft() {
            return Err(CacheError::Corrupt {
                key: cache_key(job),
                reason: "snapshot holds a submitted review".to_string(),
            });
        }
        Ok(self)
    }
}

/// Client-durable store of at most one draft review per job.
pub trait ReviewCache: Send + Sync {
    /// Write a snapshot of `review`, replacing any previous one for its job.
    fn save(&self, review: &Review) -> impl Future<Output = Result<(), CacheError>> + Send;

    /// Read back the cached draft for `job`, if any.
    fn load(&self, job: JobId) -> impl Future<Output = Result<Option<Review>, CacheError>> + Send;

    /// Drop the cached draft for `job`. Removing a missing entry succeeds.
    fn remove(&self, job: JobId) -> impl Future<Output = Result<(), CacheError>> + Send;
}

impl<T: ReviewCache> ReviewCache for Arc<T> {
    async fn save(&self, review: &Review) -> Result<(), CacheError> {
        (**self).save(review).await
    }

    async fn load(&self, job: JobId) -> Result<Option<Review>, CacheError> {
        (**self).load(job).await
    }

    async fn remove(&self, job: JobId) -> Result<(), CacheError> {
        (**self).remove(job).await
    }
}
