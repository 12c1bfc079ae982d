//! File-backed review cache.
//!
//! Each job's draft lives in `<cache_dir>/job-<id>-review.json`. Writes go
//! to a sibling temp file first and are renamed into place, so a crash
//! mid-write leaves the previous snapshot intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use jobreview_core::{JobId, Review};

use crate::cache::{cache_key, job_from_key, ReviewCache, ReviewSnapshot};
use crate::config::CacheConfig;
use crate::error::CacheError;

const SNAPSHOT_EXTENSION: &str = "json";

pub struct FileReviewCache {
    dir: PathBuf,
}

impl FileReviewCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.cache_dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, job: JobId) -> PathBuf {
        self.dir
            .join(format!("{}.{SNAPSHOT_EXTENSION}", cache_key(job)))
    }

    /// Read the full snapshot (including metadata) for `job`.
    pub async fn snapshot(&self, job: JobId) -> Result<Option<ReviewSnapshot>, CacheError> {
        let bytes = match tokio::fs::read(self.path_for(job)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot: ReviewSnapshot =
            serde_json::from_slice(&bytes).map_err(|e| CacheError::Corrupt {
                key: cache_key(job),
                reason: e.to_string(),
            })?;

        snapshot.verify(job).map(Some)
    }

    /// List the jobs that currently have a cached draft, in ascending order.
    ///
    /// A missing cache directory is treated as empty.
    pub async fn jobs(&self) -> Result<Vec<JobId>, CacheError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut jobs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }
            if let Some(job) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(job_from_key)
            {
                jobs.push(job);
            }
        }
        jobs.sort_unstable();
        Ok(jobs)
    }
}

impl ReviewCache for FileReviewCache {
    async fn save(&self, review: &Review) -> Result<(), CacheError> {
        let snapshot = ReviewSnapshot::capture(review)?;
        let json = serde_json::to_vec_pretty(&snapshot)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(review.job);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!(
            job = review.job,
            issues = review.issues().len(),
            path = %path.display(),
            "Cached draft review"
        );
        Ok(())
    }

    async fn load(&self, job: JobId) -> Result<Option<Review>, CacheError> {
        Ok(self.snapshot(job).await?.map(|s| s.review))
    }

    async fn remove(&self, job: JobId) -> Result<(), CacheError> {
        match tokio::fs::remove_file(self.path_for(job)).await {
            Ok(()) => {
                tracing::debug!(job, "Removed cached draft review");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
