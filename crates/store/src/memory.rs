//! In-process implementations of the store and cache contracts.
//!
//! [`InMemoryJobStore`] behaves like the remote backing store: submitting a
//! review assigns persisted ids to the review and every issue in it, and
//! persisted issues stay mutable through the issue endpoints while the
//! review itself is frozen.

use std::collections::{BTreeMap, HashMap};

use jobreview_core::{Comment, DbId, Issue, IssueId, JobId, Review, ReviewId, ReviewVerdict, User};
use tokio::sync::RwLock;

use crate::cache::{ReviewCache, ReviewSnapshot};
use crate::error::{CacheError, StoreError};
use crate::job::JobStore;

// ---------------------------------------------------------------------------
// MemoryReviewCache
// ---------------------------------------------------------------------------

/// Review cache held in memory; lost when the process exits.
#[derive(Default)]
pub struct MemoryReviewCache {
    snapshots: RwLock<HashMap<JobId, ReviewSnapshot>>,
}

impl MemoryReviewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs with a cached draft.
    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }
}

impl ReviewCache for MemoryReviewCache {
    async fn save(&self, review: &Review) -> Result<(), CacheError> {
        let snapshot = ReviewSnapshot::capture(review)?;
        self.snapshots.write().await.insert(review.job, snapshot);
        Ok(())
    }

    async fn load(&self, job: JobId) -> Result<Option<Review>, CacheError> {
        let snapshots = self.snapshots.read().await;
        match snapshots.get(&job) {
            Some(snapshot) => Ok(Some(snapshot.clone().verify(job)?.review)),
            None => Ok(None),
        }
    }

    async fn remove(&self, job: JobId) -> Result<(), CacheError> {
        self.snapshots.write().await.remove(&job);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// InMemoryJobStore
// ---------------------------------------------------------------------------

/// A submitted review as the store keeps it: issues are referenced by id so
/// that later issue mutations show up when the review is listed again.
struct StoredReview {
    id: DbId,
    job: JobId,
    issue_ids: Vec<DbId>,
    verdict: Option<ReviewVerdict>,
}

#[derive(Default)]
struct Inner {
    reviews: Vec<StoredReview>,
    issues: BTreeMap<DbId, Issue>,
    last_review_id: DbId,
    last_issue_id: DbId,
}

impl Inner {
    fn issue_mut(&mut self, id: DbId) -> Result<&mut Issue, StoreError> {
        self.issues
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "issue", id })
    }
}

#[derive(Default)]
pub struct InMemoryJobStore {
    inner: RwLock<Inner>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    async fn list_reviews(&self, job: JobId) -> Result<Vec<Review>, StoreError> {
        let inner = self.inner.read().await;
        inner
            .reviews
            .iter()
            .filter(|stored| stored.job == job)
            .map(|stored| {
                let issues = stored
                    .issue_ids
                    .iter()
                    .filter_map(|id| inner.issues.get(id).cloned())
                    .collect();
                Review::from_parts(
                    ReviewId::Persisted(stored.id),
                    stored.job,
                    issues,
                    stored.verdict,
                )
                .map_err(StoreError::from)
            })
            .collect()
    }

    async fn list_issues(&self, job: JobId) -> Result<Vec<Issue>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .issues
            .values()
            .filter(|issue| issue.job == job)
            .cloned()
            .collect())
    }

    async fn submit_review(&self, job: JobId, review: &Review) -> Result<(), StoreError> {
        if review.job != job {
            return Err(StoreError::Rejected(format!(
                "review belongs to job {}, not job {job}",
                review.job
            )));
        }
        if let ReviewId::Persisted(id) = review.id {
            return Err(StoreError::Conflict(format!(
                "review {id} has already been submitted"
            )));
        }

        let mut inner = self.inner.write().await;
        let review_id = inner.last_review_id + 1;
        let mut last_issue_id = inner.last_issue_id;
        let persisted = review.clone().into_persisted(review_id, || {
            last_issue_id += 1;
            last_issue_id
        })?;

        let mut issue_ids = Vec::with_capacity(persisted.issues().len());
        for issue in persisted.issues() {
            if let IssueId::Persisted(id) = issue.id {
                issue_ids.push(id);
                inner.issues.insert(id, issue.clone());
            }
        }
        inner.reviews.push(StoredReview {
            id: review_id,
            job,
            issue_ids,
            verdict: persisted.verdict().copied(),
        });
        inner.last_review_id = review_id;
        inner.last_issue_id = last_issue_id;

        tracing::debug!(job, review = review_id, "Stored submitted review");
        Ok(())
    }

    async fn comment_issue(&self, issue: DbId, comment: &Comment) -> Result<Issue, StoreError> {
        let mut inner = self.inner.write().await;
        let stored = inner.issue_mut(issue)?;
        stored.comment(comment.clone())?;
        Ok(stored.clone())
    }

    async fn resolve_issue(&self, issue: DbId, actor: &User) -> Result<Issue, StoreError> {
        let mut inner = self.inner.write().await;
        let stored = inner.issue_mut(issue)?;
        stored.resolve(actor)?;
        Ok(stored.clone())
    }

    async fn reopen_issue(&self, issue: DbId, actor: &User) -> Result<Issue, StoreError> {
        let mut inner = self.inner.write().await;
        let stored = inner.issue_mut(issue)?;
        stored.reopen(actor)?;
        Ok(stored.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
