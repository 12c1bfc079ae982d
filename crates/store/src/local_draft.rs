//! Backing store adapter that surfaces the locally cached draft review.
//!
//! Reviews listed through [`LocalDraftStore`] end with the job's cached
//! draft, if one exists, which is how an interrupted review is resumed.
//! A successful submission clears that draft from the cache, or fails with
//! [`StoreError::StaleDraft`] when the cache cannot be cleared.

use jobreview_core::{Comment, DbId, Issue, JobId, Review, User};

use crate::cache::ReviewCache;
use crate::error::StoreError;
use crate::job::JobStore;

pub struct LocalDraftStore<S, C> {
    store: S,
    cache: C,
}

impl<S, C> LocalDraftStore<S, C> {
    pub fn new(store: S, cache: C) -> Self {
        Self { store, cache }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}

impl<S: JobStore, C: ReviewCache> JobStore for LocalDraftStore<S, C> {
    async fn list_reviews(&self, job: JobId) -> Result<Vec<Review>, StoreError> {
        let mut reviews = self.store.list_reviews(job).await?;

        // An unreadable snapshot must not block the job; the review starts over.
        match self.cache.load(job).await {
            Ok(Some(draft)) => {
                tracing::debug!(job, issues = draft.issues().len(), "Found cached draft review");
                reviews.push(draft);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(job, error = %e, "Ignoring unreadable cached draft review");
            }
        }

        Ok(reviews)
    }

    async fn list_issues(&self, job: JobId) -> Result<Vec<Issue>, StoreError> {
        self.store.list_issues(job).await
    }

    async fn submit_review(&self, job: JobId, review: &Review) -> Result<(), StoreError> {
        self.store.submit_review(job, review).await?;

        // The submitted review must never come back as a draft. If the
        // snapshot cannot be removed it is overwritten with an empty draft.
        let removed = match self.cache.remove(job).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        tracing::warn!(job, error = %removed, "Failed to remove cached draft after submit");

        match self.cache.save(&Review::new_draft(job)).await {
            Ok(()) => {
                tracing::info!(job, "Replaced cached draft with an empty one");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    job,
                    remove_error = %removed,
                    save_error = %e,
                    "Submitted review is still cached as a draft"
                );
                Err(StoreError::StaleDraft {
                    job,
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn comment_issue(&self, issue: DbId, comment: &Comment) -> Result<Issue, StoreError> {
        self.store.comment_issue(issue, comment).await
    }

    async fn resolve_issue(&self, issue: DbId, actor: &User) -> Result<Issue, StoreError> {
        self.store.resolve_issue(issue, actor).await
    }

    async fn reopen_issue(&self, issue: DbId, actor: &User) -> Result<Issue, StoreError> {
        self.store.reopen_issue(issue, actor).await
    }
}
