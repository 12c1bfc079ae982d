//! Contract of the job's backing store.

use std::future::Future;
use std::sync::Arc;

use jobreview_core::{Comment, DbId, Issue, JobId, Review, User};

use crate::error::StoreError;

/// Durable source of reviews and issues for a job.
///
/// `list_reviews` returns reviews oldest first. The issue mutations apply
/// to persisted issues only and return the store's authoritative copy.
pub trait JobStore: Send + Sync {
    fn list_reviews(
        &self,
        job: JobId,
    ) -> impl Future<Output = Result<Vec<Review>, StoreError>> + Send;

    fn list_issues(&self, job: JobId) -> impl Future<Output = Result<Vec<Issue>, StoreError>> + Send;

    /// Durably submit a draft review against `job`.
    fn submit_review(
        &self,
        job: JobId,
        review: &Review,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn comment_issue(
        &self,
        issue: DbId,
        comment: &Comment,
    ) -> impl Future<Output = Result<Issue, StoreError>> + Send;

    fn resolve_issue(
        &self,
        issue: DbId,
        actor: &User,
    ) -> impl Future<Output = Result<Issue, StoreError>> + Send;

    fn reopen_issue(
        &self,
        issue: DbId,
        actor: &User,
    ) -> impl Future<Output = Result<Issue, StoreError>> + Send;
}

impl<T: JobStore> JobStore for Arc<T> {
    async fn list_reviews(&self, job: JobId) -> Result<Vec<Review>, StoreError> {
        (**self).list_reviews(job).await
    }

    async fn list_issues(&self, job: JobId) -> Result<Vec<Issue>, StoreError> {
        (**self).list_issues(job).await
    }

    async fn submit_review(&self, job: JobId, review: &Review) -> Result<(), StoreError> {
        (**self).submit_review(job, review).await
    }

    async fn comment_issue(&self, issue: DbId, comment: &Comment) -> Result<Issue, StoreError> {
        (**self).comment_issue(issue, comment).await
    }

    async fn resolve_issue(&self, issue: DbId, actor: &User) -> Result<Issue, StoreError> {
        (**self).resolve_issue(issue, actor).await
    }

    async fn reopen_issue(&self, issue: DbId, actor: &User) -> Result<Issue, StoreError> {
        (**self).reopen_issue(issue, actor).await
    }
}
