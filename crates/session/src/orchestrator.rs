//! Review orchestration: drives the review and issue lifecycle against the
//! job store and the local cache.
//!
//! Every public operation converts its outcome into a [`ReviewAction`];
//! errors never propagate past the operation. Within an operation the local
//! cache is written only after the domain mutation (and any backing-store
//! call) has succeeded. Changes to the active draft are made on a copy that
//! is committed to the session only once the snapshot is written, so a
//! failed operation leaves the session exactly as it was.

use std::sync::Arc;

use jobreview_core::{
    Comment, CoreError, FrameNumber, Issue, IssueId, NewIssue, Review, ReviewVerdict, User,
};
use jobreview_store::{JobStore, LocalDraftStore, ReviewCache, StoreError};

use crate::action::ReviewAction;
use crate::error::ReviewError;
use crate::state::{IssueDraft, IssueLocation, SessionState};

/// Mutation applied to an existing issue.
enum IssueMutation {
    Comment(Comment),
    Resolve(User),
    Reopen(User),
}

impl IssueMutation {
    fn name(&self) -> &'static str {
        match self {
            Self::Comment(_) => "comment",
            Self::Resolve(_) => "resolve",
            Self::Reopen(_) => "reopen",
        }
    }

    fn apply_to_review(&self, review: &mut Review, id: IssueId) -> Result<(), CoreError> {
        match self {
            Self::Comment(comment) => review.comment_issue(id, comment.clone()),
            Self::Resolve(actor) => review.resolve_issue(id, actor),
            Self::Reopen(actor) => review.reopen_issue(id, actor),
        }
    }

    fn apply_to_issue(&self, issue: &mut Issue) -> Result<(), CoreError> {
        match self {
            Self::Comment(comment) => issue.comment(comment.clone()),
            Self::Resolve(actor) => issue.resolve(actor),
            Self::Reopen(actor) => issue.reopen(actor),
        }
    }
}

/// Runs review operations for one or more [`SessionState`]s.
///
/// Operations take the session by `&mut`, so two operations can never run
/// against the same session at once.
pub struct ReviewOrchestrator<S, C> {
    store: S,
    cache: C,
}

impl<S, C> ReviewOrchestrator<S, C> {
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

impl<S: JobStore, C: ReviewCache> ReviewOrchestrator<LocalDraftStore<S, Arc<C>>, Arc<C>> {
    /// Wire `store` and `cache` so that cached drafts are resumed on
    /// initialization and cleared on submission.
    pub fn with_local_drafts(store: S, cache: Arc<C>) -> Self {
        Self::new(LocalDraftStore::new(store, Arc::clone(&cache)), cache)
    }
}

impl<S: JobStore, C: ReviewCache> ReviewOrchestrator<S, C> {
    // -----------------------------------------------------------------------
    // Initialization
    // -----------------------------------------------------------------------

    /// Determine the active draft review for the session's job.
    ///
    /// Resumes the most recent review if it is still a draft, otherwise
    /// starts a new one. On failure the session is left untouched.
    pub async fn initialize(&self, state: &mut SessionState) -> ReviewAction {
        let job = state.job();
        match self.store.list_reviews(job).await {
            Ok(mut reviews) => {
                let resumed = if reviews.last().is_some_and(Review::is_draft) {
                    reviews.pop()
                } else {
                    None
                };
                let review = resumed.unwrap_or_else(|| Review::new_draft(job));
                tracing::info!(
                    job,
                    resumed_issues = review.issues().len(),
                    submitted_reviews = reviews.len(),
                    "Review session initialized"
                );
                state.begin(review.clone(), reviews);
                ReviewAction::InitializeReviewSuccess {
                    review,
                    frame: state.frame(),
                }
            }
            Err(e) => {
                tracing::warn!(job, error = %e, "Failed to initialize review");
                ReviewAction::InitializeReviewFailed { error: e.into() }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Issue draft lifecycle
    // -----------------------------------------------------------------------

    /// Enter issue mode: the user is about to pick a region.
    pub fn create_issue(&self, state: &mut SessionState) -> ReviewAction {
        state.set_draft(IssueDraft::Placing);
        tracing::debug!(job = state.job(), "Issue mode entered");
        ReviewAction::CreateIssue
    }

    /// Record the region picked for a new issue. Purely local.
    pub fn start_issue(&self, state: &mut SessionState, position: Vec<f64>) -> ReviewAction {
        tracing::debug!(
            job = state.job(),
            coordinates = position.len(),
            "Issue draft started"
        );
        state.set_draft(IssueDraft::Drafting {
            position: position.clone(),
        });
        ReviewAction::StartIssue { position }
    }

    /// Discard the issue being drafted. Purely local; always succeeds.
    pub fn cancel_issue(&self, state: &mut SessionState) -> ReviewAction {
        if !matches!(state.draft(), IssueDraft::Drafting { .. }) {
            tracing::debug!(job = state.job(), "Cancel requested with no issue draft");
        }
        state.set_draft(IssueDraft::Idle);
        ReviewAction::CancelIssue
    }

    /// Open the drafted issue in the active review with `message` as its
    /// first comment.
    ///
    /// The issue is attached to the frame displayed now, not the one shown
    /// when the draft was started. On failure the draft is kept so the user
    /// can retry or cancel.
    pub async fn finish_issue(&self, state: &mut SessionState, message: &str) -> ReviewAction {
        match self.try_finish_issue(state, message).await {
            Ok(frame) => ReviewAction::FinishIssueSuccess { frame },
            Err(error) => {
                tracing::warn!(job = state.job(), error = %error, "Failed to finish issue");
                ReviewAction::FinishIssueFailed { error }
            }
        }
    }

    async fn try_finish_issue(
        &self,
        state: &mut SessionState,
        message: &str,
    ) -> Result<FrameNumber, ReviewError> {
        let frame = state.frame();
        let mut review = state
            .active_review()
            .ok_or(ReviewError::NotInitialized)?
            .clone();
        let position = state
            .new_issue_position()
            .ok_or(ReviewError::NoIssueDraft)?
            .to_vec();
        let user = state.user().clone();

        let issue = review
            .open_issue(NewIssue {
                frame,
                position,
                owner: user.clone(),
                comments: vec![Comment::new(message, user)],
            })?
            .id;

        self.cache.save(&review).await?;
        state.commit_review(review);
        state.set_draft(IssueDraft::Idle);

        tracing::info!(job = state.job(), %issue, frame, "Issue opened");
        Ok(frame)
    }

    // -----------------------------------------------------------------------
    // Issue mutations
    // -----------------------------------------------------------------------

    /// Append a comment by the session user to issue `id` on the current frame.
    pub async fn comment_issue(
        &self,
        state: &mut SessionState,
        id: IssueId,
        message: &str,
    ) -> ReviewAction {
        let mutation = IssueMutation::Comment(Comment::new(message, state.user().clone()));
        match self.mutate_issue(state, id, mutation).await {
            Ok(()) => ReviewAction::CommentIssueSuccess,
            Err(error) => ReviewAction::CommentIssueFailed { error },
        }
    }

    /// Mark issue `id` on the current frame resolved by the session user.
    pub async fn resolve_issue(&self, state: &mut SessionState, id: IssueId) -> ReviewAction {
        let mutation = IssueMutation::Resolve(state.user().clone());
        match self.mutate_issue(state, id, mutation).await {
            Ok(()) => ReviewAction::ResolveIssueSuccess,
            Err(error) => ReviewAction::ResolveIssueFailed { error },
        }
    }

    /// Reopen issue `id` on the current frame on behalf of the session user.
    pub async fn reopen_issue(&self, state: &mut SessionState, id: IssueId) -> ReviewAction {
        let mutation = IssueMutation::Reopen(state.user().clone());
        match self.mutate_issue(state, id, mutation).await {
            Ok(()) => ReviewAction::ReopenIssueSuccess,
            Err(error) => ReviewAction::ReopenIssueFailed { error },
        }
    }

    /// Apply `mutation` to a frame-scoped issue.
    ///
    /// Issues of the active draft are changed locally and the draft is
    /// snapshotted to the cache. Issues of submitted reviews go through the
    /// backing store (persisted ids) and are never cached.
    async fn mutate_issue(
        &self,
        state: &mut SessionState,
        id: IssueId,
        mutation: IssueMutation,
    ) -> Result<(), ReviewError> {
        let result = self.try_mutate_issue(state, id, &mutation).await;
        if let Err(e) = &result {
            tracing::warn!(
                job = state.job(),
                %id,
                operation = mutation.name(),
                error = %e,
                "Issue update failed"
            );
        }
        result
    }

    async fn try_mutate_issue(
        &self,
        state: &mut SessionState,
        id: IssueId,
        mutation: &IssueMutation,
    ) -> Result<(), ReviewError> {
        match state.locate_frame_issue(id)? {
            IssueLocation::ActiveReview => {
                let mut review = state
                    .active_review()
                    .ok_or(ReviewError::NotInitialized)?
                    .clone();
                mutation.apply_to_review(&mut review, id)?;
                self.cache.save(&review).await?;
                state.commit_review(review);
                tracing::debug!(
                    job = state.job(),
                    %id,
                    operation = mutation.name(),
                    "Draft issue updated"
                );
            }
            IssueLocation::Job(index) => {
                let mut updated = state.issues()[index].clone();
                // Checked locally first so a doomed request never reaches the store.
                mutation.apply_to_issue(&mut updated)?;

                if let Some(stored_id) = id.persisted() {
                    updated = match mutation {
                        IssueMutation::Comment(comment) => {
                            self.store.comment_issue(stored_id, comment).await?
                        }
                        IssueMutation::Resolve(actor) => {
                            self.store.resolve_issue(stored_id, actor).await?
                        }
                        IssueMutation::Reopen(actor) => {
                            self.store.reopen_issue(stored_id, actor).await?
                        }
                    };
                }
                state.replace_issue(index, updated);
                tracing::debug!(
                    job = state.job(),
                    %id,
                    operation = mutation.name(),
                    "Submitted issue updated"
                );
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Submit the active draft review, optionally attaching `verdict` first.
    ///
    /// On success the job's reviews and issues are re-read from the store and
    /// the session restarts from a fresh empty draft. On failure nothing in
    /// the session changes and the draft can be submitted again, except when
    /// the store reports [`StoreError::StaleDraft`]: the review is stored, so
    /// the session moves on to a fresh draft while still reporting failure.
    pub async fn submit_review(
        &self,
        state: &mut SessionState,
        verdict: Option<ReviewVerdict>,
    ) -> ReviewAction {
        match self.try_submit_review(state, verdict).await {
            Ok(action) => action,
            Err(error) => {
                tracing::warn!(job = state.job(), error = %error, "Failed to submit review");
                ReviewAction::SubmitReviewFailed { error }
            }
        }
    }

    async fn try_submit_review(
        &self,
        state: &mut SessionState,
        verdict: Option<ReviewVerdict>,
    ) -> Result<ReviewAction, ReviewError> {
        let job = state.job();
        let mut review = state
            .active_review()
            .ok_or(ReviewError::NotInitialized)?
            .clone();
        if let Some(verdict) = verdict {
            review.set_verdict(verdict)?;
        }

        match self.store.submit_review(job, &review).await {
            Ok(()) => {}
            Err(e @ StoreError::StaleDraft { .. }) => {
                // Stored already; a second submit from this session would duplicate it.
                state.commit_review(Review::new_draft(job));
                state.set_draft(IssueDraft::Idle);
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        }
        let reviews = self.store.list_reviews(job).await?;
        let issues = self.store.list_issues(job).await?;
        let active_review = Review::new_draft(job);

        tracing::info!(
            job,
            submitted_issues = review.issues().len(),
            reviews = reviews.len(),
            "Review submitted"
        );

        state.reset_after_submit(active_review.clone(), reviews.clone(), issues.clone());
        Ok(ReviewAction::SubmitReviewSuccess {
            active_review,
            reviews,
            issues,
            frame: state.frame(),
        })
    }
}
