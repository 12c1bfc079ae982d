//! Per-job review session state.
//!
//! [`SessionState`] is owned by the caller and passed by `&mut` into every
//! orchestrator operation; there is no shared or global copy.

use jobreview_core::{FrameNumber, Issue, IssueId, JobId, Review, User};

use crate::error::ReviewError;

/// Progress of the issue the user is currently marking.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum IssueDraft {
    #[default]
    Idle,
    /// Issue mode is on but no region has been picked yet.
    Placing,
    /// A region has been picked; waiting for the opening comment.
    Drafting { position: Vec<f64> },
}

/// Where a frame-scoped issue lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IssueLocation {
    ActiveReview,
    /// Index into [`SessionState::issues`].
    Job(usize),
}

#[derive(Debug, Clone)]
pub struct SessionState {
    job: JobId,
    user: User,
    frame: FrameNumber,
    active_review: Option<Review>,
    reviews: Vec<Review>,
    issues: Vec<Issue>,
    draft: IssueDraft,
}

impl SessionState {
    /// An uninitialized session for `user` reviewing `job` at `frame`.
    pub fn new(job: JobId, user: User, frame: FrameNumber) -> Self {
        Self {
            job,
            user,
            frame,
            active_review: None,
            reviews: Vec::new(),
            issues: Vec::new(),
            draft: IssueDraft::Idle,
        }
    }

    /// Seed the job's submitted issues, as loaded alongside the job.
    pub fn with_issues(mut self, issues: Vec<Issue>) -> Self {
        self.issues = issues;
        self
    }

    pub fn job(&self) -> JobId {
        self.job
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn frame(&self) -> FrameNumber {
        self.frame
    }

    pub fn active_review(&self) -> Option<&Review> {
        self.active_review.as_ref()
    }

    /// Submitted reviews as last listed. Current issue state lives in
    /// [`issues`](Self::issues).
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// Issues of already submitted reviews.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn draft(&self) -> &IssueDraft {
        &self.draft
    }

    /// Position of the issue being drafted, between start and finish/cancel.
    pub fn new_issue_position(&self) -> Option<&[f64]> {
        match &self.draft {
            IssueDraft::Drafting { position } => Some(position),
            IssueDraft::Idle | IssueDraft::Placing => None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.active_review.is_some()
    }

    /// Issues attached to the displayed frame: the active draft's first,
    /// then those of submitted reviews.
    pub fn frame_issues(&self) -> Vec<&Issue> {
        self.active_review
            .iter()
            .flat_map(|review| review.issues())
            .chain(self.issues.iter())
            .filter(|issue| issue.frame == self.frame)
            .collect()
    }

    /// Navigate to another frame of the same job. An in-progress draft
    /// keeps its position; it is bound to a frame only when finished.
    pub fn set_frame(&mut self, frame: FrameNumber) {
        self.frame = frame;
    }

    /// Navigate away from the job, dropping everything but the identity.
    pub fn leave(&mut self) {
        self.active_review = None;
        self.reviews.clear();
        self.issues.clear();
        self.draft = IssueDraft::Idle;
    }

    // -- orchestrator-side mutation ------------------------------------------

    pub(crate) fn set_draft(&mut self, draft: IssueDraft) {
        self.draft = draft;
    }

    /// Install `review` as the session baseline after initialization.
    pub(crate) fn begin(&mut self, review: Review, reviews: Vec<Review>) {
        self.active_review = Some(review);
        self.reviews = reviews;
        self.draft = IssueDraft::Idle;
    }

    pub(crate) fn commit_review(&mut self, review: Review) {
        self.active_review = Some(review);
    }

    pub(crate) fn replace_issue(&mut self, index: usize, issue: Issue) {
        self.issues[index] = issue;
    }

    /// Reset to a clean baseline after a successful submission.
    pub(crate) fn reset_after_submit(
        &mut self,
        review: Review,
        reviews: Vec<Review>,
        issues: Vec<Issue>,
    ) {
        self.active_review = Some(review);
        self.reviews = reviews;
        self.issues = issues;
        self.draft = IssueDraft::Idle;
    }

    /// Find the issue `id` among the frame-scoped issues.
    pub(crate) fn locate_frame_issue(&self, id: IssueId) -> Result<IssueLocation, ReviewError> {
        let not_found = || ReviewError::IssueNotFound {
            id,
            frame: self.frame,
        };

        if let Some(issue) = self.active_review.as_ref().and_then(|r| r.issue(id)) {
            return if issue.frame == self.frame {
                Ok(IssueLocation::ActiveReview)
            } else {
                Err(not_found())
            };
        }

        self.issues
            .iter()
            .position(|issue| issue.id == id && issue.frame == self.frame)
            .map(IssueLocation::Job)
            .ok_or_else(not_found)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
