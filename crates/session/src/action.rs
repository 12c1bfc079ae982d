//! Outcomes reported by the orchestrator to the UI layer.
//!
//! Each operation yields exactly one [`ReviewAction`]. Asynchronous
//! operations yield a success/failure pair; the local draft transitions
//! (create, start, cancel) cannot fail.

use jobreview_core::{FrameNumber, Issue, Review};

use crate::error::ReviewError;

// ---------------------------------------------------------------------------
// Action types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewActionType {
    InitializeReviewSuccess,
    InitializeReviewFailed,
    CreateIssue,
    StartIssue,
    FinishIssueSuccess,
    FinishIssueFailed,
    CancelIssue,
    CommentIssueSuccess,
    CommentIssueFailed,
    ResolveIssueSuccess,
    ResolveIssueFailed,
    ReopenIssueSuccess,
    ReopenIssueFailed,
    SubmitReviewSuccess,
    SubmitReviewFailed,
}

impl ReviewActionType {
    pub const ALL: &'static [ReviewActionType] = &[
        Self::InitializeReviewSuccess,
        Self::InitializeReviewFailed,
        Self::CreateIssue,
        Self::StartIssue,
        Self::FinishIssueSuccess,
        Self::FinishIssueFailed,
        Self::CancelIssue,
        Self::CommentIssueSuccess,
        Self::CommentIssueFailed,
        Self::ResolveIssueSuccess,
        Self::ResolveIssueFailed,
        Self::ReopenIssueSuccess,
        Self::ReopenIssueFailed,
        Self::SubmitReviewSuccess,
        Self::SubmitReviewFailed,
    ];

    /// Wire name of the action type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitializeReviewSuccess => "INITIALIZE_REVIEW_SUCCESS",
            Self::InitializeReviewFailed => "INITIALIZE_REVIEW_FAILED",
            Self::CreateIssue => "CREATE_ISSUE",
            Self::StartIssue => "START_ISSUE",
            Self::FinishIssueSuccess => "FINISH_ISSUE_SUCCESS",
            Self::FinishIssueFailed => "FINISH_ISSUE_FAILED",
            Self::CancelIssue => "CANCEL_ISSUE",
            Self::CommentIssueSuccess => "COMMENT_ISSUE_SUCCESS",
            Self::CommentIssueFailed => "COMMENT_ISSUE_FAILED",
            Self::ResolveIssueSuccess => "RESOLVE_ISSUE_SUCCESS",
            Self::ResolveIssueFailed => "RESOLVE_ISSUE_FAILED",
            Self::ReopenIssueSuccess => "REOPEN_ISSUE_SUCCESS",
            Self::ReopenIssueFailed => "REOPEN_ISSUE_FAILED",
            Self::SubmitReviewSuccess => "SUBMIT_REVIEW_SUCCESS",
            Self::SubmitReviewFailed => "SUBMIT_REVIEW_FAILED",
        }
    }

    /// Parse a wire name back into an action type.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ReviewAction {
    InitializeReviewSuccess {
        review: Review,
        frame: FrameNumber,
    },
    InitializeReviewFailed {
        error: ReviewError,
    },
    CreateIssue,
    StartIssue {
        position: Vec<f64>,
    },
    FinishIssueSuccess {
        frame: FrameNumber,
    },
    FinishIssueFailed {
        error: ReviewError,
    },
    CancelIssue,
    CommentIssueSuccess,
    CommentIssueFailed {
        error: ReviewError,
    },
    ResolveIssueSuccess,
    ResolveIssueFailed {
        error: ReviewError,
    },
    ReopenIssueSuccess,
    ReopenIssueFailed {
        error: ReviewError,
    },
    SubmitReviewSuccess {
        /// Fresh draft for the next review pass.
        active_review: Review,
        reviews: Vec<Review>,
        issues: Vec<Issue>,
        frame: FrameNumber,
    },
    SubmitReviewFailed {
        error: ReviewError,
    },
}

impl ReviewAction {
    pub fn action_type(&self) -> ReviewActionType {
        match self {
            Self::InitializeReviewSuccess { .. } => ReviewActionType::InitializeReviewSuccess,
            Self::InitializeReviewFailed { .. } => ReviewActionType::InitializeReviewFailed,
            Self::CreateIssue => ReviewActionType::CreateIssue,
            Self::StartIssue { .. } => ReviewActionType::StartIssue,
            Self::FinishIssueSuccess { .. } => ReviewActionType::FinishIssueSuccess,
            Self::FinishIssueFailed { .. } => ReviewActionType::FinishIssueFailed,
            Self::CancelIssue => ReviewActionType::CancelIssue,
            Self::CommentIssueSuccess => ReviewActionType::CommentIssueSuccess,
            Self::CommentIssueFailed { .. } => ReviewActionType::CommentIssueFailed,
            Self::ResolveIssueSuccess => ReviewActionType::ResolveIssueSuccess,
            Self::ResolveIssueFailed { .. } => ReviewActionType::ResolveIssueFailed,
            Self::ReopenIssueSuccess => ReviewActionType::ReopenIssueSuccess,
            Self::ReopenIssueFailed { .. } => ReviewActionType::ReopenIssueFailed,
            Self::SubmitReviewSuccess { .. } => ReviewActionType::SubmitReviewSuccess,
            Self::SubmitReviewFailed { .. } => ReviewActionType::SubmitReviewFailed,
        }
    }

    /// The error carried by a failure action.
    pub fn error(&self) -> Option<&ReviewError> {
        match self {
            Self::InitializeReviewFailed { error }
            | Self::FinishIssueFailed { error }
            | Self::CommentIssueFailed { error }
            | Self::ResolveIssueFailed { error }
            | Self::ReopenIssueFailed { error }
            | Self::SubmitReviewFailed { error } => Some(error),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error().is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
