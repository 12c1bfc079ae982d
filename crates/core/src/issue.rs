//! Review issues: a flagged region on one frame with a comment thread and a
//! resolution status.
//!
//! Issues opened during an unsubmitted review carry [`IssueId::Draft`] ids
//! allocated by their review; once the backing store accepts the review
//! they are replaced by [`IssueId::Persisted`] copies.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, FrameNumber, JobId, Timestamp, User};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a single comment message.
pub const MAX_COMMENT_LENGTH: usize = 10_000;

/// Maximum number of coordinates in an issue position.
pub const MAX_POSITION_COORDINATES: usize = 2_000;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identity of an issue.
///
/// Draft ids are only unique within their review; persisted ids are
/// assigned by the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueId {
    Draft(u32),
    Persisted(DbId),
}

impl IssueId {
    pub fn is_draft(self) -> bool {
        matches!(self, Self::Draft(_))
    }

    /// The backing-store id, if the issue has been persisted.
    pub fn persisted(self) -> Option<DbId> {
        match self {
            Self::Draft(_) => None,
            Self::Persisted(id) => Some(id),
        }
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft(seq) => write!(f, "draft-{seq}"),
            Self::Persisted(id) => write!(f, "{id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// One entry in an issue's append-only comment thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub message: String,
    pub author: User,
    pub created_at: Timestamp,
}

impl Comment {
    /// Build a comment stamped with the current time.
    pub fn new(message: impl Into<String>, author: User) -> Self {
        Self {
            message: message.into(),
            author,
            created_at: Utc::now(),
        }
    }
}

/// Validate a comment message: non-blank and at most [`MAX_COMMENT_LENGTH`].
pub fn validate_comment_message(message: &str) -> Result<(), CoreError> {
    if message.trim().is_empty() {
        return Err(CoreError::Validation(
            "Comment message must not be empty".to_string(),
        ));
    }
    if message.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment message exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Validate an issue position: a non-empty list of finite x/y pairs.
pub fn validate_position(position: &[f64]) -> Result<(), CoreError> {
    if position.is_empty() {
        return Err(CoreError::Validation(
            "Issue position must not be empty".to_string(),
        ));
    }
    if position.len() % 2 != 0 {
        return Err(CoreError::Validation(format!(
            "Issue position must contain x/y pairs, got {} coordinates",
            position.len()
        )));
    }
    if position.len() > MAX_POSITION_COORDINATES {
        return Err(CoreError::Validation(format!(
            "Issue position has {} coordinates, maximum is {MAX_POSITION_COORDINATES}",
            position.len()
        )));
    }
    if let Some(i) = position.iter().position(|c| !c.is_finite()) {
        return Err(CoreError::Validation(format!(
            "Issue position coordinate {i} must be a finite number"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Resolution status of an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IssueStatus {
    Open { reopened_by: Option<User> },
    Resolved { resolver: User, resolved_at: Timestamp },
}

impl Default for IssueStatus {
    fn default() -> Self {
        Self::Open { reopened_by: None }
    }
}

// ---------------------------------------------------------------------------
// Issue
// ---------------------------------------------------------------------------

/// Payload for opening a new issue on a review.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub frame: FrameNumber,
    pub position: Vec<f64>,
    pub owner: User,
    /// Initial comment thread; must hold at least one comment.
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub job: JobId,
    pub frame: FrameNumber,
    pub position: Vec<f64>,
    pub owner: User,
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub status: IssueStatus,
    pub created_at: Timestamp,
}

impl Issue {
    /// Open an issue from `payload`, validating the position and the
    /// initial comment thread.
    pub fn open(id: IssueId, job: JobId, payload: NewIssue) -> Result<Self, CoreError> {
        validate_position(&payload.position)?;
        if payload.comments.is_empty() {
            return Err(CoreError::Validation(
                "An issue must be opened with at least one comment".to_string(),
            ));
        }
        for comment in &payload.comments {
            validate_comment_message(&comment.message)?;
        }

        Ok(Self {
            id,
            job,
            frame: payload.frame,
            position: payload.position,
            owner: payload.owner,
            comments: payload.comments,
            status: IssueStatus::default(),
            created_at: Utc::now(),
        })
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.status, IssueStatus::Resolved { .. })
    }

    /// Append a comment to the thread.
    pub fn comment(&mut self, comment: Comment) -> Result<(), CoreError> {
        validate_comment_message(&comment.message)?;
        self.comments.push(comment);
        Ok(())
    }

    /// Mark the issue resolved by `actor`.
    pub fn resolve(&mut self, actor: &User) -> Result<(), CoreError> {
        if self.is_resolved() {
            return Err(CoreError::Conflict(format!(
                "Issue {} is already resolved",
                self.id
            )));
        }
        self.status = IssueStatus::Resolved {
            resolver: actor.clone(),
            resolved_at: Utc::now(),
        };
        Ok(())
    }

    /// Return a resolved issue to the open state, recording who reopened it.
    pub fn reopen(&mut self, actor: &User) -> Result<(), CoreError> {
        if !self.is_resolved() {
            return Err(CoreError::Conflict(format!(
                "Issue {} is not resolved",
                self.id
            )));
        }
        self.status = IssueStatus::Open {
            reopened_by: Some(actor.clone()),
        };
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
