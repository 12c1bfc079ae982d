//! Review aggregate: the issues raised during one review pass over a job.
//!
//! A review is either a draft (not yet submitted, recoverable from the local
//! cache) or persisted. Persisted reviews are immutable; every mutating
//! method on [`Review`] returns [`CoreError::Conflict`] for them.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::issue::{Comment, Issue, IssueId, NewIssue};
use crate::types::{DbId, FrameNumber, JobId, User};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest accepted estimated quality.
pub const MIN_ESTIMATED_QUALITY: f64 = 0.0;

/// Highest accepted estimated quality.
pub const MAX_ESTIMATED_QUALITY: f64 = 5.0;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identity of a review: a local draft or a backing-store row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewId {
    Draft,
    Persisted(DbId),
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => f.write_str("draft"),
            Self::Persisted(id) => write!(f, "{id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Outcome the reviewer attaches to a review before submitting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Accepted,
    Rejected,
    ReviewFurther,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::ReviewFurther => "review_further",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewVerdict {
    pub status: ReviewStatus,
    pub estimated_quality: f64,
}

/// Validate an estimated quality score against the accepted range.
pub fn validate_estimated_quality(quality: f64) -> Result<(), CoreError> {
    if !quality.is_finite() || !(MIN_ESTIMATED_QUALITY..=MAX_ESTIMATED_QUALITY).contains(&quality) {
        return Err(CoreError::Validation(format!(
            "estimated quality must be between {MIN_ESTIMATED_QUALITY} and {MAX_ESTIMATED_QUALITY}, got {quality}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub job: JobId,
    issues: Vec<Issue>,
    #[serde(default)]
    verdict: Option<ReviewVerdict>,
}

/// Issue counts shown alongside a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub total_issues: usize,
    pub resolved_issues: usize,
    pub unresolved_issues: usize,
    pub frames: Vec<FrameNumber>,
}

impl Review {
    /// A fresh, empty draft review scoped to `job`.
    pub fn new_draft(job: JobId) -> Self {
        Self {
            id: ReviewId::Draft,
            job,
            issues: Vec::new(),
            verdict: None,
        }
    }

    /// Assemble a review from stored parts, checking that every issue
    /// belongs to `job` and that issue ids are unique.
    pub fn from_parts(
        id: ReviewId,
        job: JobId,
        issues: Vec<Issue>,
        verdict: Option<ReviewVerdict>,
    ) -> Result<Self, CoreError> {
        let mut seen = HashSet::with_capacity(issues.len());
        for issue in &issues {
            if issue.job != job {
                return Err(CoreError::Validation(format!(
                    "Issue {} belongs to job {}, not job {job}",
                    issue.id, issue.job
                )));
            }
            if !seen.insert(issue.id) {
                return Err(CoreError::Validation(format!(
                    "Duplicate issue id {} in review",
                    issue.id
                )));
            }
        }
        Ok(Self {
            id,
            job,
            issues,
            verdict,
        })
    }

    pub fn is_draft(&self) -> bool {
        self.id == ReviewId::Draft
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn issue(&self, id: IssueId) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.id == id)
    }

    pub fn contains_issue(&self, id: IssueId) -> bool {
        self.issue(id).is_some()
    }

    pub fn verdict(&self) -> Option<&ReviewVerdict> {
        self.verdict.as_ref()
    }

    /// Attach the reviewer's verdict. Draft reviews only.
    pub fn set_verdict(&mut self, verdict: ReviewVerdict) -> Result<(), CoreError> {
        self.ensure_draft()?;
        validate_estimated_quality(verdict.estimated_quality)?;
        self.verdict = Some(verdict);
        Ok(())
    }

    /// Open a new issue in this review and return it.
    ///
    /// The issue receives the next draft id of the review.
    pub fn open_issue(&mut self, payload: NewIssue) -> Result<&Issue, CoreError> {
        self.ensure_draft()?;
        let seq = self.next_draft_seq()?;
        let issue = Issue::open(IssueId::Draft(seq), self.job, payload)?;
        self.issues.push(issue);
        Ok(&self.issues[self.issues.len() - 1])
    }

    pub fn comment_issue(&mut self, id: IssueId, comment: Comment) -> Result<(), CoreError> {
        self.issue_mut(id)?.comment(comment)
    }

    pub fn resolve_issue(&mut self, id: IssueId, actor: &User) -> Result<(), CoreError> {
        self.issue_mut(id)?.resolve(actor)
    }

    pub fn reopen_issue(&mut self, id: IssueId, actor: &User) -> Result<(), CoreError> {
        self.issue_mut(id)?.reopen(actor)
    }

    /// Convert a submitted draft into its persisted form, assigning ids
    /// through `next_issue_id`.
    pub fn into_persisted(
        self,
        review_id: DbId,
        mut next_issue_id: impl FnMut() -> DbId,
    ) -> Result<Self, CoreError> {
        self.ensure_draft()?;
        let issues = self
            .issues
            .into_iter()
            .map(|mut issue| {
                issue.id = IssueId::Persisted(next_issue_id());
                issue
            })
            .collect();
        Ok(Self {
            id: ReviewId::Persisted(review_id),
            job: self.job,
            issues,
            verdict: self.verdict,
        })
    }

    pub fn summary(&self) -> ReviewSummary {
        let resolved_issues = self.issues.iter().filter(|i| i.is_resolved()).count();
        let frames: BTreeSet<FrameNumber> = self.issues.iter().map(|i| i.frame).collect();
        ReviewSummary {
            total_issues: self.issues.len(),
            resolved_issues,
            unresolved_issues: self.issues.len() - resolved_issues,
            frames: frames.into_iter().collect(),
        }
    }

    fn issue_mut(&mut self, id: IssueId) -> Result<&mut Issue, CoreError> {
        self.ensure_draft()?;
        self.issues
            .iter_mut()
            .find(|issue| issue.id == id)
            .ok_or_else(|| CoreError::Validation(format!("Issue {id} is not part of this review")))
    }

    fn ensure_draft(&self) -> Result<(), CoreError> {
        match self.id {
            ReviewId::Draft => Ok(()),
            ReviewId::Persisted(id) => Err(CoreError::Conflict(format!(
                "Review {id} has been submitted and can no longer change"
            ))),
        }
    }

    fn next_draft_seq(&self) -> Result<u32, CoreError> {
        self.issues
            .iter()
            .filter_map(|issue| match issue.id {
                IssueId::Draft(seq) => Some(seq),
                IssueId::Persisted(_) => None,
            })
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| {
                CoreError::Validation("Draft review has run out of issue ids".to_string())
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
