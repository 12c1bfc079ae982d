//! Domain model for job reviews: reviews, issues, comments and the
//! validation rules shared by the store and session layers.
//!
//! This crate performs no I/O.

pub mod error;
pub mod issue;
pub mod review;
pub mod types;

pub use error::CoreError;
pub use issue::{Comment, Issue, IssueId, IssueStatus, NewIssue};
pub use review::{Review, ReviewId, ReviewStatus, ReviewSummary, ReviewVerdict};
pub use types::{DbId, FrameNumber, JobId, Timestamp, User, UserId};
