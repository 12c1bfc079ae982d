//! Client-side orchestration of a job review.
//!
//! [`ReviewOrchestrator`] runs the review operations (initialize, the issue
//! draft lifecycle, comment/resolve/reopen, submit) against an explicit
//! [`SessionState`] and reports each outcome as a [`ReviewAction`].

pub mod action;
pub mod error;
pub mod orchestrator;
pub mod state;

pub use action::{ReviewAction, ReviewActionType};
pub use error::ReviewError;
pub use orchestrator::ReviewOrchestrator;
pub use state::{IssueDraft, SessionState};
