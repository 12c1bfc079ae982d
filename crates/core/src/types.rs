use serde::{Deserialize, Serialize};

/// All backing-store primary keys are 64-bit integers.
pub type DbId = i64;

/// Identifier of an annotation job.
pub type JobId = DbId;

/// Identifier of an authenticated user.
pub type UserId = DbId;

/// Zero-based frame index within a job.
pub type FrameNumber = u32;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// The authenticated user acting on a review: opening issues, writing
/// comments, resolving and reopening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}
