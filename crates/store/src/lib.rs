//! Collaborators of the review session: the job's backing store and the
//! local cache that keeps an unsubmitted review recoverable.

pub mod cache;
pub mod config;
pub mod error;
pub mod file_cache;
pub mod job;
pub mod local_draft;
pub mod memory;

pub use cache::{cache_key, ReviewCache, ReviewSnapshot, SNAPSHOT_VERSION};
pub use config::CacheConfig;
pub use error::{CacheError, StoreError};
pub use file_cache::FileReviewCache;
pub use job::JobStore;
pub use local_draft::LocalDraftStore;
pub use memory::{InMemoryJobStore, MemoryReviewCache};
