//! Shared fixtures for orchestrator integration tests.
//!
//! [`ScriptedStore`] wraps the in-memory store with per-operation failure
//! injection and a call log; [`RecordingCache`] counts snapshot writes and
//! can be told to fail writes or removals.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use jobreview_core::{Comment, DbId, Issue, JobId, NewIssue, Review, User};
use jobreview_session::{ReviewOrchestrator, SessionState};
use jobreview_store::{
    CacheError, InMemoryJobStore, JobStore, LocalDraftStore, MemoryReviewCache, ReviewCache,
    StoreError,
};

pub const JOB: JobId = 17;

pub fn reviewer() -> User {
    User::new(1, "reviewer")
}

pub fn annotator() -> User {
    User::new(2, "annotator")
}

pub fn region() -> Vec<f64> {
    vec![12.0, 30.0, 48.0, 64.0]
}

/// A draft for [`JOB`] with one issue per entry of `frames`.
pub fn draft_with_issues(frames: &[u32]) -> Review {
    let mut review = Review::new_draft(JOB);
    for &frame in frames {
        review
            .open_issue(NewIssue {
                frame,
                position: region(),
                owner: reviewer(),
                comments: vec![Comment::new("Label is wrong", reviewer())],
            })
            .expect("open");
    }
    review
}

// ---------------------------------------------------------------------------
// ScriptedStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListReviews,
    ListIssues,
    Submit,
    Comment,
    Resolve,
    Reopen,
}

#[derive(Default)]
pub struct ScriptedStore {
    inner: InMemoryJobStore,
    failures: Mutex<HashMap<StoreOp, StoreError>>,
    calls: Mutex<Vec<StoreOp>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `op` fail with `error` until [`clear`](Self::clear).
    pub fn fail(&self, op: StoreOp, error: StoreError) {
        self.failures.lock().expect("lock").insert(op, error);
    }

    pub fn clear(&self, op: StoreOp) {
        self.failures.lock().expect("lock").remove(&op);
    }

    pub fn calls(&self) -> Vec<StoreOp> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn count(&self, op: StoreOp) -> usize {
        self.calls().iter().filter(|c| **c == op).count()
    }

    fn enter(&self, op: StoreOp) -> Result<(), StoreError> {
        self.calls.lock().expect("lock").push(op);
        match self.failures.lock().expect("lock").get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl JobStore for ScriptedStore {
    async fn list_reviews(&self, job: JobId) -> Result<Vec<Review>, StoreError> {
        self.enter(StoreOp::ListReviews)?;
        self.inner.list_reviews(job).await
    }

    async fn list_issues(&self, job: JobId) -> Result<Vec<Issue>, StoreError> {
        self.enter(StoreOp::ListIssues)?;
        self.inner.list_issues(job).await
    }

    async fn submit_review(&self, job: JobId, review: &Review) -> Result<(), StoreError> {
        self.enter(StoreOp::Submit)?;
        self.inner.submit_review(job, review).await
    }

    async fn comment_issue(&self, issue: DbId, comment: &Comment) -> Result<Issue, StoreError> {
        self.enter(StoreOp::Comment)?;
        self.inner.comment_issue(issue, comment).await
    }

    async fn resolve_issue(&self, issue: DbId, actor: &User) -> Result<Issue, StoreError> {
        self.enter(StoreOp::Resolve)?;
        self.inner.resolve_issue(issue, actor).await
    }

    async fn reopen_issue(&self, issue: DbId, actor: &User) -> Result<Issue, StoreError> {
        self.enter(StoreOp::Reopen)?;
        self.inner.reopen_issue(issue, actor).await
    }
}

// ---------------------------------------------------------------------------
// RecordingCache
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingCache {
    inner: MemoryReviewCache,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
    fail_removes: AtomicBool,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful snapshot writes.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }
}

impl ReviewCache for RecordingCache {
    async fn save(&self, review: &Review) -> Result<(), CacheError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(CacheError::Io(std::io::Error::other("disk full")));
        }
        self.inner.save(review).await?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load(&self, job: JobId) -> Result<Option<Review>, CacheError> {
        self.inner.load(job).await
    }

    async fn remove(&self, job: JobId) -> Result<(), CacheError> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(CacheError::Io(std::io::Error::other("read-only file system")));
        }
        self.inner.remove(job).await
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub type Orchestrator =
    ReviewOrchestrator<LocalDraftStore<Arc<ScriptedStore>, Arc<RecordingCache>>, Arc<RecordingCache>>;

pub struct Harness {
    pub store: Arc<ScriptedStore>,
    pub cache: Arc<RecordingCache>,
    pub orchestrator: Orchestrator,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(ScriptedStore::new());
        let cache = Arc::new(RecordingCache::new());
        let orchestrator =
            ReviewOrchestrator::with_local_drafts(Arc::clone(&store), Arc::clone(&cache));
        Self {
            store,
            cache,
            orchestrator,
        }
    }

    pub fn session(&self, frame: u32) -> SessionState {
        SessionState::new(JOB, reviewer(), frame)
    }

    /// Submit a review with issues on `frames` straight to the store.
    pub async fn seed_submitted(&self, frames: &[u32]) {
        self.store
            .submit_review(JOB, &draft_with_issues(frames))
            .await
            .expect("seed submit");
    }

    /// An initialized session at `frame` that already knows the job's
    /// submitted issues.
    pub async fn initialized_session(&self, frame: u32) -> SessionState {
        let issues = self.store.list_issues(JOB).await.expect("list issues");
        let mut state = self.session(frame).with_issues(issues);
        let action = self.orchestrator.initialize(&mut state).await;
        assert!(!action.is_failure(), "initialize failed: {action:?}");
        state
    }
}
