//! Review initialization: resuming a cached draft versus starting fresh.

mod common;

use assert_matches::assert_matches;
use common::{draft_with_issues, Harness, StoreOp, JOB};
use jobreview_core::ReviewId;
use jobreview_session::{IssueDraft, ReviewAction, ReviewError};
use jobreview_store::{ReviewCache, StoreError};

#[tokio::test]
async fn empty_job_starts_fresh_draft() {
    let h = Harness::new();
    let mut state = h.session(3);

    let action = h.orchestrator.initialize(&mut state).await;

    assert_matches!(
        &action,
        ReviewAction::InitializeReviewSuccess { review, frame: 3 }
            if review.is_draft() && review.job == JOB && review.issues().is_empty()
    );
    assert!(state.is_initialized());
    assert!(state.reviews().is_empty());
}

#[tokio::test]
async fn last_submitted_review_is_not_adopted() {
    let h = Harness::new();
    h.seed_submitted(&[1, 2]).await;
    let mut state = h.session(0);

    let action = h.orchestrator.initialize(&mut state).await;

    let ReviewAction::InitializeReviewSuccess { review, .. } = action else {
        panic!("expected success, got {action:?}");
    };
    assert_eq!(review.id, ReviewId::Draft);
    assert!(review.issues().is_empty());
    assert_eq!(state.reviews().len(), 1);
    assert_eq!(state.reviews()[0].id, ReviewId::Persisted(1));
}

#[tokio::test]
async fn cached_draft_is_resumed() {
    let h = Harness::new();
    h.seed_submitted(&[1]).await;
    let cached = draft_with_issues(&[4, 9]);
    h.cache.save(&cached).await.expect("cache draft");
    let mut state = h.session(4);

    let action = h.orchestrator.initialize(&mut state).await;

    assert_matches!(
        &action,
        ReviewAction::InitializeReviewSuccess { review, frame: 4 } if *review == cached
    );
    assert_eq!(state.active_review(), Some(&cached));
    // The resumed draft is not listed among the submitted reviews.
    assert_eq!(state.reviews().len(), 1);
    assert_eq!(state.frame_issues().len(), 1);
}

#[tokio::test]
async fn fetch_failure_leaves_session_unset() {
    let h = Harness::new();
    let outage = StoreError::Unavailable("connection refused".into());
    h.store.fail(StoreOp::ListReviews, outage.clone());
    let mut state = h.session(0);

    let action = h.orchestrator.initialize(&mut state).await;

    assert_matches!(
        action,
        ReviewAction::InitializeReviewFailed { error: ReviewError::Store(e) } if e == outage
    );
    assert!(!state.is_initialized());
    assert_eq!(state.draft(), &IssueDraft::Idle);
    assert_eq!(h.cache.saves(), 0);
}

#[tokio::test]
async fn reinitialize_discards_pending_draft_position() {
    let h = Harness::new();
    let mut state = h.initialized_session(0).await;
    h.orchestrator.start_issue(&mut state, common::region());

    h.orchestrator.initialize(&mut state).await;

    assert_eq!(state.new_issue_position(), None);
}
