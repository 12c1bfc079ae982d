//! Review submission and the session reset that follows it.

mod common;

use assert_matches::assert_matches;
use common::{region, Harness, StoreOp, JOB};
use jobreview_core::{CoreError, IssueId, ReviewId, ReviewStatus, ReviewVerdict};
use jobreview_session::{IssueDraft, ReviewAction, ReviewError};
use jobreview_store::{JobStore, ReviewCache, StoreError};

async fn session_with_two_issues(h: &Harness) -> jobreview_session::SessionState {
    let mut state = h.initialized_session(1).await;
    for (frame, message) in [(1, "Missing wheel"), (2, "Wrong occlusion")] {
        state.set_frame(frame);
        h.orchestrator.start_issue(&mut state, region());
        let action = h.orchestrator.finish_issue(&mut state, message).await;
        assert!(!action.is_failure(), "finish failed: {action:?}");
    }
    state.set_frame(1);
    state
}

#[tokio::test]
async fn submit_resets_to_fresh_draft() {
    let h = Harness::new();
    let mut state = session_with_two_issues(&h).await;

    let action = h.orchestrator.submit_review(&mut state, None).await;

    let ReviewAction::SubmitReviewSuccess {
        active_review,
        reviews,
        issues,
        frame,
    } = action
    else {
        panic!("expected success, got {action:?}");
    };
    assert_eq!(frame, 1);
    assert!(active_review.is_draft());
    assert!(active_review.issues().is_empty());
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].id, ReviewId::Persisted(1));
    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|i| !i.id.is_draft()));

    assert_eq!(state.active_review(), Some(&active_review));
    assert_eq!(state.reviews(), &reviews[..]);
    assert_eq!(state.issues(), &issues[..]);
    assert_eq!(state.draft(), &IssueDraft::Idle);
    // The submitted issue on frame 1 is now a job issue.
    let ids: Vec<_> = state.frame_issues().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![IssueId::Persisted(1)]);
}

#[tokio::test]
async fn submit_clears_cached_draft() {
    let h = Harness::new();
    let mut state = session_with_two_issues(&h).await;
    assert!(h.cache.load(JOB).await.expect("load").is_some());

    h.orchestrator.submit_review(&mut state, None).await;

    assert_eq!(h.cache.load(JOB).await.expect("load"), None);
}

#[tokio::test]
async fn submit_carries_verdict() {
    let h = Harness::new();
    let mut state = session_with_two_issues(&h).await;
    let verdict = ReviewVerdict {
        status: ReviewStatus::Rejected,
        estimated_quality: 2.5,
    };

    let action = h.orchestrator.submit_review(&mut state, Some(verdict)).await;

    assert_matches!(action, ReviewAction::SubmitReviewSuccess { .. });
    let reviews = h.store.list_reviews(JOB).await.expect("list");
    assert_eq!(reviews[0].verdict(), Some(&verdict));
}

#[tokio::test]
async fn out_of_range_quality_is_rejected_before_submit() {
    let h = Harness::new();
    let mut state = session_with_two_issues(&h).await;
    let verdict = ReviewVerdict {
        status: ReviewStatus::Accepted,
        estimated_quality: 7.0,
    };

    let action = h.orchestrator.submit_review(&mut state, Some(verdict)).await;

    assert_matches!(
        action,
        ReviewAction::SubmitReviewFailed { error: ReviewError::Domain(CoreError::Validation(_)) }
    );
    assert_eq!(h.store.count(StoreOp::Submit), 0);
    assert_eq!(state.active_review().expect("active").issues().len(), 2);
}

#[tokio::test]
async fn failed_submit_leaves_session_unchanged() {
    let h = Harness::new();
    let mut state = session_with_two_issues(&h).await;
    let draft = state.active_review().cloned();
    let error = StoreError::Unavailable("timeout".into());
    h.store.fail(StoreOp::Submit, error.clone());

    let action = h.orchestrator.submit_review(&mut state, None).await;

    assert_matches!(
        action,
        ReviewAction::SubmitReviewFailed { error: ReviewError::Store(e) } if e == error
    );
    assert_eq!(state.active_review().cloned(), draft);
    assert!(state.reviews().is_empty());
    assert!(h.cache.load(JOB).await.expect("load").is_some());

    // The same draft can be submitted once the store recovers.
    h.store.clear(StoreOp::Submit);
    let retry = h.orchestrator.submit_review(&mut state, None).await;
    assert_matches!(retry, ReviewAction::SubmitReviewSuccess { ref issues, .. } if issues.len() == 2);
}

#[tokio::test]
async fn failed_refresh_reports_failure() {
    let h = Harness::new();
    let mut state = session_with_two_issues(&h).await;
    h.store
        .fail(StoreOp::ListIssues, StoreError::Unavailable("reset by peer".into()));

    let action = h.orchestrator.submit_review(&mut state, None).await;

    assert_matches!(
        action,
        ReviewAction::SubmitReviewFailed { error: ReviewError::Store(StoreError::Unavailable(_)) }
    );
    // The store accepted the review; only the session view is stale.
    assert_eq!(h.store.count(StoreOp::Submit), 1);
    assert_eq!(state.active_review().expect("active").issues().len(), 2);
}

#[tokio::test]
async fn submit_before_initialize_fails() {
    let h = Harness::new();
    let mut state = h.session(0);

    let action = h.orchestrator.submit_review(&mut state, None).await;

    assert_matches!(
        action,
        ReviewAction::SubmitReviewFailed { error: ReviewError::NotInitialized }
    );
    assert!(h.store.calls().is_empty());
}

#[tokio::test]
async fn next_review_starts_after_submit() {
    let h = Harness::new();
    let mut state = session_with_two_issues(&h).await;
    h.orchestrator.submit_review(&mut state, None).await;

    h.orchestrator.start_issue(&mut state, region());
    let action = h.orchestrator.finish_issue(&mut state, "Second pass").await;

    assert_matches!(action, ReviewAction::FinishIssueSuccess { frame: 1 });
    let draft = state.active_review().expect("active");
    assert_eq!(draft.issues()[0].id, IssueId::Draft(1));
    assert_eq!(state.frame_issues().len(), 2);
}

#[tokio::test]
async fn uncleared_cache_never_resumes_submitted_review() {
    let h = Harness::new();
    let mut state = session_with_two_issues(&h).await;
    h.cache.fail_removes(true);

    let action = h.orchestrator.submit_review(&mut state, None).await;
    assert_matches!(action, ReviewAction::SubmitReviewSuccess { .. });

    let mut next = h.session(1);
    let resumed = h.orchestrator.initialize(&mut next).await;
    assert_matches!(
        resumed,
        ReviewAction::InitializeReviewSuccess { ref review, .. } if review.issues().is_empty()
    );

    h.orchestrator.submit_review(&mut next, None).await;
    let issues = h.store.list_issues(JOB).await.expect("list");
    assert_eq!(issues.len(), 2);
}

#[tokio::test]
async fn stale_cache_is_reported_and_session_moves_on() {
    let h = Harness::new();
    let mut state = session_with_two_issues(&h).await;
    h.cache.fail_removes(true);
    h.cache.fail_saves(true);

    let action = h.orchestrator.submit_review(&mut state, None).await;

    assert_matches!(
        action,
        ReviewAction::SubmitReviewFailed {
            error: ReviewError::Store(StoreError::StaleDraft { job: JOB, .. })
        }
    );
    assert_eq!(h.store.count(StoreOp::Submit), 1);
    let active = state.active_review().expect("active");
    assert!(active.is_draft());
    assert!(active.issues().is_empty());
}
