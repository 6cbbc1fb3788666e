use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use attempt_core::model::{
    AttemptIdentity, ChallengeSlug, ElapsedTime, Submission, SubmissionDraft, SubmissionStatus, UserId,
};
use attempt_core::time::manual_clock;
use services::{
    AttemptTracker, ElapsedListener, SubmissionError, SubmissionFinalizer, SubmissionSink,
    TimerState, TrackerConfig,
};
use storage::repository::InMemoryStore;

struct AcceptAll;

#[async_trait]
impl SubmissionSink for AcceptAll {
    async fn submit(&self, _submission: &Submission) -> Result<(), SubmissionError> {
        Ok(())
    }
}

struct RejectAll;

#[async_trait]
impl SubmissionSink for RejectAll {
    async fn submit(&self, _submission: &Submission) -> Result<(), SubmissionError> {
        Err(SubmissionError::Rejected("offline".into()))
    }
}

/// Takes three seconds to accept anything.
struct SlowSink;

#[async_trait]
impl SubmissionSink for SlowSink {
    async fn submit(&self, _submission: &Submission) -> Result<(), SubmissionError> {
        tokio::time::sleep(Duration::from_secs(3)).await;
        Ok(())
    }
}

fn identity() -> AttemptIdentity {
    AttemptIdentity::for_user(UserId::new("7").unwrap(), ChallengeSlug::new("loops").unwrap())
}

fn recorder() -> (Arc<Mutex<Vec<u64>>>, ElapsedListener) {
    let published = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&published);
    let listener: ElapsedListener = Arc::new(move |elapsed: ElapsedTime| {
        sink.lock().unwrap().push(elapsed.as_millis());
    });
    (published, listener)
}

#[tokio::test(start_paused = true)]
async fn ticks_publish_non_decreasing_elapsed() {
    let mut clock = manual_clock();
    let tracker = AttemptTracker::new(clock.clone(), Arc::new(InMemoryStore::new()));
    let (published, listener) = recorder();

    let mounted = tracker.mount(identity(), listener).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    for _ in 0..3 {
        clock.advance(chrono::Duration::seconds(1));
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    let values = published.lock().unwrap().clone();
    assert_eq!(values, vec![0, 1_000, 2_000, 3_000]);
    assert!(values.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(mounted.elapsed().await.as_millis(), 3_000);
    assert!(mounted.is_ticking());
}

#[tokio::test(start_paused = true)]
async fn unmount_stops_publishing_but_keeps_the_record() {
    let kv = InMemoryStore::new();
    let mut clock = manual_clock();
    let tracker = AttemptTracker::new(clock.clone(), Arc::new(kv.clone()))
        .with_config(TrackerConfig::default().with_tick_period(Duration::from_millis(500)));
    let (published, listener) = recorder();

    let mounted = tracker.mount(identity(), listener).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    mounted.unmount();

    clock.advance(chrono::Duration::seconds(5));
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(published.lock().unwrap().as_slice(), &[0]);
    let record = tracker.inspect(&identity()).await.unwrap();
    assert!(record.running_start().is_some());
}

#[tokio::test(start_paused = true)]
async fn submit_stops_ticking_only_on_success() {
    let mut clock = manual_clock();
    let tracker = AttemptTracker::new(clock.clone(), Arc::new(InMemoryStore::new()));
    let (_published, listener) = recorder();
    let draft = SubmissionDraft::new(
        ChallengeSlug::new("loops").unwrap(),
        "<xml/>",
        SubmissionStatus::Passed,
    );

    let mut mounted = tracker.mount(identity(), listener).await.unwrap();
    clock.advance(chrono::Duration::seconds(4));

    let failing = SubmissionFinalizer::new(Arc::new(RejectAll));
    assert!(failing.finalize(&mut mounted, draft.clone()).await.is_err());
    assert!(mounted.is_ticking());
    assert_eq!(mounted.state().await, TimerState::Running);

    let finalizer = SubmissionFinalizer::new(Arc::new(AcceptAll));
    let submission = finalizer.finalize(&mut mounted, draft).await.unwrap();
    assert_eq!(submission.time_spent_ms, 4_000);
    assert!(!mounted.is_ticking());
    assert_eq!(mounted.state().await, TimerState::Finalized);
}

#[tokio::test(start_paused = true)]
async fn ticks_continue_while_the_sink_is_slow() {
    let mut clock = manual_clock();
    let tracker = AttemptTracker::new(clock.clone(), Arc::new(InMemoryStore::new()));
    let (published, listener) = recorder();

    let mut mounted = tracker.mount(identity(), listener).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    clock.advance(chrono::Duration::seconds(2));
    let before = published.lock().unwrap().len();

    let draft = SubmissionDraft::new(
        ChallengeSlug::new("loops").unwrap(),
        "<xml/>",
        SubmissionStatus::Passed,
    );
    let submission = SubmissionFinalizer::new(Arc::new(SlowSink))
        .finalize(&mut mounted, draft)
        .await
        .unwrap();

    assert_eq!(submission.time_spent_ms, 2_000);
    assert!(published.lock().unwrap().len() >= before + 3);
    assert_eq!(mounted.state().await, TimerState::Finalized);
    assert!(!mounted.is_ticking());
}
