// test-only module included via protocol/mod.rs
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::config::HandshakeConfig;
use crate::protocol::handshake::*;
use crate::protocol::AckPayload;
use crate::transport::{Scheduler, Task};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use uuid::Uuid;

/// Holds scheduled tasks until the test fires them.
#[derive(Default)]
struct ManualScheduler {
    delayed: Mutex<Vec<(Duration, Task)>>,
}

impl ManualScheduler {
    fn fire_all(&self) -> usize {
        let tasks: Vec<_> = self.delayed.lock().unwrap().drain(..).collect();
        let count = tasks.len();
        for (_, task) in tasks {
            task();
        }
        count
    }

    fn pending(&self) -> usize {
        self.delayed.lock().unwrap().len()
    }
}

impl Scheduler for ManualScheduler {
    fn run_after(&self, delay: Duration, task: Task) {
        self.delayed.lock().unwrap().push((delay, task));
    }

    fn run_now(&self, task: Task) {
        task();
    }
}

/// Counts warnings emitted by the handshake module.
#[derive(Clone, Default)]
struct WarnCounter {
    count: Arc<AtomicUsize>,
}

impl WarnCounter {
    fn get(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() == Level::WARN && meta.target().ends_with("protocol::handshake") {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Run `f` with a thread-local subscriber and return how many warnings it logged.
fn count_warnings(f: impl FnOnce()) -> usize {
    let counter = WarnCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    tracing::subscriber::with_default(subscriber, f);
    counter.get()
}

fn tracker(version: &str) -> (Arc<AckTracker>, Arc<ManualScheduler>) {
    let scheduler = Arc::new(ManualScheduler::default());
    let tracker = Arc::new(AckTracker::with_settings(
        version,
        &HandshakeConfig::default(),
        scheduler.clone(),
    ));
    (tracker, scheduler)
}

#[test]
fn test_happy_path_verifies_endpoint() {
    let (tracker, scheduler) = tracker("1.2.3");

    let request = tracker.should_ack("survival").expect("unverified endpoint gets an ack request");
    assert_eq!(request.version, "1.2.3");
    assert_eq!(scheduler.pending(), 1);

    assert!(tracker.received_ack("survival", &AckPayload::new(request.ack_id, "1.2.3")));
    assert_eq!(tracker.status("survival"), EndpointStatus::Verified);

    // The scheduled check is a no-op once verified
    scheduler.fire_all();
    assert_eq!(tracker.status("survival"), EndpointStatus::Verified);
    assert_eq!(tracker.misses("survival"), 0);

    assert!(tracker.should_ack("survival").is_none());
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn test_scheduled_delay_matches_config() {
    let (tracker, scheduler) = tracker("1.2.3");
    tracker.should_ack("lobby");
    let delays: Vec<Duration> = scheduler
        .delayed
        .lock()
        .unwrap()
        .iter()
        .map(|(delay, _)| *delay)
        .collect();
    assert_eq!(delays, vec![Duration::from_secs(30)]);
}

#[test]
fn test_circuit_breaker_trips_after_threshold() {
    let (tracker, scheduler) = tracker("1.2.3");

    for expected_misses in 1..=2 {
        assert!(tracker.should_ack("creative").is_some());
        scheduler.fire_all();
        assert_eq!(tracker.status("creative"), EndpointStatus::Unverified);
        assert_eq!(tracker.misses("creative"), expected_misses);
    }

    assert!(tracker.should_ack("creative").is_some());
    scheduler.fire_all();
    assert_eq!(tracker.status("creative"), EndpointStatus::Broken);
    assert_eq!(tracker.misses("creative"), 0);
}

#[test]
fn test_broken_endpoint_is_still_probed_and_recovers() {
    let (tracker, scheduler) = tracker("1.2.3");
    for _ in 0..3 {
        tracker.should_ack("minigames");
        scheduler.fire_all();
    }
    assert_eq!(tracker.status("minigames"), EndpointStatus::Broken);

    // Three more misses keep it broken without another transition
    for _ in 0..3 {
        assert!(tracker.should_ack("minigames").is_some());
        scheduler.fire_all();
    }
    assert_eq!(tracker.status("minigames"), EndpointStatus::Broken);

    let request = tracker.should_ack("minigames").unwrap();
    assert!(tracker.received_ack("minigames", &AckPayload::new(request.ack_id, "1.2.3")));
    assert_eq!(tracker.status("minigames"), EndpointStatus::Verified);
    assert_eq!(tracker.misses("minigames"), 0);
}

#[test]
fn test_version_mismatch_still_verifies() {
    let (tracker, _scheduler) = tracker("1.2.3");
    let request = tracker.should_ack("hub").unwrap();

    assert!(tracker.received_ack("hub", &AckPayload::new(request.ack_id, "1.1.0")));
    assert_eq!(tracker.status("hub"), EndpointStatus::Verified);

    // Later acks are accepted without another transition
    assert!(!tracker.received_ack("hub", &AckPayload::new(Uuid::new_v4(), "1.1.0")));
}

#[test]
fn test_ack_credited_to_issuing_endpoint() {
    let (tracker, _scheduler) = tracker("1.2.3");
    let request = tracker.should_ack("lobby-1").unwrap();

    tracker.received_ack("lobby-2", &AckPayload::new(request.ack_id, "1.2.3"));

    assert_eq!(tracker.status("lobby-1"), EndpointStatus::Verified);
    assert_eq!(tracker.status("lobby-2"), EndpointStatus::Unverified);
    assert_eq!(tracker.pending_acks(), 0);
}

#[test]
fn test_unsolicited_ack_credits_reporter() {
    let (tracker, _scheduler) = tracker("1.2.3");
    tracker.received_ack("skyblock", &AckPayload::new(Uuid::new_v4(), "1.2.3"));
    assert_eq!(tracker.status("skyblock"), EndpointStatus::Verified);
}

#[test]
fn test_endpoints_are_independent() {
    let (tracker, scheduler) = tracker("1.2.3");
    let a = tracker.should_ack("a").unwrap();
    tracker.should_ack("b");
    tracker.received_ack("a", &AckPayload::new(a.ack_id, "1.2.3"));
    scheduler.fire_all();

    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot["a"].status, EndpointStatus::Verified);
    assert_eq!(
        snapshot["b"],
        EndpointState {
            status: EndpointStatus::Unverified,
            consecutive_misses: 1
        }
    );
}

#[test]
fn test_unknown_endpoint_status() {
    let (tracker, _scheduler) = tracker("1.2.3");
    assert_eq!(tracker.status("never-seen"), EndpointStatus::Unverified);
    assert_eq!(tracker.misses("never-seen"), 0);
    assert!(tracker.snapshot().is_empty());
}

#[test]
fn test_broken_transition_warns_once() {
    let (tracker, scheduler) = tracker("1.2.3");

    let warnings = count_warnings(|| {
        for _ in 0..9 {
            assert!(tracker.should_ack("factions").is_some());
            scheduler.fire_all();
        }
    });

    assert_eq!(tracker.status("factions"), EndpointStatus::Broken);
    assert_eq!(warnings, 1);
}

#[test]
fn test_version_mismatch_warns_once() {
    let (tracker, _scheduler) = tracker("1.2.3");
    let request = tracker.should_ack("hub").unwrap();

    let warnings = count_warnings(|| {
        assert!(tracker.received_ack("hub", &AckPayload::new(request.ack_id, "1.1.0")));
        assert!(!tracker.received_ack("hub", &AckPayload::new(Uuid::new_v4(), "1.1.0")));
    });

    assert_eq!(tracker.status("hub"), EndpointStatus::Verified);
    assert_eq!(tracker.misses("hub"), 0);
    assert_eq!(warnings, 1);
}

#[test]
fn test_matching_version_does_not_warn() {
    let (tracker, _scheduler) = tracker("1.2.3");
    let request = tracker.should_ack("hub").unwrap();

    let warnings = count_warnings(|| {
        assert!(tracker.received_ack("hub", &AckPayload::new(request.ack_id, "1.2.3")));
    });

    assert_eq!(warnings, 0);
}
