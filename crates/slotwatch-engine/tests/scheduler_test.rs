mod support;

use slotwatch_common::job::TimeWindow;
use slotwatch_engine::navigator::{Navigator, Selectors, WaitConfig};
use slotwatch_engine::scheduler::{ScheduleError, Scheduler};
use std::time::Duration;
use support::{FakeNotifier, FakeSession, FakeState};
use time::macros::datetime;
use time::macros::date;
use url::Url;

const POLL: Duration = Duration::from_secs(300);

fn scheduler(session: FakeSession, notifier: FakeNotifier) -> Scheduler {
    let waits = WaitConfig {
        advance_settle_ms: 1,
        ..WaitConfig::default()
    };
    Scheduler::new(
        Box::new(session),
        Navigator::new(Selectors::default(), waits),
        Box::new(notifier),
        Url::parse("https://bookings.example.com/en?id=demo").unwrap(),
        POLL,
    )
}

#[tokio::test]
async fn first_tick_notifies_once_and_only_once() {
    let notifier = FakeNotifier::new();
    let mut scheduler = scheduler(FakeSession::happy(), notifier.clone());
    scheduler
        .add_job(date!(2025 - 06 - 15), TimeWindow::Dinner, None)
        .unwrap();

    // last_checked starts at the epoch, so the first tick always runs.
    let t0 = datetime!(2025-06-01 09:00 UTC);
    scheduler.run_tick_at(t0).await;
    assert_eq!(notifier.attempts(), 1);
    assert!(scheduler.jobs()[0].notified);

    let (sent_date, window, party_size, slots) = notifier.last().unwrap();
    assert_eq!(sent_date, date!(2025 - 06 - 15));
    assert_eq!(window, TimeWindow::Dinner);
    assert_eq!(party_size, 2);
    assert_eq!(slots[0].time, "18:30");

    // Identical availability on the next tick must not dispatch again.
    scheduler.run_tick_at(t0 + POLL + Duration::from_secs(1)).await;
    assert_eq!(notifier.attempts(), 1);
}

#[tokio::test]
async fn no_check_runs_before_the_poll_interval_elapses() {
    // Only a lunch slot is open, so a dinner job keeps polling forever.
    let mut state = FakeState::happy();
    state.slot_options = vec![("12:00".into(), false)];
    let mut scheduler = scheduler(FakeSession::new(state), FakeNotifier::new());
    scheduler
        .add_job(date!(2025 - 06 - 15), TimeWindow::Dinner, None)
        .unwrap();

    let t0 = datetime!(2025-06-01 09:00 UTC);
    scheduler.run_tick_at(t0).await;
    assert_eq!(scheduler.jobs()[0].last_checked, t0);
    assert!(!scheduler.jobs()[0].notified);

    // Repeated early ticks leave the job untouched.
    for early in [1, 60, 299] {
        scheduler.run_tick_at(t0 + Duration::from_secs(early)).await;
        assert_eq!(scheduler.jobs()[0].last_checked, t0);
    }

    let t1 = t0 + POLL;
    scheduler.run_tick_at(t1).await;
    assert_eq!(scheduler.jobs()[0].last_checked, t1);
}

#[tokio::test]
async fn notified_is_monotonic_across_arbitrary_tick_sequences() {
    let notifier = FakeNotifier::new();
    let mut scheduler = scheduler(FakeSession::happy(), notifier.clone());
    scheduler
        .add_job(date!(2025 - 06 - 15), TimeWindow::Any, Some(3))
        .unwrap();

    let t0 = datetime!(2025-06-01 09:00 UTC);
    let mut seen_notified = false;
    for offset in [0u64, 1, 17, 300, 301, 302, 600, 601, 947, 1200, 3600, 7200] {
        scheduler.run_tick_at(t0 + Duration::from_secs(offset)).await;
        let job = &scheduler.jobs()[0];
        if seen_notified {
            assert!(job.notified, "notified reverted at offset {offset}");
        }
        seen_notified |= job.notified;
    }
    assert!(seen_notified);
    assert_eq!(notifier.attempts(), 1);
}

#[tokio::test]
async fn dispatch_failure_leaves_the_job_retrying() {
    let mut state = FakeState::happy();
    state.party_options = vec![("3".into(), false)];
    let notifier = FakeNotifier::new();
    notifier.set_fail(true);
    let mut scheduler = scheduler(FakeSession::new(state), notifier.clone());
    scheduler
        .add_job(date!(2025 - 06 - 15), TimeWindow::Dinner, Some(3))
        .unwrap();

    let t0 = datetime!(2025-06-01 09:00 UTC);
    scheduler.run_tick_at(t0).await;
    assert_eq!(notifier.attempts(), 1);
    assert!(!scheduler.jobs()[0].notified);

    notifier.set_fail(false);
    scheduler.run_tick_at(t0 + POLL).await;
    assert_eq!(notifier.attempts(), 2);
    assert!(scheduler.jobs()[0].notified);
}

#[tokio::test]
async fn one_failing_job_does_not_block_the_others() {
    let notifier = FakeNotifier::new();
    let mut scheduler = scheduler(FakeSession::happy(), notifier.clone());
    // Day 20 is absent from the scripted calendar, so this job fails.
    let bad = scheduler
        .add_job(date!(2025 - 06 - 20), TimeWindow::Dinner, None)
        .unwrap();
    let good = scheduler
        .add_job(date!(2025 - 06 - 15), TimeWindow::Dinner, None)
        .unwrap();

    let t0 = datetime!(2025-06-01 09:00 UTC);
    scheduler.run_tick_at(t0).await;

    assert_eq!(notifier.attempts(), 1);
    let jobs = scheduler.jobs();
    let bad_job = jobs.iter().find(|j| j.id == bad).unwrap();
    let good_job = jobs.iter().find(|j| j.id == good).unwrap();
    assert!(!bad_job.notified);
    assert!(good_job.notified);
    // The failing check still consumed its interval.
    assert_eq!(bad_job.last_checked, t0);
}

#[tokio::test]
async fn last_checked_advances_even_when_the_session_is_down() {
    let mut state = FakeState::happy();
    state.ready = false;
    let notifier = FakeNotifier::new();
    let mut scheduler = scheduler(FakeSession::new(state), notifier.clone());
    scheduler
        .add_job(date!(2025 - 06 - 15), TimeWindow::Dinner, None)
        .unwrap();

    let t0 = datetime!(2025-06-01 09:00 UTC);
    scheduler.run_tick_at(t0).await;
    assert_eq!(scheduler.jobs()[0].last_checked, t0);
    assert!(!scheduler.jobs()[0].notified);
    assert_eq!(notifier.attempts(), 0);
}

#[tokio::test]
async fn removal_is_idempotent_safe() {
    let mut scheduler = scheduler(FakeSession::happy(), FakeNotifier::new());
    assert!(!scheduler.remove_job("job-0-0"));

    let id = scheduler
        .add_job(date!(2025 - 06 - 15), TimeWindow::Lunch, None)
        .unwrap();
    assert!(scheduler.remove_job(&id));
    assert!(scheduler.jobs().is_empty());
    assert!(!scheduler.remove_job(&id));
}

#[tokio::test]
async fn add_job_defaults_and_validates_party_size() {
    let mut scheduler = scheduler(FakeSession::happy(), FakeNotifier::new());
    let id = scheduler
        .add_job(date!(2025 - 06 - 15), TimeWindow::Dinner, None)
        .unwrap();
    assert_eq!(scheduler.jobs()[0].party_size, 2);

    let err = scheduler
        .add_job(date!(2025 - 06 - 15), TimeWindow::Dinner, Some(0))
        .unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidPartySize));

    let other = scheduler
        .add_job(date!(2025 - 06 - 16), TimeWindow::Dinner, Some(4))
        .unwrap();
    assert_ne!(id, other);
}

#[tokio::test]
async fn check_now_reports_without_notifying() {
    let notifier = FakeNotifier::new();
    let mut scheduler = scheduler(FakeSession::happy(), notifier.clone());

    let result = scheduler
        .check_now(date!(2025 - 06 - 15), TimeWindow::Dinner, 2)
        .await;
    assert!(result.available);
    assert_eq!(result.slots[0].time, "18:30");
    assert_eq!(notifier.attempts(), 0);

    let missing = scheduler
        .check_now(date!(2025 - 06 - 15), TimeWindow::Dinner, 0)
        .await;
    assert!(!missing.available);
    assert!(missing.error.is_some());
}
