use crate::navigator::Navigator;
use crate::notify::{maybe_notify, NotificationOutcome, Notify};
use crate::session::Session;
use slotwatch_common::calendar::format_iso_date;
use slotwatch_common::extract;
use slotwatch_common::job::{MonitorJob, TimeWindow};
use slotwatch_common::slots::AvailabilityResult;
use std::time::Duration;
use thiserror::Error;
use time::{Date, OffsetDateTime};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("party size must be positive")]
    InvalidPartySize,
}

/// Control operations the job-control surface sends to the scheduler task.
/// Replies travel back over oneshot channels.
pub enum SchedulerCommand {
    Add {
        date: Date,
        window: TimeWindow,
        party_size: Option<u32>,
        reply: oneshot::Sender<Result<String, ScheduleError>>,
    },
    Remove {
        id: String,
        reply: oneshot::Sender<bool>,
    },
    List {
        reply: oneshot::Sender<Vec<MonitorJob>>,
    },
    Check {
        date: Date,
        window: TimeWindow,
        party_size: Option<u32>,
        reply: oneshot::Sender<AvailabilityResult>,
    },
    Shutdown,
}

/// Owns the job set, the shared browsing session, and the notifier, and is
/// the only mutator of job state. Everything — ticks and control commands —
/// runs on the single task inside [`Scheduler::run`], which serializes
/// session access across jobs.
pub struct Scheduler {
    jobs: Vec<MonitorJob>,
    navigator: Navigator,
    session: Box<dyn Session>,
    notifier: Box<dyn Notify>,
    base_url: Url,
    poll_interval: Duration,
    job_seq: u64,
}

impl Scheduler {
    pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(60);

    pub fn new(
        session: Box<dyn Session>,
        navigator: Navigator,
        notifier: Box<dyn Notify>,
        base_url: Url,
        poll_interval: Duration,
    ) -> Self {
        Self {
            jobs: Vec::new(),
            navigator,
            session,
            notifier,
            base_url,
            poll_interval: poll_interval.max(Self::MIN_POLL_INTERVAL),
            job_seq: 0,
        }
    }

    /// Insert a new job. Party size defaults to 2; `last_checked` starts at
    /// the epoch so the next tick picks the job up immediately.
    pub fn add_job(
        &mut self,
        date: Date,
        window: TimeWindow,
        party_size: Option<u32>,
    ) -> Result<String, ScheduleError> {
        let party_size = party_size.unwrap_or(2);
        if party_size == 0 {
            return Err(ScheduleError::InvalidPartySize);
        }

        self.job_seq += 1;
        let id = format!(
            "job-{}-{}",
            OffsetDateTime::now_utc().unix_timestamp(),
            self.job_seq
        );
        self.jobs.push(MonitorJob::new(
            id.clone(),
            date,
            window,
            party_size,
            self.poll_interval,
        ));
        info!(
            job = %id,
            date = %format_iso_date(date),
            %window,
            party_size,
            "job added"
        );
        Ok(id)
    }

    /// Remove a job if present. Removing an absent id is not an error.
    pub fn remove_job(&mut self, id: &str) -> bool {
        let before = self.jobs.len();
        self.jobs.retain(|j| j.id != id);
        let removed = self.jobs.len() != before;
        if removed {
            info!(job = id, "job removed");
        }
        removed
    }

    pub fn jobs(&self) -> &[MonitorJob] {
        &self.jobs
    }

    /// One-off availability check outside any job. Never notifies.
    pub async fn check_now(
        &mut self,
        date: Date,
        window: TimeWindow,
        party_size: u32,
    ) -> AvailabilityResult {
        if party_size == 0 {
            return AvailabilityResult::failed(ScheduleError::InvalidPartySize.to_string());
        }
        self.run_check(date, window, party_size).await
    }

    async fn run_check(
        &mut self,
        date: Date,
        window: TimeWindow,
        party_size: u32,
    ) -> AvailabilityResult {
        match self
            .navigator
            .navigate_to_slot_selection(self.session.as_mut(), date, party_size)
            .await
        {
            Ok(labels) => extract(&labels, window, date, party_size, &self.base_url),
            Err(e) => AvailabilityResult::failed(e.to_string()),
        }
    }

    pub async fn run_tick(&mut self) {
        self.run_tick_at(OffsetDateTime::now_utc()).await;
    }

    /// One eligibility pass over all jobs, in insertion order. `now` is
    /// recorded as each eligible job's `last_checked` *before* its check
    /// runs, so a slow or failing check cannot re-enter within the same
    /// interval. A per-job failure never aborts the rest of the pass.
    pub async fn run_tick_at(&mut self, now: OffsetDateTime) {
        for idx in 0..self.jobs.len() {
            let (id, date, window, party_size) = {
                let job = &self.jobs[idx];
                if !job.is_eligible(now) {
                    continue;
                }
                (job.id.clone(), job.date, job.window, job.party_size)
            };
            self.jobs[idx].last_checked = now;

            let result = self.run_check(date, window, party_size).await;
            if let Some(error) = &result.error {
                warn!(job = %id, error, "availability check failed");
                continue;
            }
            if !result.available {
                info!(job = %id, "no open slots");
                continue;
            }

            match maybe_notify(self.notifier.as_ref(), date, window, party_size, &result).await {
                NotificationOutcome::Sent => {
                    self.jobs[idx].notified = true;
                    info!(job = %id, open = result.slots.len(), "notification sent");
                }
                NotificationOutcome::Skipped => {}
                NotificationOutcome::Failed(e) => {
                    warn!(
                        job = %id,
                        error = %e,
                        "dispatch failed, job stays unnotified for retry"
                    );
                }
            }
        }
    }

    /// Serialized drive loop: a fixed tick interval and the control channel
    /// multiplex onto this single task, so ticks never overlap each other
    /// or a control command, and the session is never driven concurrently.
    pub async fn run(mut self, tick_interval: Duration, mut commands: mpsc::Receiver<SchedulerCommand>) {
        let mut ticker = tokio::time::interval(tick_interval.max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.run_tick().await,
                cmd = commands.recv() => match cmd {
                    Some(SchedulerCommand::Add { date, window, party_size, reply }) => {
                        let _ = reply.send(self.add_job(date, window, party_size));
                    }
                    Some(SchedulerCommand::Remove { id, reply }) => {
                        let _ = reply.send(self.remove_job(&id));
                    }
                    Some(SchedulerCommand::List { reply }) => {
                        let _ = reply.send(self.jobs.clone());
                    }
                    Some(SchedulerCommand::Check { date, window, party_size, reply }) => {
                        let result = self
                            .check_now(date, window, party_size.unwrap_or(2))
                            .await;
                        let _ = reply.send(result);
                    }
                    Some(SchedulerCommand::Shutdown) | None => {
                        info!("scheduler stopped");
                        break;
                    }
                },
            }
        }
    }
}
