//! Weekly forced refresh, run as a cancellable background task.

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, TimeDelta, Utc, Weekday};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::refresher::MappingRefresher;
use crate::config::Config;
use crate::constants::refresh::{SCHEDULE_HOUR, SCHEDULE_MINUTE, SCHEDULE_WEEKDAY};
use crate::error::AppError;

/// A weekday and wall-clock time in a fixed UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySchedule {
    weekday: Weekday,
    at: NaiveTime,
    offset: FixedOffset,
}

impl WeeklySchedule {
    pub fn new(
        weekday: Weekday,
        hour: u32,
        minute: u32,
        utc_offset_hours: i32,
    ) -> Result<Self, AppError> {
        let at = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            AppError::config_error(format!("Invalid schedule time {hour:02}:{minute:02}"))
        })?;
        let offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AppError::config_error(format!("Invalid UTC offset {utc_offset_hours}h"))
            })?;
        Ok(Self {
            weekday,
            at,
            offset,
        })
    }

    /// Sunday 03:00 in the configured offset
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            SCHEDULE_WEEKDAY,
            SCHEDULE_HOUR,
            SCHEDULE_MINUTE,
            config.schedule_utc_offset_hours,
        )
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// First scheduled instant strictly after `now`
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = now.with_timezone(&self.offset).naive_local();
        let days_ahead = (i64::from(self.weekday.num_days_from_monday())
            - i64::from(local.weekday().num_days_from_monday()))
        .rem_euclid(7);

        let mut candidate = (local.date() + TimeDelta::days(days_ahead)).and_time(self.at);
        if candidate <= local {
            candidate += TimeDelta::days(7);
        }

        let utc = candidate - TimeDelta::seconds(i64::from(self.offset.local_minus_utc()));
        DateTime::from_naive_utc_and_offset(utc, Utc)
    }

    /// Time to wait from `now` until the next run
    pub fn delay_after(&self, now: DateTime<Utc>) -> Duration {
        (self.next_run_after(now) - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// Starts the background task that forces a refresh at every scheduled time.
pub struct RefreshScheduler;

impl RefreshScheduler {
    pub fn start(refresher: Arc<MappingRefresher>, schedule: WeeklySchedule) -> ScheduleHandle {
        Self::start_with_clock(refresher, schedule, Utc::now)
    }

    /// Like [`RefreshScheduler::start`], reading the current time from `clock`
    /// before computing each delay.
    pub fn start_with_clock<C>(
        refresher: Arc<MappingRefresher>,
        schedule: WeeklySchedule,
        clock: C,
    ) -> ScheduleHandle
    where
        C: Fn() -> DateTime<Utc> + Send + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            loop {
                let now = clock();
                let next = schedule.next_run_after(now);
                info!(
                    "Next scheduled mapping refresh at {}",
                    next.with_timezone(&schedule.offset())
                );

                tokio::select! {
                    _ = tokio::time::sleep(schedule.delay_after(now)) => {
                        refresher.scheduled_refresh().await;
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Mapping refresh scheduler stopped");
        });

        ScheduleHandle { shutdown_tx, task }
    }
}

/// Owner handle of the scheduler task
#[derive(Debug)]
pub struct ScheduleHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ScheduleHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signals shutdown and waits for the task. A refresh already running
    /// completes first.
    pub async fn stop(self) {
        if self.shutdown_tx.send(true).is_err() {
            warn!("Mapping refresh scheduler already gone");
        }
        if let Err(e) = self.task.await {
            warn!("Mapping refresh scheduler ended abnormally: {e}");
        }
    }
}
