use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use thiserror::Error;

use crate::calendar::week::{next_monday, week_key_for_date};
use crate::config::AppConfig;
use crate::digest;
use crate::mailer::Mailer;
use crate::store::CalendarStore;

/// Poll interval for the trigger loop (1 minute)
const POLL_INTERVAL_SECS: u64 = 60;

/// Window around a scheduled time within which it counts as due (2 minutes)
const DUE_WINDOW_SECS: i64 = 120;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("invalid cron expression '{expr}': {message}")]
    InvalidCron { expr: String, message: String },

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
}

#[derive(Debug, Clone, Copy)]
enum DigestKind {
    Proposal,
    FinalPlan,
}

/// Fires the two weekly digest emails on their cron schedules. Reads the
/// store through snapshots only; never mutates schedule state.
pub struct NotificationScheduler {
    store: Arc<CalendarStore>,
    mailer: Arc<dyn Mailer>,
    recipient: String,
    tz: Tz,
    proposal: Schedule,
    final_plan: Schedule,
}

impl NotificationScheduler {
    pub fn new(
        store: Arc<CalendarStore>,
        mailer: Arc<dyn Mailer>,
        config: &AppConfig,
    ) -> Result<Self, SchedulerError> {
        let tz: Tz = config
            .timezone
            .parse()
            .map_err(|_| SchedulerError::InvalidTimezone(config.timezone.clone()))?;

        Ok(Self {
            store,
            mailer,
            recipient: config.notify_recipient.clone(),
            tz,
            proposal: parse_cron(&config.proposal_cron)?,
            final_plan: parse_cron(&config.final_plan_cron)?,
        })
    }

    /// Trigger loop: wakes every minute and runs whichever digest has just
    /// come due. A failed send is logged and not retried until the next
    /// scheduled occurrence.
    pub async fn run(&self) {
        let mut last_proposal: Option<DateTime<Utc>> = None;
        let mut last_final: Option<DateTime<Utc>> = None;

        loop {
            tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECS)).await;
            let now = Utc::now();

            if let Some(due) = due_at(&self.proposal, self.tz, now, last_proposal) {
                log::info!("running weekly proposal email task");
                self.send_proposal().await;
                last_proposal = Some(due);
            }

            if let Some(due) = due_at(&self.final_plan, self.tz, now, last_final) {
                log::info!("running weekly final plan email task");
                self.send_final_plan().await;
                last_final = Some(due);
            }
        }
    }

    /// Saturday action: email the upcoming week as a proposal
    pub async fn send_proposal(&self) {
        self.dispatch(DigestKind::Proposal, self.today()).await;
    }

    /// Sunday action: email the upcoming week as the final plan
    pub async fn send_final_plan(&self) {
        self.dispatch(DigestKind::FinalPlan, self.today()).await;
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    async fn dispatch(&self, kind: DigestKind, today: NaiveDate) {
        let monday = next_monday(today);
        let key = week_key_for_date(monday);
        let grid = self.store.snapshot().week_or_empty(&key);

        let email = match kind {
            DigestKind::Proposal => digest::proposal_email(&grid, monday, &self.recipient),
            DigestKind::FinalPlan => digest::final_plan_email(&grid, monday, &self.recipient),
        };

        if let Err(e) = self.mailer.send(&email).await {
            log::error!("weekly digest email failed ({:?}): {}", kind, e);
        }
    }
}

/// Parse a 5-field cron expression (the `cron` crate wants a leading
/// seconds field, so one is prepended)
fn parse_cron(expr: &str) -> Result<Schedule, SchedulerError> {
    let full_expr = format!("0 {}", expr);
    full_expr
        .parse::<Schedule>()
        .map_err(|e| SchedulerError::InvalidCron {
            expr: expr.to_string(),
            message: e.to_string(),
        })
}

/// Returns the occurrence that makes the schedule due right now, if any.
/// Deduplicates against the previous run so one occurrence fires once.
fn due_at(
    schedule: &Schedule,
    tz: Tz,
    now: DateTime<Utc>,
    last_run: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    let lookback = now.with_timezone(&tz) - chrono::Duration::seconds(DUE_WINDOW_SECS);
    let next = schedule.after(&lookback).next()?;
    let next_utc = next.with_timezone(&Utc);

    if (now - next_utc).num_seconds().abs() >= DUE_WINDOW_SECS {
        return None;
    }
    if let Some(last) = last_run {
        if (last - next_utc).num_seconds().abs() < 60 {
            return None;
        }
    }
    Some(next_utc)
}
