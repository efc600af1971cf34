//! Periodic pickup-reminder processing.
//!
//! [`ReminderScheduler`] runs as a background task spawned from the API
//! binary. On each tick it scans for deposited parcels older than the
//! configured threshold that have not been reminded yet, sends one
//! reminder per parcel, and records a summary audit event. "Now" is
//! injected into [`ReminderScheduler::process_reminders`] so tests drive
//! the scan deterministically.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parcelhub_core::audit::{action_codes, Category, Severity};
use parcelhub_core::types::Timestamp;
use parcelhub_db::models::audit::CreateAuditEvent;
use parcelhub_db::models::parcel::ReminderRunSummary;
use parcelhub_db::repositories::{AuditEventRepo, LockerRepo, ParcelRepo};
use parcelhub_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::mailer::NotificationSender;
use crate::messages;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Default age after which a deposited parcel earns a reminder.
const DEFAULT_REMINDER_AFTER_HOURS: i64 = 24;

/// Default scheduler tick interval.
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3600;

/// Reminder scheduler configuration.
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// A deposited parcel older than this earns one reminder.
    pub reminder_after_hours: i64,
    /// How often the scheduler polls for due reminders.
    pub check_interval: Duration,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            reminder_after_hours: DEFAULT_REMINDER_AFTER_HOURS,
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
        }
    }
}

impl ReminderConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults (24h threshold, hourly tick).
    ///
    /// | Variable                  | Default |
    /// |---------------------------|---------|
    /// | `REMINDER_AFTER_HOURS`    | `24`    |
    /// | `REMINDER_INTERVAL_SECS`  | `3600`  |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            reminder_after_hours: std::env::var("REMINDER_AFTER_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.reminder_after_hours),
            check_interval: std::env::var("REMINDER_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.check_interval),
        }
    }
}

// ---------------------------------------------------------------------------
// ReminderScheduler
// ---------------------------------------------------------------------------

/// Background service that emails pickup reminders on a periodic basis.
pub struct ReminderScheduler {
    pool: DbPool,
    mailer: Arc<dyn NotificationSender>,
    config: ReminderConfig,
}

impl ReminderScheduler {
    /// Create a new scheduler with the given pool, sender, and config.
    pub fn new(pool: DbPool, mailer: Arc<dyn NotificationSender>, config: ReminderConfig) -> Self {
        Self {
            pool,
            mailer,
            config,
        }
    }

    /// Run the reminder loop until `cancel` is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            reminder_after_hours = self.config.reminder_after_hours,
            interval_secs = self.config.check_interval.as_secs(),
            "Reminder scheduler started"
        );

        let mut interval = tokio::time::interval(self.config.check_interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reminder scheduler stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.process_reminders(Utc::now()).await {
                        Ok(summary) if summary.scanned > 0 => {
                            tracing::info!(
                                scanned = summary.scanned,
                                sent = summary.sent,
                                failed = summary.failed,
                                "Reminder run complete"
                            );
                        }
                        Ok(_) => {
                            tracing::debug!("Reminder run: nothing due");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Reminder run failed");
                        }
                    }
                }
            }
        }
    }

    /// Process one reminder sweep at the injected `now`.
    ///
    /// Sends one reminder per eligible parcel and marks `reminder_sent_at`
    /// only after a successful send, so failures retry on the next sweep.
    /// Individual send failures are logged and skipped; the sweep never
    /// aborts part-way. A non-empty run records one summary audit event.
    pub async fn process_reminders(
        &self,
        now: Timestamp,
    ) -> Result<ReminderRunSummary, sqlx::Error> {
        let cutoff = now - chrono::Duration::hours(self.config.reminder_after_hours);
        let due = ParcelRepo::find_reminder_due(&self.pool, cutoff).await?;

        let mut summary = ReminderRunSummary {
            scanned: due.len(),
            ..Default::default()
        };

        for parcel in &due {
            let location = match parcel.locker_id {
                Some(locker_id) => LockerRepo::find_by_id(&self.pool, locker_id)
                    .await?
                    .map(|l| l.location)
                    .unwrap_or_else(|| "unknown location".to_string()),
                None => "unknown location".to_string(),
            };

            let (subject, body) = messages::pickup_reminder(&location, parcel.created_at);

            match self.mailer.send(&parcel.recipient_email, &subject, &body).await {
                Ok(()) => {
                    ParcelRepo::mark_reminder_sent(&self.pool, parcel.id, now).await?;
                    summary.sent += 1;
                }
                Err(e) => {
                    tracing::error!(
                        parcel_id = parcel.id,
                        error = %e,
                        "Failed to send pickup reminder"
                    );
                    summary.failed += 1;
                }
            }
        }

        if summary.scanned > 0 {
            self.record_summary(&summary).await;
        }

        Ok(summary)
    }

    /// Record the sweep summary in the audit trail. Insert failures are
    /// logged but never propagate: audit problems must not fail the sweep.
    async fn record_summary(&self, summary: &ReminderRunSummary) {
        let entry = CreateAuditEvent {
            action_code: action_codes::REMINDERS_PROCESSED.to_string(),
            category: Category::SystemAction.as_str().to_string(),
            severity: Severity::Low.as_str().to_string(),
            actor: None,
            parcel_id: None,
            locker_id: None,
            details: Some(serde_json::json!({
                "scanned": summary.scanned,
                "sent": summary.sent,
                "failed": summary.failed,
            })),
        };
        if let Err(e) = AuditEventRepo::insert(&self.pool, &entry).await {
            tracing::error!(error = %e, "Failed to record reminder summary audit event");
        }
    }
}
