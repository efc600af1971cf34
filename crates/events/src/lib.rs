//! Notification dispatch and the periodic pickup-reminder scheduler.
//!
//! - [`NotificationSender`] — narrow send contract consumed by the deposit
//!   and reissue flows; implemented by [`SmtpSender`] (lettre SMTP) and
//!   [`LogOnlySender`] (development fallback when SMTP is unconfigured).
//! - [`messages`] — plain-text email composition for PIN delivery,
//!   reissue, and pickup reminders.
//! - [`ReminderScheduler`] — background service that periodically scans
//!   for overdue deposited parcels and emails one reminder each.

pub mod mailer;
pub mod messages;
pub mod reminder;

pub use mailer::{EmailConfig, EmailError, LogOnlySender, NotificationSender, SmtpSender};
pub use reminder::{ReminderConfig, ReminderScheduler};
