//! Plain-text email composition for the parcel lifecycle.
//!
//! Each function returns `(subject, body)`. Bodies carry the PIN where
//! applicable -- email is the delivery channel for PINs, so these are the
//! only places outside the HTTP response where plaintext PINs appear.

use parcelhub_core::types::Timestamp;

/// Subject prefix applied to every outgoing message.
const SUBJECT_PREFIX: &str = "[Parcelhub]";

/// Human-readable timestamp format for email bodies.
fn format_deadline(at: Timestamp) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Initial PIN delivery after a deposit.
pub fn pin_delivery(location: &str, pin: &str, expires_at: Timestamp) -> (String, String) {
    let subject = format!("{SUBJECT_PREFIX} A parcel is waiting for you");
    let body = format!(
        "A parcel has been deposited for you.\n\
         \n\
         Locker location: {location}\n\
         Pickup PIN: {pin}\n\
         \n\
         The PIN is valid until {deadline}. Enter it at the locker bank\n\
         terminal to open the locker. If the PIN expires, request a new\n\
         one from the pickup page.\n",
        deadline = format_deadline(expires_at),
    );
    (subject, body)
}

/// Replacement PIN after a reissue request. The previous PIN is no longer
/// valid once this is sent.
pub fn pin_reissue(location: &str, pin: &str, expires_at: Timestamp) -> (String, String) {
    let subject = format!("{SUBJECT_PREFIX} Your new pickup PIN");
    let body = format!(
        "A new pickup PIN was issued for your parcel. The previous PIN no\n\
         longer works.\n\
         \n\
         Locker location: {location}\n\
         Pickup PIN: {pin}\n\
         \n\
         The PIN is valid until {deadline}.\n",
        deadline = format_deadline(expires_at),
    );
    (subject, body)
}

/// Reminder for a parcel that has been waiting past the reminder
/// threshold.
pub fn pickup_reminder(location: &str, deposited_at: Timestamp) -> (String, String) {
    let subject = format!("{SUBJECT_PREFIX} Reminder: your parcel is still waiting");
    let body = format!(
        "Your parcel has been waiting in a locker since {since}.\n\
         \n\
         Locker location: {location}\n\
         \n\
         If your PIN has expired, request a new one from the pickup page.\n",
        since = format_deadline(deposited_at),
    );
    (subject, body)
}
