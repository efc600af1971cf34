//! Audit trail vocabulary: action codes, categories, severities, and
//! sensitive-field redaction.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! both the API/repository layer and the reminder scheduler.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Action code constants
// ---------------------------------------------------------------------------

/// Known action codes for audit events.
pub mod action_codes {
    pub const USER_DEPOSIT: &str = "USER_DEPOSIT";
    pub const USER_PICKUP_SUCCESS: &str = "USER_PICKUP_SUCCESS";
    pub const USER_PICKUP_INVALID_PIN: &str = "USER_PICKUP_INVALID_PIN";
    pub const USER_PICKUP_PIN_EXPIRED: &str = "USER_PICKUP_PIN_EXPIRED";
    pub const USER_PICKUP_UNKNOWN_PARCEL: &str = "USER_PICKUP_UNKNOWN_PARCEL";
    pub const USER_PIN_REISSUE: &str = "USER_PIN_REISSUE";
    pub const USER_PIN_REISSUE_RATE_LIMITED: &str = "USER_PIN_REISSUE_RATE_LIMITED";
    pub const USER_RETRACT: &str = "USER_RETRACT";
    pub const USER_PICKUP_DISPUTE: &str = "USER_PICKUP_DISPUTE";
    pub const PARCEL_REPORTED_MISSING: &str = "PARCEL_REPORTED_MISSING";
    pub const ADMIN_LOGIN: &str = "ADMIN_LOGIN";
    pub const ADMIN_LOGIN_FAILED: &str = "ADMIN_LOGIN_FAILED";
    pub const ADMIN_LOCKER_PROVISIONED: &str = "ADMIN_LOCKER_PROVISIONED";
    pub const ADMIN_LOCKER_STATUS_CHANGE: &str = "ADMIN_LOCKER_STATUS_CHANGE";
    pub const NOTIFICATION_FAILED: &str = "NOTIFICATION_FAILED";
    pub const REMINDERS_PROCESSED: &str = "REMINDERS_PROCESSED";
}

// ---------------------------------------------------------------------------
// Category / severity
// ---------------------------------------------------------------------------

/// Audit event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    UserAction,
    AdminAction,
    SecurityEvent,
    SystemAction,
    ErrorEvent,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserAction => "user_action",
            Self::AdminAction => "admin_action",
            Self::SecurityEvent => "security_event",
            Self::SystemAction => "system_action",
            Self::ErrorEvent => "error_event",
        }
    }
}

/// Audit event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Fields that must be redacted from audit event details before storage.
///
/// Matched as case-insensitive substrings of the key name, so `pin`,
/// `pin_hash`, and `plaintext_pin` are all caught.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "pin",
    "password",
    "token",
    "secret",
    "salt",
    "credential",
    "authorization",
];

/// Redact sensitive fields from a JSON value, recursing into nested
/// objects and arrays. Matching keys keep their name but have the value
/// replaced with `"[REDACTED]"`.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(
                        key.clone(),
                        serde_json::Value::String("[REDACTED]".to_string()),
                    );
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            serde_json::Value::Object(redacted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_strings_match_seed_vocabulary() {
        assert_eq!(Category::UserAction.as_str(), "user_action");
        assert_eq!(Category::AdminAction.as_str(), "admin_action");
        assert_eq!(Category::SecurityEvent.as_str(), "security_event");
        assert_eq!(Category::SystemAction.as_str(), "system_action");
        assert_eq!(Category::ErrorEvent.as_str(), "error_event");
    }

    #[test]
    fn severity_strings_match_seed_vocabulary() {
        assert_eq!(Severity::Low.as_str(), "low");
        assert_eq!(Severity::Critical.as_str(), "critical");
    }

    #[test]
    fn redacts_pin_material() {
        let input = serde_json::json!({
            "parcel_id": 7,
            "pin": "482913",
            "pin_salt": "abcd",
        });
        let result = redact_sensitive_fields(&input);
        assert_eq!(result["parcel_id"], 7);
        assert_eq!(result["pin"], "[REDACTED]");
        assert_eq!(result["pin_salt"], "[REDACTED]");
    }

    #[test]
    fn redacts_password_field() {
        let input = serde_json::json!({"username": "warden", "password": "s3cret"});
        let result = redact_sensitive_fields(&input);
        assert_eq!(result["username"], "warden");
        assert_eq!(result["password"], "[REDACTED]");
    }

    #[test]
    fn handles_nested_objects_and_arrays() {
        let input = serde_json::json!({
            "outer": {"reissue_pin": "111111", "size": "small"},
            "attempts": [{"pin": "222222"}],
        });
        let result = redact_sensitive_fields(&input);
        assert_eq!(result["outer"]["reissue_pin"], "[REDACTED]");
        assert_eq!(result["outer"]["size"], "small");
        assert_eq!(result["attempts"][0]["pin"], "[REDACTED]");
    }

    #[test]
    fn non_object_values_unchanged() {
        let input = serde_json::json!("plain_string");
        assert_eq!(redact_sensitive_fields(&input), "plain_string");
    }
}
