//! One-time pickup PIN generation, hashing, and verification.
//!
//! PINs are 6-digit numeric codes drawn from a cryptographically secure
//! random source. Only a salted, iterated keyed hash of the PIN is ever
//! persisted; the plaintext is returned exactly once to the caller for
//! display and email delivery.

use chrono::Duration;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::types::Timestamp;

type HmacSha256 = Hmac<Sha256>;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of digits in a pickup PIN.
pub const PIN_LENGTH: usize = 6;

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 16;

/// Default KDF iteration count for production use.
pub const DEFAULT_KDF_ITERATIONS: u32 = 100_000;

/// Maximum PIN generations per parcel within one rolling window.
pub const MAX_GENERATIONS_PER_WINDOW: i32 = 3;

/// Length of the PIN generation rate-limit window in hours.
pub const GENERATION_WINDOW_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// The result of generating a new PIN.
pub struct GeneratedPin {
    /// The plaintext PIN (shown to the user exactly once, never stored).
    pub plaintext: String,
    /// Hex-encoded random salt (stored alongside the hash).
    pub salt_hex: String,
    /// Hex-encoded KDF output (stored in the database).
    pub hash_hex: String,
    /// When this PIN was generated.
    pub generated_at: Timestamp,
    /// When this PIN stops being accepted.
    pub expires_at: Timestamp,
}

/// Generate a new random PIN with a fresh salt.
///
/// `ttl` controls how long the PIN is accepted from `now`. `iterations` is
/// the KDF round count; production callers pass [`DEFAULT_KDF_ITERATIONS`].
pub fn generate(ttl: Duration, iterations: u32, now: Timestamp) -> GeneratedPin {
    let mut rng = rand::rng();

    let plaintext: String = (0..PIN_LENGTH)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect();

    let mut salt = [0u8; SALT_LENGTH];
    rng.fill(&mut salt[..]);

    let hash = derive_hash(&plaintext, &salt, iterations);

    GeneratedPin {
        plaintext,
        salt_hex: hex::encode(salt),
        hash_hex: hex::encode(hash),
        generated_at: now,
        expires_at: now + ttl,
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify a candidate PIN against a stored salt and hash.
///
/// Recomputes the KDF and compares digests in constant time. Never panics:
/// a malformed candidate, salt, or hash simply yields `false`. The format
/// check runs first so clearly-invalid input skips the KDF entirely.
pub fn verify(candidate: &str, salt_hex: &str, expected_hash_hex: &str, iterations: u32) -> bool {
    if !is_valid_format(candidate) {
        return false;
    }
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(expected_hash_hex) else {
        return false;
    };

    let computed = derive_hash(candidate, &salt, iterations);
    computed.as_slice().ct_eq(expected.as_slice()).into()
}

/// Check that a candidate is exactly [`PIN_LENGTH`] ASCII digits.
pub fn is_valid_format(candidate: &str) -> bool {
    candidate.len() == PIN_LENGTH && candidate.bytes().all(|b| b.is_ascii_digit())
}

/// Whether a PIN has expired at `now`.
///
/// The boundary counts as expired: a PIN with a 24h TTL is rejected at
/// exactly 24h after generation.
pub fn is_expired(expires_at: Timestamp, now: Timestamp) -> bool {
    now >= expires_at
}

// ---------------------------------------------------------------------------
// Rate limiting
// ---------------------------------------------------------------------------

/// Outcome of a PIN reissue quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReissueDecision {
    /// A new PIN may be generated. `reset_window` is true when the rolling
    /// window has elapsed and the generation counter restarts at 1.
    Allowed { reset_window: bool },
    /// The per-window generation quota is exhausted.
    RateLimited,
}

/// Apply the rolling-window generation quota.
///
/// `window_started_at` is the timestamp of the first generation in the
/// current window and `generation_count` the number of generations within
/// it (the deposit-time generation counts as the first). The window resets
/// [`GENERATION_WINDOW_HOURS`] after its first generation.
pub fn check_reissue(
    window_started_at: Timestamp,
    generation_count: i32,
    now: Timestamp,
) -> ReissueDecision {
    if now - window_started_at >= Duration::hours(GENERATION_WINDOW_HOURS) {
        return ReissueDecision::Allowed { reset_window: true };
    }
    if generation_count >= MAX_GENERATIONS_PER_WINDOW {
        return ReissueDecision::RateLimited;
    }
    ReissueDecision::Allowed {
        reset_window: false,
    }
}

// ---------------------------------------------------------------------------
// KDF
// ---------------------------------------------------------------------------

/// Iterated keyed hash: each round keys HMAC-SHA256 with the previous
/// round's output, starting from the salt.
fn derive_hash(pin: &str, salt: &[u8], iterations: u32) -> Vec<u8> {
    let mut key = salt.to_vec();
    for _ in 0..iterations {
        let mut mac = HmacSha256::new_from_slice(&key).expect("HMAC accepts any key length");
        mac.update(pin.as_bytes());
        key = mac.finalize().into_bytes().to_vec();
    }
    key
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Small round count keeps the KDF-heavy tests fast.
    const TEST_ITERATIONS: u32 = 100;

    fn at(hour: u32, min: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 9, 1, hour, min, 0).unwrap()
    }

    // -- Format ------------------------------------------------------------

    #[test]
    fn accepts_six_ascii_digits() {
        assert!(is_valid_format("482913"));
        assert!(is_valid_format("000000"));
    }

    #[test]
    fn rejects_wrong_length_and_non_digits() {
        assert!(!is_valid_format(""));
        assert!(!is_valid_format("12345"));
        assert!(!is_valid_format("1234567"));
        assert!(!is_valid_format("12a456"));
        assert!(!is_valid_format("12 456"));
        assert!(!is_valid_format("１２３４５６")); // full-width digits are not ASCII
    }

    // -- Generation --------------------------------------------------------

    #[test]
    fn generated_pin_has_expected_shape() {
        let pin = generate(Duration::hours(24), TEST_ITERATIONS, at(9, 0));

        assert!(is_valid_format(&pin.plaintext));
        assert_eq!(pin.salt_hex.len(), SALT_LENGTH * 2);
        assert_eq!(pin.hash_hex.len(), 64); // SHA-256 output, hex-encoded
        assert_eq!(pin.expires_at, at(9, 0) + Duration::hours(24));
    }

    #[test]
    fn plaintext_never_appears_in_stored_material() {
        let pin = generate(Duration::hours(24), TEST_ITERATIONS, at(9, 0));
        assert!(!pin.salt_hex.contains(&pin.plaintext));
        assert!(!pin.hash_hex.contains(&pin.plaintext));
    }

    #[test]
    fn fresh_generations_use_distinct_salts() {
        let a = generate(Duration::hours(24), TEST_ITERATIONS, at(9, 0));
        let b = generate(Duration::hours(24), TEST_ITERATIONS, at(9, 0));
        assert_ne!(a.salt_hex, b.salt_hex);
    }

    // -- Verification ------------------------------------------------------

    #[test]
    fn generated_pin_verifies_against_its_own_hash() {
        let pin = generate(Duration::hours(24), TEST_ITERATIONS, at(9, 0));
        assert!(verify(
            &pin.plaintext,
            &pin.salt_hex,
            &pin.hash_hex,
            TEST_ITERATIONS
        ));
    }

    #[test]
    fn single_digit_change_fails_verification() {
        let pin = generate(Duration::hours(24), TEST_ITERATIONS, at(9, 0));

        // Flip the last digit.
        let mut wrong = pin.plaintext.clone().into_bytes();
        wrong[PIN_LENGTH - 1] = if wrong[PIN_LENGTH - 1] == b'9' {
            b'0'
        } else {
            wrong[PIN_LENGTH - 1] + 1
        };
        let wrong = String::from_utf8(wrong).unwrap();

        assert!(!verify(&wrong, &pin.salt_hex, &pin.hash_hex, TEST_ITERATIONS));
    }

    #[test]
    fn verification_works_at_production_iteration_count() {
        let pin = generate(Duration::hours(24), DEFAULT_KDF_ITERATIONS, at(9, 0));
        assert!(verify(
            &pin.plaintext,
            &pin.salt_hex,
            &pin.hash_hex,
            DEFAULT_KDF_ITERATIONS
        ));
    }

    #[test]
    fn malformed_input_fails_closed() {
        let pin = generate(Duration::hours(24), TEST_ITERATIONS, at(9, 0));

        assert!(!verify("12345", &pin.salt_hex, &pin.hash_hex, TEST_ITERATIONS));
        assert!(!verify(
            &pin.plaintext,
            "not-hex",
            &pin.hash_hex,
            TEST_ITERATIONS
        ));
        assert!(!verify(
            &pin.plaintext,
            &pin.salt_hex,
            "not-hex",
            TEST_ITERATIONS
        ));
    }

    #[test]
    fn same_pin_different_salt_produces_different_hash() {
        let a = derive_hash("482913", b"salt-a", TEST_ITERATIONS);
        let b = derive_hash("482913", b"salt-b", TEST_ITERATIONS);
        assert_ne!(a, b);
    }

    // -- Expiry ------------------------------------------------------------

    #[test]
    fn pin_is_live_just_before_ttl() {
        let generated = at(9, 0);
        let expires = generated + Duration::hours(24);
        let just_before = expires - Duration::minutes(1);
        assert!(!is_expired(expires, just_before));
    }

    #[test]
    fn pin_expires_at_exact_ttl_boundary() {
        let expires = at(9, 0) + Duration::hours(24);
        assert!(is_expired(expires, expires));
    }

    #[test]
    fn pin_is_expired_after_ttl() {
        let expires = at(9, 0) + Duration::hours(24);
        assert!(is_expired(expires, expires + Duration::minutes(1)));
    }

    // -- Rate limiting -----------------------------------------------------

    #[test]
    fn reissue_allowed_below_quota() {
        let start = at(9, 0);
        assert_eq!(
            check_reissue(start, 1, start + Duration::hours(1)),
            ReissueDecision::Allowed {
                reset_window: false
            }
        );
        assert_eq!(
            check_reissue(start, 2, start + Duration::hours(2)),
            ReissueDecision::Allowed {
                reset_window: false
            }
        );
    }

    #[test]
    fn fourth_generation_within_window_is_rate_limited() {
        let start = at(9, 0);
        assert_eq!(
            check_reissue(start, 3, start + Duration::hours(3)),
            ReissueDecision::RateLimited
        );
    }

    #[test]
    fn window_resets_after_twenty_four_hours() {
        let start = at(9, 0);
        // 25 hours after the first generation the quota opens again.
        assert_eq!(
            check_reissue(start, 3, start + Duration::hours(25)),
            ReissueDecision::Allowed { reset_window: true }
        );
    }

    #[test]
    fn window_boundary_counts_as_elapsed() {
        let start = at(9, 0);
        assert_eq!(
            check_reissue(start, 3, start + Duration::hours(GENERATION_WINDOW_HOURS)),
            ReissueDecision::Allowed { reset_window: true }
        );
    }
}
