//! Shared request input validation.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Maximum accepted length for a recipient email address.
const MAX_EMAIL_LENGTH: usize = 254;

/// Validate a recipient email address.
///
/// Uses RFC-compliant validation from the `validator` crate plus a length
/// cap matching the `recipient_email` column.
pub fn validate_recipient_email(email: &str) -> Result<(), CoreError> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(CoreError::Validation(format!(
            "recipient email exceeds {MAX_EMAIL_LENGTH} characters"
        )));
    }
    if !email.validate_email() {
        return Err(CoreError::Validation(
            "recipient email is not a valid address".to_string(),
        ));
    }
    Ok(())
}
