//! Encode-side password policy.
//!
//! Only applied when a message is being protected; decoding accepts any
//! password and lets the cipher decide.

use crate::common::error::{Result, StegoError};

/// Minimum password length in characters.
pub const MIN_PASSWORD_LEN: usize = 6;
/// Minimum number of character classes (upper, lower, digit, special).
pub const MIN_CHARACTER_CLASSES: usize = 2;

const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Check that `password` is acceptable for encrypting a message.
pub fn check_strength(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(StegoError::WeakPassword("password is empty".to_string()));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(StegoError::WeakPassword(format!(
            "must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    let classes = [
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| SPECIAL_CHARS.contains(c)),
    ];

    if classes.iter().filter(|&&present| present).count() < MIN_CHARACTER_CLASSES {
        return Err(StegoError::WeakPassword(
            "use at least 2 of: uppercase letters, lowercase letters, numbers, special characters"
                .to_string(),
        ));
    }

    Ok(())
}
