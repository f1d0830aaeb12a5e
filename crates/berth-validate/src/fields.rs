use chrono::NaiveDateTime;

use berth_types::timestamp;

use crate::{BANNED_CHARS, Field, ValidationError};

const USERNAME_LEN: (usize, usize) = (3, 20);
const PASSWORD_LEN: (usize, usize) = (6, 20);
const COMMENT_LEN: (usize, usize) = (5, 120);

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    check_field(Field::Username, username, USERNAME_LEN)
}

/// Runs on the plaintext, before hashing.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    check_field(Field::Password, password, PASSWORD_LEN)
}

/// Comments are optional: the empty string always passes.
pub fn validate_comment(comment: &str) -> Result<(), ValidationError> {
    if comment.is_empty() {
        return Ok(());
    }
    check_field(Field::Comment, comment, COMMENT_LEN)
}

/// Parse both ends of a booking window and require `end > start`.
///
/// Returns the parsed pair so callers don't parse twice.
pub fn check_time_order(
    start: &str,
    end: &str,
) -> Result<(NaiveDateTime, NaiveDateTime), ValidationError> {
    let start = timestamp::parse(start).map_err(|_| ValidationError::BadStartFormat)?;
    let end = timestamp::parse(end).map_err(|_| ValidationError::BadEndFormat)?;

    if end <= start {
        return Err(ValidationError::EndNotAfterStart);
    }
    Ok((start, end))
}

// Banned characters are checked before length.
fn check_field(
    field: Field,
    value: &str,
    (min, max): (usize, usize),
) -> Result<(), ValidationError> {
    if value.contains(BANNED_CHARS) {
        return Err(ValidationError::BannedChars { field });
    }
    if value.len() < min || value.len() > max {
        return Err(ValidationError::LengthOutOfRange { field, min, max });
    }
    Ok(())
}
