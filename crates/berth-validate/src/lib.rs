//! Berth input validation.
//!
//! Pure checks run by the handlers before anything reaches storage.
//! Rules are a blacklist: only `"`, `\` and `/` are rejected, plus length
//! bounds measured in UTF-8 bytes. Everything else, including non-ASCII
//! text, is allowed.

pub mod fields;
pub mod password;

pub use fields::{check_time_order, validate_comment, validate_password, validate_username};
pub use password::{HashError, hash_password};

use std::fmt::Display;

use thiserror::Error;

/// Characters that may not appear in usernames, passwords or comments.
pub const BANNED_CHARS: [char; 3] = ['"', '\\', '/'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
    Comment,
}

impl Field {
    /// Name used in the banned-symbols message; comments are plural there.
    fn banned_label(self) -> &'static str {
        match self {
            Self::Comment => "comments",
            other => other.name(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::Comment => "comment",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("banned symbols in {}", .field.banned_label())]
    BannedChars { field: Field },

    #[error("incorrect {field} length ({min} <= length <= {max})")]
    LengthOutOfRange { field: Field, min: usize, max: usize },

    #[error("incorrect start_time")]
    BadStartFormat,

    #[error("incorrect end_time")]
    BadEndFormat,

    #[error("incorrect time duration")]
    EndNotAfterStart,
}

/// Escape `"`, `\` and `/` so the message can sit inside a JSON string
/// literal that is assembled by hand.
pub fn format_error_for_transport(err: &dyn Display) -> String {
    let raw = err.to_string();
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if BANNED_CHARS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
