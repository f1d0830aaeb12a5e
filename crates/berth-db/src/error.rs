use std::num::ParseIntError;

use thiserror::Error;

/// Failure of a repository operation.
///
/// The repository, not the caller, decides whether a failure is the
/// client's fault: see [`RepoError::status_code`]. Messages pass through the
/// lowest-level cause verbatim.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    Storage(#[from] rusqlite::Error),

    /// A delete statement the store refused.
    #[error("{0}")]
    Rejected(#[source] rusqlite::Error),

    #[error("{entity} with this id doesn't exist")]
    NotFound { entity: &'static str },

    #[error("username already exists")]
    UsernameTaken,

    #[error("invalid {name} value '{value}': {source}")]
    InvalidParam {
        name: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("page must be at least 1")]
    PageOutOfRange,

    #[error("incorrect time duration")]
    InvalidWindow,

    #[error("user {0} doesn't exist")]
    MissingOwner(i64),

    #[error("corrupt {column} value '{value}' in stored row")]
    CorruptRow { column: &'static str, value: String },

    #[error("DB lock poisoned: {0}")]
    Lock(String),
}

impl RepoError {
    /// Suggested HTTP status for this failure: 400 or 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Rejected(_)
            | Self::NotFound { .. }
            | Self::UsernameTaken
            | Self::InvalidParam { .. }
            | Self::PageOutOfRange
            | Self::InvalidWindow => 400,
            Self::Storage(_) | Self::MissingOwner(_) | Self::CorruptRow { .. } | Self::Lock(_) => {
                500
            }
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

/// True when `err` is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
