use std::num::ParseIntError;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use berth_db::RepoError;
use berth_validate::{HashError, ValidationError, format_error_for_transport};
use thiserror::Error;
use tracing::{error, warn};

/// A failed request: status plus the human-readable cause.
///
/// The body is `{"message": "..."}`, assembled by hand around the escaped
/// message, so it is not passed through a JSON encoder again.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub fn body(&self) -> String {
        let mut message = String::new();
        for c in format_error_for_transport(&self.message).chars() {
            if c.is_control() {
                message.push_str(&format!("\\u{:04x}", u32::from(c)));
            } else {
                message.push(c);
            }
        }
        format!(r#"{{"message":"{message}"}}"#)
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<HashError> for ApiError {
    fn from(err: HashError) -> Self {
        Self::internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{} {}", self.status, self.message);
        } else {
            warn!("{} {}", self.status, self.message);
        }

        let body = self.body();
        (self.status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}

/// Parse an integer request parameter, reporting failures as 400.
pub fn parse_int(name: &str, raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|e: ParseIntError| ApiError::bad_request(format!("invalid {name} {raw:?}: {e}")))
}
