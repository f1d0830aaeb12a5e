use axum::{
    Form,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
};
use serde::de::DeserializeOwned;

use crate::ApiError;

/// Form body whose failures come back as `ApiError` (400, JSON message).
///
/// A request with no `Content-Type` and an empty body yields `T::default()`,
/// so updates that change nothing may omit the body altogether.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormBody<T>(pub T);

impl<S, T> FromRequest<S> for FormBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !req.headers().contains_key(header::CONTENT_TYPE) {
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            if bytes.is_empty() {
                return Ok(Self(T::default()));
            }
            return Err(ApiError::bad_request(
                "form body needs Content-Type: application/x-www-form-urlencoded",
            ));
        }

        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        Ok(Self(value))
    }
}
