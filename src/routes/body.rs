//! Lenient JSON body extractor.
//!
//! Clients sometimes send an empty body or a missing content type. Instead of
//! rejecting those requests outright, handlers receive `T::default()` and let
//! field validation produce the user-facing message.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use super::error::ApiError;

pub struct LenientJson<T>(pub T);

impl<S, T> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        Ok(Self(parse_lenient(&bytes)))
    }
}

pub(crate) fn parse_lenient<T>(bytes: &[u8]) -> T
where
    T: DeserializeOwned + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return T::default();
    }
    serde_json::from_slice(bytes).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "ignoring malformed json body");
        T::default()
    })
}

#[cfg(test)]
#[path = "body_test.rs"]
mod tests;
