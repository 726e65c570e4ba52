//! Bearer token extraction.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::ApiError;

/// The caller's `Authorization` header value, forwarded unchanged to every
/// downstream call. Requests without one are rejected with 401 before any
/// workflow runs.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.trim().is_empty())
            .map(|value| BearerToken(value.to_string()))
            .ok_or_else(|| {
                metrics::counter!("unauthorized_requests_total").increment(1);
                ApiError::Unauthorized
            })
    }
}
