//! Requester context extraction.
//!
//! An upstream session layer authenticates the caller and attaches the
//! resolved user ID as the `x-user-id` header before the request reaches
//! this service. The extractor turns that header into an explicit
//! [`RequesterContext`]; a missing or blank header is rejected as
//! unauthenticated before any handler code runs.

use crate::error::ApiError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use trellis_core::{Error, RequesterContext};

/// Header carrying the resolved caller identity.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor wrapper; handlers destructure it as `Requester(ctx)`.
#[derive(Debug, Clone)]
pub struct Requester(pub RequesterContext);

#[async_trait]
impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Self(RequesterContext::new(value)))
            .ok_or_else(|| ApiError::from(Error::Authentication))
    }
}
