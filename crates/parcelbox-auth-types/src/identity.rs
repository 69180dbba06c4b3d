//! Session-token extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::extract::CookieJar;
use http::request::Parts;
use http::{HeaderMap, StatusCode, header};

use crate::cookie::PARCELBOX_SESSION;
use crate::token::{TokenInfo, validate_access_token};

/// HMAC secret used to validate access tokens. Provide it through `FromRef` on the
/// router state.
#[derive(Clone)]
pub struct TokenSecret(pub Arc<str>);

impl TokenSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }
}

/// Claims of a validated access token, read from `Authorization: Bearer` or the
/// `parcelbox_session` cookie (bearer wins when both are present).
///
/// Returns 401 if no token is present or it fails validation. Session liveness
/// (revocation) is checked by handlers after extraction.
#[derive(Debug, Clone, Copy)]
pub struct SessionClaims(pub TokenInfo);

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_owned())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(PARCELBOX_SESSION)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

fn extract(parts: &Parts, secret: &TokenSecret) -> Result<Option<SessionClaims>, StatusCode> {
    let Some(token) = bearer_token(&parts.headers).or_else(|| cookie_token(&parts.headers))
    else {
        return Ok(None);
    };
    match validate_access_token(&token, &secret.0) {
        Ok(info) => Ok(Some(SessionClaims(info))),
        Err(e) => {
            tracing::debug!(error = %e, "rejected access token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

impl<S> FromRequestParts<S> for SessionClaims
where
    S: Send + Sync,
    TokenSecret: FromRef<S>,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send`; resolve synchronously and
    // return a 'static async block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = extract(parts, &TokenSecret::from_ref(state))
            .and_then(|claims| claims.ok_or(StatusCode::UNAUTHORIZED));
        async move { result }
    }
}
