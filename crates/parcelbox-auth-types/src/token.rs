//! JWT access-token issuing and validation.

#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use jsonwebtoken::{EncodingKey, Header, encode};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use serde::Serialize;
use uuid::Uuid;

use parcelbox_domain::id::{IdentityId, SessionId};

/// Identity extracted from a validated access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    pub identity_id: IdentityId,
    pub session_id: SessionId,
    pub expires_at: u64,
}

/// Errors returned by [`validate_access_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("token encoding failed")]
    Encoding,
}

/// JWT claims payload.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | identity id (UUID string) |
/// | `sid` | custom | session id (UUID string), revoked on sign-out |
/// | `exp` | `exp` | expiration, seconds since UNIX epoch |
///
/// [`Serialize`] requires the **`USE_ONLY_IN_AUTH_SERVICE`** cargo feature: the account
/// service is the sole token issuer.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct JwtClaims {
    pub sub: String,
    pub sid: String,
    pub exp: u64,
}

// ── Core decode (private) ────────────────────────────────────────────────

/// Validation: HS256, exp checked, required claims `exp` + `sub`.
/// Default leeway = 60s.
fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

// ── Public: all consumers ────────────────────────────────────────────────

/// Validate an access token (bearer header or session cookie value).
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let claims = decode_jwt(token, secret)?;
    let identity_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    let session_id = claims
        .sid
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(TokenInfo {
        identity_id: IdentityId(identity_id),
        session_id: SessionId(session_id),
        expires_at: claims.exp,
    })
}

// ── Feature-gated: account service only ──────────────────────────────────

/// Sign an access token for `session_id` that expires at `expires_at` (UNIX seconds).
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
pub fn issue_access_token(
    identity_id: IdentityId,
    session_id: SessionId,
    expires_at: u64,
    secret: &str,
) -> Result<String, AuthError> {
    let claims = JwtClaims {
        sub: identity_id.to_string(),
        sid: session_id.to_string(),
        exp: expires_at,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::Encoding)
}
