//! Token-based identity: issuing, verifying, and extracting the caller.

use std::fmt;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use chrono::{Duration, Utc};
use common::{IdParseError, UserId};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use record_store::RecordStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;
use crate::routes::AppState;

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingCredential,

    #[error("Invalid or expired token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("Invalid token subject")]
    InvalidSubject(#[from] IdParseError),

    #[error("Failed to issue token: {0}")]
    Issue(#[source] jsonwebtoken::errors::Error),
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies HS256 session tokens.
#[derive(Clone)]
pub struct JwtIdentity {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtIdentity {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Token lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Mints a token for the given user.
    pub fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(AuthError::Issue)
    }

    /// Verifies signature and expiry and returns the token's user.
    pub fn resolve(&self, token: &str) -> Result<UserId, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(AuthError::InvalidToken)?;
        Ok(data.claims.sub.parse()?)
    }
}

impl fmt::Debug for JwtIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtIdentity")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

/// Builds the `Set-Cookie` value for a freshly issued token.
pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{TOKEN_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age_secs}")
}

/// Extracts the caller's credential: bearer header first, then the token cookie.
pub fn credential_from_headers(headers: &HeaderMap) -> Option<&str> {
    extract_bearer_token(headers.get(AUTHORIZATION)).or_else(|| {
        headers
            .get_all(COOKIE)
            .iter()
            .find_map(|value| extract_cookie(value, TOKEN_COOKIE))
    })
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn extract_cookie<'a>(value: &'a HeaderValue, name: &str) -> Option<&'a str> {
    value
        .to_str()
        .ok()?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

/// Extractor yielding the authenticated caller.
///
/// Rejects with 401 when no credential is present or it fails verification.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

impl<S> FromRequestParts<Arc<AppState<S>>> for AuthUser
where
    S: RecordStore + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = credential_from_headers(&parts.headers).ok_or(AuthError::MissingCredential)?;
        let user_id = state.identity.resolve(token)?;
        Ok(AuthUser(user_id))
    }
}
