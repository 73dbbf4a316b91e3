//! Caller identity.
//!
//! Clients identify themselves with an `x-user-id` header or, from a
//! browser, a `uid` cookie. The header wins when both are present.

use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use uuid::Uuid;

use initrack_domain::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ID_COOKIE: &str = "uid";

/// One year, in seconds.
const COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 365;

/// Identity attached to a request, if any. Never rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity(pub Option<UserId>);

impl RequestIdentity {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let from_header = headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| UserId::new(raw).ok());

        Self(from_header.or_else(|| cookie_identity(headers)))
    }
}

impl<S> FromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

fn cookie_identity(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == USER_ID_COOKIE)
        .and_then(|(_, value)| UserId::new(value).ok())
}

/// Mint a fresh identity for a caller that has none.
pub fn mint_identity() -> Option<UserId> {
    UserId::new(Uuid::new_v4().to_string()).ok()
}

/// Add a `Set-Cookie` header carrying `user`.
pub fn set_identity_cookie(headers: &mut HeaderMap, user: &UserId) {
    let cookie = format!(
        "{USER_ID_COOKIE}={user}; Path=/; Max-Age={COOKIE_MAX_AGE}; SameSite=Lax; HttpOnly"
    );
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(e) => {
            tracing::warn!(user_id = %user, error = %e, "Identity not representable as a cookie");
        }
    }
}
