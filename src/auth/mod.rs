use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::Level;

pub mod password;

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "trainers_session";

/// Who is making the request. Anything short of a valid cookie backed by a
/// live session record is `Anonymous`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated {
        id: String,
        username: String,
        level: Level,
    },
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Session::Authenticated { id, .. } => Some(id),
            Session::Anonymous => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Session::Authenticated { username, .. } => Some(username),
            Session::Anonymous => None,
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self {
            Session::Authenticated { level, .. } => Some(*level),
            Session::Anonymous => None,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.level().is_some_and(|l| l.is_manager())
    }
}

/// Token payload. The level is not carried here: it is read from the user
/// row on every request so that demotions apply immediately.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub sid: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(username: impl Into<String>, session_id: impl Into<String>, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: username.into(),
            sid: session_id.into(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session secret is not configured")]
    InvalidSecret,

    #[error("Session token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Invalid session token: {0}")]
    InvalidToken(String),
}

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, SessionError> {
    if secret.is_empty() {
        return Err(SessionError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| SessionError::TokenGeneration(e.to_string()))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, SessionError> {
    if secret.is_empty() {
        return Err(SessionError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| SessionError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

/// Raw session token from the request's `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().trim_matches('"').to_string())
        .filter(|token| !token.is_empty())
}

/// Verified claims from the session cookie. Says nothing about whether the
/// session is still live; that needs the store.
pub fn claims_from_headers(headers: &HeaderMap, secret: &str) -> Option<Claims> {
    let token = session_token(headers)?;
    match decode_token(&token, secret) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!("Ignoring session cookie: {}", e);
            None
        }
    }
}

fn base_cookie(value: String, security: &SecurityConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(security.require_https)
        .build()
}

/// Cookie establishing a session.
pub fn session_cookie(token: &str, security: &SecurityConfig) -> Cookie<'static> {
    let mut cookie = base_cookie(token.to_string(), security);
    cookie.set_max_age(cookie::time::Duration::seconds(security.session_lifetime().num_seconds()));
    cookie
}

/// Cookie that makes the browser drop the session.
pub fn expired_session_cookie(security: &SecurityConfig) -> Cookie<'static> {
    let mut cookie = base_cookie(String::new(), security);
    cookie.make_removal();
    cookie
}
