use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::app::AppState;
use crate::auth::{claims_from_headers, Session};
use crate::error::AppError;

/// Resolves the caller's session: a verified cookie whose session record
/// still exists, belongs to the token's subject and has not expired. The
/// level comes from the user row, not the token.
///
/// Only a failing store rejects the request; every other miss is
/// [`Session::Anonymous`].
#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(claims) = claims_from_headers(&parts.headers, &state.config.security.session_secret) else {
            return Ok(Session::Anonymous);
        };

        let now = chrono::Utc::now().timestamp();
        match state.store.find_session(&claims.sid).await? {
            Some(record) if record.username == claims.sub && !record.is_expired(now) => {
                tracing::trace!(username = %record.username, level = record.level.as_str(), "session resolved");
                Ok(Session::Authenticated {
                    id: record.id,
                    username: record.username,
                    level: record.level,
                })
            }
            _ => {
                tracing::debug!("Session {} for '{}' is no longer live", claims.sid, claims.sub);
                Ok(Session::Anonymous)
            }
        }
    }
}
