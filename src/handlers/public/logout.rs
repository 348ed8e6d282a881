use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};

use crate::app::AppState;
use crate::auth::{expired_session_cookie, Session};
use crate::error::AppError;

/// GET /logout - revoke the session record, drop the cookie and go home.
///
/// The cookie is cleared even when the store cannot be reached.
pub async fn logout(State(state): State<AppState>, session: Result<Session, AppError>) -> Response {
    let removal = [(
        header::SET_COOKIE,
        expired_session_cookie(&state.config.security).to_string(),
    )];

    let session = match session {
        Ok(session) => session,
        Err(e) => return (removal, e.into_response()).into_response(),
    };

    if let Session::Authenticated { id, username, .. } = &session {
        if let Err(e) = state.store.delete_session(id).await {
            return (removal, AppError::from(e).into_page(&session)).into_response();
        }
        tracing::info!("User '{}' logged out", username);
    }

    (removal, Redirect::to("/")).into_response()
}
