use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::password::verify_password;
use crate::auth::{issue_token, new_session_id, session_cookie, Claims, Session};
use crate::database::models::NewSession;
use crate::error::AppError;
use crate::views;

const INVALID_LOGIN: &str = "Invalid login";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// GET /login - the form lives on `/`.
pub async fn login_get(session: Session) -> Response {
    if session.is_logged_in() {
        return Redirect::to("/").into_response();
    }
    views::login_page("").into_response()
}

/// POST /login - verify credentials and start a session.
///
/// Every failure, including a store error, re-renders the form with the same
/// message and leaves the caller logged out.
pub async fn login_post(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let username = form.username.trim();

    let user = match state.store.find_user(username).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            // Same bcrypt cost as a real user, so timing does not reveal which names exist.
            if let Err(e) = state.decoy_hash.verify(&form.password, state.config.security.bcrypt_cost).await {
                tracing::error!("Login error: {}", e);
            }
            tracing::warn!("Login failed: unknown user '{}'", username);
            return views::login_page(INVALID_LOGIN).into_response();
        }
        Err(e) => {
            tracing::error!("Login error: {}", e);
            return views::login_page(INVALID_LOGIN).into_response();
        }
    };

    match verify_password(&form.password, &user.password).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!("Login failed: wrong password for '{}'", user.username);
            return views::login_page(INVALID_LOGIN).into_response();
        }
        Err(e) => {
            tracing::error!("Login error: {}", e);
            return views::login_page(INVALID_LOGIN).into_response();
        }
    }

    let security = &state.config.security;
    let lifetime = security.session_lifetime();
    let session_id = new_session_id();
    let record = NewSession {
        id: session_id.clone(),
        username: user.username.clone(),
        expires_at: (chrono::Utc::now() + lifetime).timestamp(),
    };
    if let Err(e) = state.store.insert_session(record).await {
        tracing::error!("Login error: {}", e);
        return views::login_page(INVALID_LOGIN).into_response();
    }

    let claims = Claims::new(&user.username, &session_id, lifetime);
    let token = match issue_token(&claims, &security.session_secret) {
        Ok(token) => token,
        Err(e) => return AppError::from(e).into_response(),
    };

    tracing::info!("User '{}' logged in ({})", user.username, user.level.label());
    (
        [(header::SET_COOKIE, session_cookie(&token, security).to_string())],
        Redirect::to("/"),
    )
        .into_response()
}
