use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::password::hash_password;
use crate::auth::Session;
use crate::database::models::{Level, User, UserChanges};
use crate::error::AppError;
use crate::handlers::utils::{authorize, database_error, redirect};
use crate::policy::Action;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct EditUserForm {
    pub password: Option<String>,
    pub level: Option<String>,
}

/// GET /users/edit/:username
pub async fn user_edit_get(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
) -> Response {
    if let Err(redirect) = authorize(&state, &session, Action::ManageUsers) {
        return redirect;
    }

    match state.store.find_user(&username).await {
        Ok(Some(user)) => views::edit_user_page(&session, &user, None).into_response(),
        Ok(None) => redirect("/users"),
        Err(e) => AppError::from(e).into_page(&session),
    }
}

/// POST /users/edit/:username - change password (when given) and level.
pub async fn user_edit_post(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
    Form(form): Form<EditUserForm>,
) -> Response {
    if let Err(redirect) = authorize(&state, &session, Action::ManageUsers) {
        return redirect;
    }

    let user = match state.store.find_user(&username).await {
        Ok(Some(user)) => user,
        Ok(None) => return redirect("/users"),
        Err(e) => return AppError::from(e).into_page(&session),
    };

    let level = match form.level.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        None => None,
        Some(raw) => match raw.parse::<Level>() {
            Ok(level) => Some(level),
            Err(e) => return rerender(&session, &user, &e.to_string()),
        },
    };

    let password_hash = match form.password.as_deref().filter(|p| !p.is_empty()) {
        None => None,
        Some(password) => match hash_password(password, state.config.security.bcrypt_cost).await {
            Ok(hash) => Some(hash),
            Err(e) => return AppError::from(e).into_page(&session),
        },
    };

    let password_changed = password_hash.is_some();
    let changes = UserChanges { password_hash, level };
    if changes.is_empty() {
        return redirect("/users");
    }

    match state.store.update_user(&username, changes).await {
        Ok(0) => redirect("/users"),
        Ok(_) => {
            tracing::info!("User '{}' updated by '{}'", username, session.username().unwrap_or_default());
            // Level changes apply through the live session lookup; a new password ends every session.
            if password_changed {
                match state.store.delete_sessions_for(&username).await {
                    Ok(n) => tracing::debug!("Revoked {} session(s) for '{}'", n, username),
                    Err(e) => tracing::error!("Revoking sessions for '{}' failed: {}", username, e),
                }
            }
            redirect("/users")
        }
        Err(e) => {
            let message = database_error("updating user failed", &e);
            rerender(&session, &user, &message)
        }
    }
}

fn rerender(session: &Session, user: &User, message: &str) -> Response {
    views::edit_user_page(session, user, Some(message)).into_response()
}
