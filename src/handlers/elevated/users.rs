use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use super::users_page_with_error;
use crate::app::AppState;
use crate::auth::password::hash_password;
use crate::auth::Session;
use crate::database::models::{validate_username, Level, NewUser};
use crate::database::StoreError;
use crate::error::AppError;
use crate::handlers::utils::{authorize, database_error, redirect};
use crate::policy::Action;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct NewUserForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub level: Option<String>,
}

/// GET /users
pub async fn users_get(State(state): State<AppState>, session: Session) -> Response {
    if let Err(redirect) = authorize(&state, &session, Action::ManageUsers) {
        return redirect;
    }

    match state.store.list_users().await {
        Ok(users) => views::users_page(&session, &users, None).into_response(),
        Err(e) => {
            let message = database_error("listing users failed", &e);
            views::users_page(&session, &[], Some(&message)).into_response()
        }
    }
}

/// POST /users - create a user with a freshly hashed password.
pub async fn users_post(State(state): State<AppState>, session: Session, Form(form): Form<NewUserForm>) -> Response {
    if let Err(redirect) = authorize(&state, &session, Action::ManageUsers) {
        return redirect;
    }

    let username = form.username.trim().to_string();
    if let Err(message) = validate_username(&username) {
        return users_page_with_error(&state, &session, &message).await;
    }
    if form.password.is_empty() {
        return users_page_with_error(&state, &session, "password must not be empty").await;
    }
    let level = match form.level.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        None => Level::User,
        Some(raw) => match raw.parse::<Level>() {
            Ok(level) => level,
            Err(e) => return users_page_with_error(&state, &session, &e.to_string()).await,
        },
    };

    let password_hash = match hash_password(&form.password, state.config.security.bcrypt_cost).await {
        Ok(hash) => hash,
        Err(e) => return AppError::from(e).into_page(&session),
    };

    let user = NewUser { username, password_hash, level };
    let created = user.username.clone();
    match state.store.insert_user(user).await {
        Ok(()) => {
            tracing::info!(
                "User '{}' created by '{}' with level {}",
                created,
                session.username().unwrap_or_default(),
                level
            );
            redirect("/users")
        }
        Err(StoreError::Conflict(_)) => {
            users_page_with_error(&state, &session, &format!("user '{}' already exists", created)).await
        }
        Err(e) => {
            let message = database_error("creating user failed", &e);
            users_page_with_error(&state, &session, &message).await
        }
    }
}
