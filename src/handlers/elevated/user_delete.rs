use axum::extract::{Path, State};
use axum::response::Response;

use super::users_page_with_error;
use crate::app::AppState;
use crate::auth::Session;
use crate::handlers::utils::{authorize, database_error, redirect};
use crate::policy::Action;

/// GET /users/delete/:username
///
/// Refused while the user still owns pokemon (records must always point at an
/// existing trainer) and for the caller's own account.
pub async fn user_delete_get(
    State(state): State<AppState>,
    session: Session,
    Path(username): Path<String>,
) -> Response {
    if let Err(redirect) = authorize(&state, &session, Action::ManageUsers) {
        return redirect;
    }

    if session.username() == Some(username.as_str()) {
        return users_page_with_error(&state, &session, "you cannot delete your own account").await;
    }

    match state.store.count_pokemon_owned_by(&username).await {
        Ok(0) => {}
        Ok(owned) => {
            let message = format!("user '{}' still owns {} pokemon", username, owned);
            return users_page_with_error(&state, &session, &message).await;
        }
        Err(e) => {
            let message = database_error("counting owned pokemon failed", &e);
            return users_page_with_error(&state, &session, &message).await;
        }
    }

    match state.store.delete_user(&username).await {
        Ok(0) => redirect("/users"),
        Ok(_) => {
            tracing::info!("User '{}' deleted by '{}'", username, session.username().unwrap_or_default());
            redirect("/users")
        }
        Err(e) => {
            let message = database_error("deleting user failed", &e);
            users_page_with_error(&state, &session, &message).await
        }
    }
}
