// User administration. Whether regular users may reach these routes is a
// configuration choice (`USER_ADMIN_ACCESS`); anonymous callers never can.
pub mod user_delete;
pub mod user_edit;
pub mod users;

pub use user_delete::user_delete_get;
pub use user_edit::{user_edit_get, user_edit_post};
pub use users::{users_get, users_post};

use axum::response::{IntoResponse, Response};

use crate::app::AppState;
use crate::auth::Session;
use crate::error::AppError;
use crate::views;

/// Re-render the user list with `message`, falling back to the generic error
/// page when the list itself cannot be loaded.
pub(crate) async fn users_page_with_error(state: &AppState, session: &Session, message: &str) -> Response {
    match state.store.list_users().await {
        Ok(users) => views::users_page(session, &users, Some(message)).into_response(),
        Err(e) => AppError::from(e).into_page(&session),
    }
}
