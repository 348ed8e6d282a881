use axum::response::{IntoResponse, Redirect, Response};

use crate::app::AppState;
use crate::auth::Session;
use crate::database::StoreError;
use crate::policy::{Action, RowFilter};

pub fn redirect(path: &str) -> Response {
    Redirect::to(path).into_response()
}

/// Ask the policy for `action`. A refusal becomes a redirect to `/`, which
/// shows the login form to anonymous callers.
pub fn authorize(state: &AppState, session: &Session, action: Action) -> Result<Option<RowFilter>, Response> {
    state.policy.decide(session, action).permit().map_err(|_| {
        tracing::debug!(
            user = session.username().unwrap_or("<anonymous>"),
            ?action,
            "request denied"
        );
        redirect("/")
    })
}

/// Log a store failure and produce the message embedded in the page.
pub fn database_error(context: &str, err: &StoreError) -> String {
    tracing::error!("{}: {}", context, err);
    format!("database error: {}", err)
}

pub fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok().filter(|id| *id > 0)
}

/// Blank means "not given"; anything else must be a non-negative integer.
pub fn parse_optional_int(raw: Option<&str>, field: &str) -> Result<Option<i32>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i32>()
            .ok()
            .filter(|v| *v >= 0)
            .map(Some)
            .ok_or_else(|| format!("{} must be a whole number", field)),
    }
}

pub fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
