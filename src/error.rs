// Request-level error type. Handlers that can re-render their own page catch
// errors themselves; anything else falls through to this generic page.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::auth::{Session, SessionError};
use crate::database::StoreError;
use crate::views;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AppError {
    /// Message safe to show in a page.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Store(e) => format!("database error: {}", e),
            AppError::Password(PasswordError::Empty) => "password must not be empty".to_string(),
            AppError::Password(_) => "could not process the password".to_string(),
            AppError::Session(_) => "could not start a session".to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Password(PasswordError::Empty) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl AppError {
    /// Error page with the caller's navigation.
    pub fn into_page(self, session: &Session) -> Response {
        tracing::error!("Request failed: {}", self);
        let page = views::error_page(&self.user_message(), session);
        (self.status_code(), page).into_response()
    }
}

/// Used where no session is known, e.g. when resolving the session itself failed.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_page(&Session::Anonymous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_render_database_message() {
        let err = AppError::from(StoreError::Unavailable("connection refused".into()));
        assert_eq!(err.user_message(), "database error: Database unavailable: connection refused");
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn error_page_keeps_the_callers_navigation() {
        use crate::database::models::Level;

        let session = Session::Authenticated {
            id: "sid".into(),
            username: "oak".into(),
            level: Level::Manager,
        };
        let response = AppError::from(StoreError::Unavailable("down".into())).into_page(&session);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("signed in as oak"));
        assert!(html.contains("database error"));
    }

    #[test]
    fn password_errors_hide_details() {
        let err = AppError::from(PasswordError::Hashing("cost out of range".into()));
        assert_eq!(err.user_message(), "could not process the password");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
