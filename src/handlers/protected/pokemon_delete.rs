use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use crate::app::AppState;
use crate::auth::Session;
use crate::error::AppError;
use crate::handlers::utils::{authorize, parse_id, redirect};
use crate::policy::Action;

/// GET /pokemon/delete/:id - scoped delete; a miss is silent.
pub async fn delete_get(State(state): State<AppState>, session: Session, Path(raw_id): Path<String>) -> Response {
    let scope = match authorize(&state, &session, Action::DeletePokemon) {
        Ok(scope) => scope,
        Err(redirect) => return redirect,
    };
    let Some(id) = parse_id(&raw_id) else {
        return redirect("/");
    };

    match state.store.delete_pokemon(id, scope.as_ref()).await {
        Ok(0) => {
            tracing::warn!(
                "Delete pokemon {} by '{}' affected no rows",
                id,
                session.username().unwrap_or_default()
            );
            redirect("/")
        }
        Ok(_) => {
            tracing::info!("Deleted pokemon {}", id);
            redirect("/")
        }
        Err(e) => AppError::from(e).into_page(&session),
    }
}
