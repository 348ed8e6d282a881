use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::app::AppState;
use crate::auth::Session;
use crate::handlers::utils::database_error;
use crate::policy::Action;
use crate::views;

/// GET / - the caller's pokemon, or the login form when not logged in.
pub async fn index(State(state): State<AppState>, session: Session) -> Response {
    let Ok(scope) = state.policy.decide(&session, Action::ListPokemon).permit() else {
        return views::login_page("").into_response();
    };

    match state.store.list_pokemon(scope.as_ref()).await {
        Ok(pokemon) => {
            tracing::info!("successfully retrieved {} pokemon from database", pokemon.len());
            views::index_page(&session, &pokemon, None).into_response()
        }
        Err(e) => {
            let message = database_error("listing pokemon failed", &e);
            views::index_page(&session, &[], Some(&message)).into_response()
        }
    }
}
