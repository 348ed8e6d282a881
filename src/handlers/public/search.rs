use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::Session;
use crate::handlers::utils::{authorize, database_error};
use crate::names::title_case;
use crate::policy::Action;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub pokemon_name: String,
}

/// POST /searchPokedex - exact, case-normalized lookup in the reference table.
pub async fn search_pokedex(State(state): State<AppState>, session: Session, Form(form): Form<SearchForm>) -> Response {
    if let Err(redirect) = authorize(&state, &session, Action::SearchPokedex) {
        return redirect;
    }

    let name = title_case(&form.pokemon_name);
    if name.is_empty() {
        return views::pokedex_results_page(&session, &name, &[], None).into_response();
    }

    match state.store.search_pokedex(&name).await {
        Ok(entries) => views::pokedex_results_page(&session, &name, &entries, None).into_response(),
        Err(e) => {
            let message = database_error("pokedex search failed", &e);
            views::pokedex_results_page(&session, &name, &[], Some(&message)).into_response()
        }
    }
}

/// POST /searchPokemon - the caller's visible records of one species.
pub async fn search_pokemon(State(state): State<AppState>, session: Session, Form(form): Form<SearchForm>) -> Response {
    let scope = match authorize(&state, &session, Action::SearchPokemon) {
        Ok(scope) => scope,
        Err(redirect) => return redirect,
    };

    let name = title_case(&form.pokemon_name);
    if name.is_empty() {
        return views::pokemon_results_page(&session, &name, &[], None).into_response();
    }

    match state.store.search_pokemon(&name, scope.as_ref()).await {
        Ok(pokemon) => views::pokemon_results_page(&session, &name, &pokemon, None).into_response(),
        Err(e) => {
            let message = database_error("pokemon search failed", &e);
            views::pokemon_results_page(&session, &name, &[], Some(&message)).into_response()
        }
    }
}
