use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::Session;
use crate::database::models::NewPokemon;
use crate::handlers::utils::{authorize, database_error, non_empty, parse_optional_int, redirect};
use crate::names::title_case;
use crate::policy::{owner_for_create, Action};
use crate::views;

const ADD_FORM: &str = "/pokemon/add";

#[derive(Debug, Deserialize)]
pub struct AddPokemonForm {
    #[serde(default)]
    pub pokemon_name: String,
    pub trainer: Option<String>,
    pub description: Option<String>,
    pub base_total: Option<String>,
}

/// GET /pokemon/add
pub async fn add_get(State(state): State<AppState>, session: Session) -> Response {
    match authorize(&state, &session, Action::CreatePokemon) {
        Ok(_) => views::add_pokemon_page(&session, None).into_response(),
        Err(redirect) => redirect,
    }
}

/// POST /pokemon/add
///
/// The species name is resolved to its pokedex number before anything is
/// written; an unknown species or trainer sends the caller back to the form
/// with nothing inserted.
pub async fn add_post(State(state): State<AppState>, session: Session, Form(form): Form<AddPokemonForm>) -> Response {
    let scope = match authorize(&state, &session, Action::CreatePokemon) {
        Ok(scope) => scope,
        Err(redirect) => return redirect,
    };

    let base_total = match parse_optional_int(form.base_total.as_deref(), "base total") {
        Ok(value) => value,
        Err(message) => return views::add_pokemon_page(&session, Some(&message)).into_response(),
    };

    let species = title_case(&form.pokemon_name);
    if species.is_empty() {
        return redirect(ADD_FORM);
    }

    let entry = match state.store.search_pokedex(&species).await {
        Ok(entries) => entries.into_iter().next(),
        Err(e) => {
            let message = database_error("pokedex lookup failed", &e);
            return views::add_pokemon_page(&session, Some(&message)).into_response();
        }
    };
    let Some(entry) = entry else {
        tracing::warn!("Add pokemon aborted: no pokedex entry named '{}'", species);
        return redirect(ADD_FORM);
    };

    let Some(trainer) = owner_for_create(scope.as_ref(), form.trainer.as_deref(), &session) else {
        return redirect("/");
    };
    match state.store.find_user(&trainer).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!("Add pokemon aborted: trainer '{}' does not exist", trainer);
            return redirect(ADD_FORM);
        }
        Err(e) => {
            let message = database_error("trainer lookup failed", &e);
            return views::add_pokemon_page(&session, Some(&message)).into_response();
        }
    }

    let record = NewPokemon {
        pokedex_number: entry.pokedex_number,
        trainer,
        description: non_empty(form.description),
        base_total,
    };
    let trainer = record.trainer.clone();

    match state.store.insert_pokemon(record).await {
        Ok(id) => {
            tracing::info!("Added pokemon {} ({}) for trainer '{}'", id, entry.name, trainer);
            redirect("/")
        }
        Err(e) => {
            let message = database_error("inserting pokemon failed", &e);
            views::add_pokemon_page(&session, Some(&message)).into_response()
        }
    }
}
