use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::Session;
use crate::database::models::PokemonChanges;
use crate::error::AppError;
use crate::handlers::utils::{authorize, database_error, non_empty, parse_id, parse_optional_int, redirect};
use crate::policy::{Action, RowFilter};
use crate::views;

#[derive(Debug, Deserialize)]
pub struct EditPokemonForm {
    pub trainer: Option<String>,
    pub description: Option<String>,
    pub base_total: Option<String>,
}

/// GET /pokemon/edit/:id - a record the caller cannot see is treated as missing.
pub async fn edit_get(State(state): State<AppState>, session: Session, Path(raw_id): Path<String>) -> Response {
    let scope = match authorize(&state, &session, Action::ViewPokemon) {
        Ok(scope) => scope,
        Err(redirect) => return redirect,
    };
    let Some(id) = parse_id(&raw_id) else {
        return redirect("/");
    };

    match state.store.get_pokemon(id, scope.as_ref()).await {
        Ok(Some(pokemon)) => views::edit_pokemon_page(&session, &pokemon, None).into_response(),
        Ok(None) => redirect("/"),
        Err(e) => AppError::from(e).into_page(&session),
    }
}

/// POST /pokemon/edit/:id
///
/// The ownership filter is part of the UPDATE itself; zero affected rows means
/// the record is missing or not the caller's, and both end in a redirect.
pub async fn edit_post(
    State(state): State<AppState>,
    session: Session,
    Path(raw_id): Path<String>,
    Form(form): Form<EditPokemonForm>,
) -> Response {
    let scope = match authorize(&state, &session, Action::UpdatePokemon) {
        Ok(scope) => scope,
        Err(redirect) => return redirect,
    };
    let Some(id) = parse_id(&raw_id) else {
        return redirect("/");
    };
    let edit_form = format!("/pokemon/edit/{}", id);

    let base_total = match parse_optional_int(form.base_total.as_deref(), "base total") {
        Ok(value) => value,
        Err(message) => return rerender(&state, &session, id, scope.as_ref(), &message).await,
    };

    // Scoped sessions cannot hand their records to someone else
    let trainer = if scope.is_some() { None } else { non_empty(form.trainer) };
    if let Some(new_owner) = &trainer {
        match state.store.find_user(new_owner).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::warn!("Edit pokemon {} aborted: trainer '{}' does not exist", id, new_owner);
                return redirect(&edit_form);
            }
            Err(e) => {
                let message = database_error("trainer lookup failed", &e);
                return rerender(&state, &session, id, scope.as_ref(), &message).await;
            }
        }
    }

    let changes = PokemonChanges {
        description: non_empty(form.description),
        base_total,
        trainer,
    };

    match state.store.update_pokemon(id, changes, scope.as_ref()).await {
        Ok(0) => {
            tracing::warn!(
                "Edit pokemon {} by '{}' affected no rows",
                id,
                session.username().unwrap_or_default()
            );
            redirect("/")
        }
        Ok(_) => {
            tracing::info!("Updated pokemon {}", id);
            redirect("/")
        }
        Err(e) => {
            let message = database_error("updating pokemon failed", &e);
            rerender(&state, &session, id, scope.as_ref(), &message).await
        }
    }
}

async fn rerender(
    state: &AppState,
    session: &Session,
    id: i32,
    scope: Option<&RowFilter>,
    message: &str,
) -> Response {
    match state.store.get_pokemon(id, scope).await {
        Ok(Some(pokemon)) => views::edit_pokemon_page(session, &pokemon, Some(message)).into_response(),
        Ok(None) => redirect("/"),
        Err(e) => AppError::from(e).into_page(&session),
    }
}
