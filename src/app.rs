use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::password::DecoyHash;
use crate::config::AppConfig;
use crate::database::Store;
use crate::handlers::{elevated, protected, public};
use crate::policy::Policy;

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub policy: Policy,
    pub decoy_hash: DecoyHash,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        let policy = Policy::new(config.security.user_admin);
        Self {
            store,
            config: Arc::new(config),
            policy,
            decoy_hash: DecoyHash::default(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(pokemon_routes())
        .merge(user_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::index))
        .route("/health", get(public::health))
        .route("/login", get(public::login_get).post(public::login_post))
        .route("/logout", get(public::logout))
        .route("/searchPokedex", post(public::search_pokedex))
        .route("/searchPokemon", post(public::search_pokemon))
}

fn pokemon_routes() -> Router<AppState> {
    Router::new()
        .route("/pokemon/add", get(protected::add_get).post(protected::add_post))
        .route("/pokemon/edit/:id", get(protected::edit_get).post(protected::edit_post))
        .route("/pokemon/delete/:id", get(protected::delete_get))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(elevated::users_get).post(elevated::users_post))
        .route("/users/edit/:username", get(elevated::user_edit_get).post(elevated::user_edit_post))
        .route("/users/delete/:username", get(elevated::user_delete_get))
}
