#![allow(dead_code)]

use std::sync::{Arc, Once};

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use pokemon_trainers::auth::password::hash_password;
use pokemon_trainers::auth::{issue_token, new_session_id, Claims, SESSION_COOKIE};
use pokemon_trainers::config::{AppConfig, UserAdminAccess};
use pokemon_trainers::database::models::{Level, NewPokemon, NewSession, PokedexEntry, User};
use pokemon_trainers::database::{MemoryStore, Store};
use pokemon_trainers::{router, AppState};

pub const PASSWORD: &str = "pallet-town";

static TRACING: Once = Once::new();

/// Router wired to an in-memory store seeded with:
/// - users `oak` (manager), `ash` and `misty` (regular), all with [`PASSWORD`]
/// - pokedex entries Bulbasaur (#1), Pikachu (#25), Mr. Mime (#122)
/// - pokemon 1 Pikachu/ash, 2 Bulbasaur/misty, 3 Bulbasaur/ash
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        Self::with_user_admin(UserAdminAccess::ManagerOnly).await
    }

    pub async fn with_user_admin(user_admin: UserAdminAccess) -> Result<Self> {
        TRACING.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        });

        let mut config = AppConfig::development();
        config.security.session_secret = "integration-test-secret".to_string();
        config.security.bcrypt_cost = 4;
        config.security.user_admin = user_admin;

        let store = Arc::new(MemoryStore::new());
        let password = hash_password(PASSWORD, 4).await?;
        for (username, level) in [("oak", Level::Manager), ("ash", Level::User), ("misty", Level::User)] {
            store.add_user(User {
                username: username.to_string(),
                password: password.clone(),
                level,
            });
        }

        for (number, name, type_1, type_2) in [
            (1, "Bulbasaur", "Grass", Some("Poison")),
            (25, "Pikachu", "Electric", None),
            (122, "Mr. Mime", "Psychic", Some("Fairy")),
        ] {
            store.add_pokedex_entry(PokedexEntry {
                pokedex_number: number,
                name: name.to_string(),
                type_1: Some(type_1.to_string()),
                type_2: type_2.map(str::to_string),
            });
        }

        for (number, trainer, description) in [(25, "ash", "sparky"), (1, "misty", "leafy"), (1, "ash", "sleepy")] {
            store.add_pokemon(NewPokemon {
                pokedex_number: number,
                trainer: trainer.to_string(),
                description: Some(description.to_string()),
                base_total: Some(320),
            });
        }

        let state = AppState::new(store.clone(), config.clone());
        Ok(Self { router: router(state), store, config })
    }

    /// Cookie header value for a session created directly in the store,
    /// skipping `/login`. The level comes from the seeded user row.
    pub async fn cookie_for(&self, username: &str) -> Result<String> {
        let lifetime = chrono::Duration::hours(1);
        let id = new_session_id();
        self.store
            .insert_session(NewSession {
                id: id.clone(),
                username: username.to_string(),
                expires_at: (chrono::Utc::now() + lifetime).timestamp(),
            })
            .await?;
        let token = issue_token(&Claims::new(username, &id, lifetime), &self.config.security.session_secret)?;
        Ok(format!("{}={}", SESSION_COOKIE, token))
    }

    pub async fn manager(&self) -> Result<String> {
        self.cookie_for("oak").await
    }

    pub async fn user(&self, username: &str) -> Result<String> {
        self.cookie_for(username).await
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Result<Response> {
        let mut request = Request::builder().method("GET").uri(path);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty())?).await
    }

    /// POST an urlencoded form. Pairs are encoded as given, so keep values
    /// free of `&` and `=`.
    pub async fn post_form(&self, path: &str, cookie: Option<&str>, fields: &[(&str, &str)]) -> Result<Response> {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v.replace(' ', "+")))
            .collect::<Vec<_>>()
            .join("&");

        let mut request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body))?).await
    }

    async fn send(&self, request: Request<Body>) -> Result<Response> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .context("router call failed")
    }
}

pub async fn body_text(response: Response) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub fn assert_redirect(response: &Response, to: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER, "expected a redirect to {}", to);
    assert_eq!(location(response), Some(to));
}

/// `name=value` part of the first `Set-Cookie` header.
pub fn set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}
