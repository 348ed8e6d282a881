use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{Executor, PgPool};
use tracing::info;

use super::models::{
    NewPokemon, NewSession, NewUser, PokedexEntry, PokemonChanges, PokemonListing, SessionRecord, User, UserChanges,
};
use super::query_builder::{execute, fetch_all, fetch_optional, fetch_scalar_i64};
use super::store::Store;
use super::StoreError;
use crate::config::AppConfig;
use crate::filter::{Filter, FilterError};
use crate::policy::RowFilter;

const LISTING_COLUMNS: [&str; 6] = [
    "p.id",
    "p.pokedex_number",
    "pd.name",
    "p.trainer",
    "p.description",
    "p.base_total",
];

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool from the database section of the config.
    pub async fn connect(config: &AppConfig) -> Result<Self, StoreError> {
        let db = &config.database;
        let options = PgConnectOptions::new()
            .host(&db.host)
            .port(db.port)
            .username(&db.user)
            .password(&db.password)
            .database(&db.name)
            .ssl_mode(if db.ssl { PgSslMode::Require } else { PgSslMode::Disable });

        let pool = PgPoolOptions::new()
            .max_connections(db.max_connections)
            .acquire_timeout(config.connection_timeout())
            .connect_with(options)
            .await?;

        info!("Connected to database {} on {}:{}", db.name, db.host, db.port);
        Ok(Self::new(pool))
    }

    /// Apply the bundled DDL. Statements are idempotent.
    pub async fn apply_schema(&self) -> Result<(), StoreError> {
        self.pool.execute(super::SCHEMA_SQL).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    fn listing_filter(scope: Option<&RowFilter>) -> Result<Filter, FilterError> {
        let filter = Filter::new("pokemon")?
            .alias("p")?
            .join("pokedex", "pd", "p.pokedex_number", "pd.pokedex_number")?
            .select(&LISTING_COLUMNS)?;
        scoped(filter, scope, "p.trainer")
    }
}

fn scoped(filter: Filter, scope: Option<&RowFilter>, column: &str) -> Result<Filter, FilterError> {
    match scope {
        Some(row_filter) => filter.where_eq(column, row_filter.trainer.as_str()),
        None => Ok(filter),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let sql = Filter::new("users")?
            .select(&["username", "password", "level"])?
            .where_eq("username", username)?
            .limit(1)?
            .to_sql();
        fetch_optional(&self.pool, &sql).await
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let sql = Filter::new("users")?
            .select(&["username", "password", "level"])?
            .order("username")?
            .to_sql();
        fetch_all(&self.pool, &sql).await
    }

    async fn insert_user(&self, user: NewUser) -> Result<(), StoreError> {
        let sql = Filter::new("users")?.to_insert_sql(
            &[
                ("username", json!(user.username)),
                ("password", json!(user.password_hash)),
                ("level", json!(user.level.as_str())),
            ],
            None,
        )?;
        execute(&self.pool, &sql).await?;
        Ok(())
    }

    async fn update_user(&self, username: &str, changes: UserChanges) -> Result<u64, StoreError> {
        let mut assignments: Vec<(&str, Value)> = Vec::new();
        if let Some(hash) = changes.password_hash {
            assignments.push(("password", json!(hash)));
        }
        if let Some(level) = changes.level {
            assignments.push(("level", json!(level.as_str())));
        }
        if assignments.is_empty() {
            return Ok(0);
        }
        let sql = Filter::new("users")?
            .where_eq("username", username)?
            .to_update_sql(&assignments)?;
        execute(&self.pool, &sql).await
    }

    async fn delete_user(&self, username: &str) -> Result<u64, StoreError> {
        let sql = Filter::new("users")?.where_eq("username", username)?.to_delete_sql()?;
        execute(&self.pool, &sql).await
    }

    async fn insert_session(&self, session: NewSession) -> Result<(), StoreError> {
        let purged = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(chrono::Utc::now().timestamp())
            .execute(&self.pool)
            .await?
            .rows_affected();
        if purged > 0 {
            tracing::debug!("Purged {} expired sessions", purged);
        }

        let sql = Filter::new("sessions")?.to_insert_sql(
            &[
                ("id", json!(session.id)),
                ("username", json!(session.username)),
                ("expires_at", json!(session.expires_at)),
            ],
            None,
        )?;
        execute(&self.pool, &sql).await?;
        Ok(())
    }

    async fn find_session(&self, id: &str) -> Result<Option<SessionRecord>, StoreError> {
        let sql = Filter::new("sessions")?
            .alias("s")?
            .join("users", "u", "s.username", "u.username")?
            .select(&["s.id", "s.username", "u.level", "s.expires_at"])?
            .where_eq("s.id", id)?
            .limit(1)?
            .to_sql();
        fetch_optional(&self.pool, &sql).await
    }

    async fn delete_session(&self, id: &str) -> Result<u64, StoreError> {
        let sql = Filter::new("sessions")?.where_eq("id", id)?.to_delete_sql()?;
        execute(&self.pool, &sql).await
    }

    async fn delete_sessions_for(&self, username: &str) -> Result<u64, StoreError> {
        let sql = Filter::new("sessions")?.where_eq("username", username)?.to_delete_sql()?;
        execute(&self.pool, &sql).await
    }

    async fn search_pokedex(&self, name: &str) -> Result<Vec<PokedexEntry>, StoreError> {
        let sql = Filter::new("pokedex")?
            .select(&["pokedex_number", "name", "type_1", "type_2"])?
            .where_eq("name", name)?
            .order("pokedex_number")?
            .to_sql();
        fetch_all(&self.pool, &sql).await
    }

    async fn list_pokemon(&self, scope: Option<&RowFilter>) -> Result<Vec<PokemonListing>, StoreError> {
        let sql = Self::listing_filter(scope)?.order("pd.name, p.id")?.to_sql();
        fetch_all(&self.pool, &sql).await
    }

    async fn search_pokemon(&self, name: &str, scope: Option<&RowFilter>) -> Result<Vec<PokemonListing>, StoreError> {
        let sql = Self::listing_filter(scope)?
            .where_eq("pd.name", name)?
            .order("p.id")?
            .to_sql();
        fetch_all(&self.pool, &sql).await
    }

    async fn get_pokemon(&self, id: i32, scope: Option<&RowFilter>) -> Result<Option<PokemonListing>, StoreError> {
        let sql = Self::listing_filter(scope)?.where_eq("p.id", id)?.limit(1)?.to_sql();
        fetch_optional(&self.pool, &sql).await
    }

    async fn count_pokemon_owned_by(&self, trainer: &str) -> Result<i64, StoreError> {
        let sql = Filter::new("pokemon")?.where_eq("trainer", trainer)?.to_count_sql();
        fetch_scalar_i64(&self.pool, &sql, "count").await
    }

    async fn insert_pokemon(&self, record: NewPokemon) -> Result<i32, StoreError> {
        let sql = Filter::new("pokemon")?.to_insert_sql(
            &[
                ("pokedex_number", json!(record.pokedex_number)),
                ("trainer", json!(record.trainer)),
                ("description", json!(record.description)),
                ("base_total", json!(record.base_total)),
            ],
            Some("id"),
        )?;
        let id = fetch_scalar_i64(&self.pool, &sql, "id").await?;
        i32::try_from(id).map_err(|_| StoreError::Decode(format!("pokemon id {} out of range", id)))
    }

    async fn update_pokemon(
        &self,
        id: i32,
        changes: PokemonChanges,
        scope: Option<&RowFilter>,
    ) -> Result<u64, StoreError> {
        let mut assignments: Vec<(&str, Value)> = vec![
            ("description", json!(changes.description)),
            ("base_total", json!(changes.base_total)),
        ];
        if let Some(trainer) = changes.trainer {
            assignments.push(("trainer", json!(trainer)));
        }
        let filter = scoped(Filter::new("pokemon")?.where_eq("id", id)?, scope, "trainer")?;
        let sql = filter.to_update_sql(&assignments)?;
        execute(&self.pool, &sql).await
    }

    async fn delete_pokemon(&self, id: i32, scope: Option<&RowFilter>) -> Result<u64, StoreError> {
        let filter = scoped(Filter::new("pokemon")?.where_eq("id", id)?, scope, "trainer")?;
        execute(&self.pool, &filter.to_delete_sql()?).await
    }
}
