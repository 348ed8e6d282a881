use async_trait::async_trait;

use super::models::{
    NewPokemon, NewSession, NewUser, PokedexEntry, PokemonChanges, PokemonListing, SessionRecord, User, UserChanges,
};
use super::StoreError;
use crate::policy::RowFilter;

/// Data access used by the request handlers.
///
/// Every pokemon operation takes the caller's row scope; `None` means
/// unrestricted. Mutations report affected rows so that a scoped miss can be
/// treated the same as a missing record.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn insert_user(&self, user: NewUser) -> Result<(), StoreError>;
    async fn update_user(&self, username: &str, changes: UserChanges) -> Result<u64, StoreError>;
    /// Also removes the user's sessions.
    async fn delete_user(&self, username: &str) -> Result<u64, StoreError>;

    /// Record a login. Expired sessions may be purged on the way.
    async fn insert_session(&self, session: NewSession) -> Result<(), StoreError>;
    /// The session joined with its user; `None` once the session or the user
    /// is gone. Expiry is left to the caller.
    async fn find_session(&self, id: &str) -> Result<Option<SessionRecord>, StoreError>;
    async fn delete_session(&self, id: &str) -> Result<u64, StoreError>;
    async fn delete_sessions_for(&self, username: &str) -> Result<u64, StoreError>;

    /// Exact match on the (already normalized) species name.
    async fn search_pokedex(&self, name: &str) -> Result<Vec<PokedexEntry>, StoreError>;

    /// All visible records ordered by species name.
    async fn list_pokemon(&self, scope: Option<&RowFilter>) -> Result<Vec<PokemonListing>, StoreError>;
    async fn search_pokemon(&self, name: &str, scope: Option<&RowFilter>) -> Result<Vec<PokemonListing>, StoreError>;
    async fn get_pokemon(&self, id: i32, scope: Option<&RowFilter>) -> Result<Option<PokemonListing>, StoreError>;
    async fn count_pokemon_owned_by(&self, trainer: &str) -> Result<i64, StoreError>;
    async fn insert_pokemon(&self, record: NewPokemon) -> Result<i32, StoreError>;
    async fn update_pokemon(
        &self,
        id: i32,
        changes: PokemonChanges,
        scope: Option<&RowFilter>,
    ) -> Result<u64, StoreError>;
    async fn delete_pokemon(&self, id: i32, scope: Option<&RowFilter>) -> Result<u64, StoreError>;
}
