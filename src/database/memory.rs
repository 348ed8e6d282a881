use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::models::{
    NewPokemon, NewSession, NewUser, PokedexEntry, PokemonChanges, PokemonListing, SessionRecord, User, UserChanges,
};
use super::store::Store;
use super::StoreError;
use crate::policy::RowFilter;

#[derive(Debug, Clone)]
struct PokemonRow {
    id: i32,
    pokedex_number: i32,
    trainer: String,
    description: Option<String>,
    base_total: Option<i32>,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    sessions: Vec<NewSession>,
    pokedex: Vec<PokedexEntry>,
    pokemon: Vec<PokemonRow>,
    next_id: i32,
}

impl Tables {
    fn listing(&self, row: &PokemonRow) -> Option<PokemonListing> {
        let entry = self.pokedex.iter().find(|e| e.pokedex_number == row.pokedex_number)?;
        Some(PokemonListing {
            id: row.id,
            pokedex_number: row.pokedex_number,
            name: entry.name.clone(),
            trainer: row.trainer.clone(),
            description: row.description.clone(),
            base_total: row.base_total,
        })
    }

    fn visible<'a>(&'a self, scope: Option<&'a RowFilter>) -> impl Iterator<Item = &'a PokemonRow> + 'a {
        self.pokemon
            .iter()
            .filter(move |row| scope.map_or(true, |f| f.matches(&row.trainer)))
    }
}

/// In-process store with the same semantics as [`super::PgStore`], used by
/// tests and local demos. `set_unavailable(true)` makes every call fail.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn add_pokedex_entry(&self, entry: PokedexEntry) {
        if let Ok(mut tables) = self.tables.write() {
            tables.pokedex.retain(|e| e.pokedex_number != entry.pokedex_number);
            tables.pokedex.push(entry);
        }
    }

    pub fn add_user(&self, user: User) {
        if let Ok(mut tables) = self.tables.write() {
            tables.users.retain(|u| u.username != user.username);
            tables.users.push(user);
        }
    }

    /// Seed a record directly, bypassing handler checks. Returns its id.
    pub fn add_pokemon(&self, record: NewPokemon) -> i32 {
        match self.tables.write() {
            Ok(mut tables) => Self::push_pokemon(&mut tables, record),
            Err(_) => 0,
        }
    }

    pub fn session_count(&self) -> usize {
        self.tables.read().map(|t| t.sessions.len()).unwrap_or(0)
    }

    pub fn pokemon_count(&self) -> usize {
        self.tables.read().map(|t| t.pokemon.len()).unwrap_or(0)
    }

    fn push_pokemon(tables: &mut Tables, record: NewPokemon) -> i32 {
        tables.next_id += 1;
        let id = tables.next_id;
        tables.pokemon.push(PokemonRow {
            id,
            pokedex_number: record.pokedex_number,
            trainer: record.trainer,
            description: record.description,
            base_total: record.base_total,
        });
        id
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.check_available()?;
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.check_available()?;
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users = self.read()?.users.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn insert_user(&self, user: NewUser) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!("user '{}' already exists", user.username)));
        }
        tables.users.push(User {
            username: user.username,
            password: user.password_hash,
            level: user.level,
        });
        Ok(())
    }

    async fn update_user(&self, username: &str, changes: UserChanges) -> Result<u64, StoreError> {
        if changes.is_empty() {
            return Ok(0);
        }
        let mut tables = self.write()?;
        let Some(user) = tables.users.iter_mut().find(|u| u.username == username) else {
            return Ok(0);
        };
        if let Some(hash) = changes.password_hash {
            user.password = hash;
        }
        if let Some(level) = changes.level {
            user.level = level;
        }
        Ok(1)
    }

    async fn delete_user(&self, username: &str) -> Result<u64, StoreError> {
        let mut tables = self.write()?;
        let before = tables.users.len();
        tables.users.retain(|u| u.username != username);
        tables.sessions.retain(|session| session.username != username);
        Ok((before - tables.users.len()) as u64)
    }

    async fn insert_session(&self, session: NewSession) -> Result<(), StoreError> {
        let now = chrono::Utc::now().timestamp();
        let mut tables = self.write()?;
        if !tables.users.iter().any(|u| u.username == session.username) {
            return Err(StoreError::Constraint(format!("user '{}' does not exist", session.username)));
        }
        tables.sessions.retain(|s| s.expires_at > now);
        if tables.sessions.iter().any(|s| s.id == session.id) {
            return Err(StoreError::Conflict(format!("session '{}' already exists", session.id)));
        }
        tables.sessions.push(session);
        Ok(())
    }

    async fn find_session(&self, id: &str) -> Result<Option<SessionRecord>, StoreError> {
        let tables = self.read()?;
        let Some(session) = tables.sessions.iter().find(|s| s.id == id) else {
            return Ok(None);
        };
        let record = tables
            .users
            .iter()
            .find(|u| u.username == session.username)
            .map(|user| SessionRecord {
                id: session.id.clone(),
                username: user.username.clone(),
                level: user.level,
                expires_at: session.expires_at,
            });
        Ok(record)
    }

    async fn delete_session(&self, id: &str) -> Result<u64, StoreError> {
        let mut tables = self.write()?;
        let before = tables.sessions.len();
        tables.sessions.retain(|s| s.id != id);
        Ok((before - tables.sessions.len()) as u64)
    }

    async fn delete_sessions_for(&self, username: &str) -> Result<u64, StoreError> {
        let mut tables = self.write()?;
        let before = tables.sessions.len();
        tables.sessions.retain(|s| s.username != username);
        Ok((before - tables.sessions.len()) as u64)
    }

    async fn search_pokedex(&self, name: &str) -> Result<Vec<PokedexEntry>, StoreError> {
        let tables = self.read()?;
        let mut entries: Vec<PokedexEntry> = tables.pokedex.iter().filter(|e| e.name == name).cloned().collect();
        entries.sort_by_key(|e| e.pokedex_number);
        Ok(entries)
    }

    async fn list_pokemon(&self, scope: Option<&RowFilter>) -> Result<Vec<PokemonListing>, StoreError> {
        let tables = self.read()?;
        let mut rows: Vec<PokemonListing> = tables.visible(scope).filter_map(|row| tables.listing(row)).collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn search_pokemon(&self, name: &str, scope: Option<&RowFilter>) -> Result<Vec<PokemonListing>, StoreError> {
        let tables = self.read()?;
        let mut rows: Vec<PokemonListing> = tables
            .visible(scope)
            .filter_map(|row| tables.listing(row))
            .filter(|listing| listing.name == name)
            .collect();
        rows.sort_by_key(|l| l.id);
        Ok(rows)
    }

    async fn get_pokemon(&self, id: i32, scope: Option<&RowFilter>) -> Result<Option<PokemonListing>, StoreError> {
        let tables = self.read()?;
        let found = tables.visible(scope).find(|row| row.id == id);
        Ok(found.and_then(|row| tables.listing(row)))
    }

    async fn count_pokemon_owned_by(&self, trainer: &str) -> Result<i64, StoreError> {
        let tables = self.read()?;
        Ok(tables.pokemon.iter().filter(|row| row.trainer == trainer).count() as i64)
    }

    async fn insert_pokemon(&self, record: NewPokemon) -> Result<i32, StoreError> {
        let mut tables = self.write()?;
        if !tables.pokedex.iter().any(|e| e.pokedex_number == record.pokedex_number) {
            return Err(StoreError::Constraint(format!(
                "pokedex number {} does not exist",
                record.pokedex_number
            )));
        }
        Ok(Self::push_pokemon(&mut tables, record))
    }

    async fn update_pokemon(
        &self,
        id: i32,
        changes: PokemonChanges,
        scope: Option<&RowFilter>,
    ) -> Result<u64, StoreError> {
        let mut tables = self.write()?;
        let Some(row) = tables
            .pokemon
            .iter_mut()
            .find(|row| row.id == id && scope.map_or(true, |f| f.matches(&row.trainer)))
        else {
            return Ok(0);
        };
        row.description = changes.description;
        row.base_total = changes.base_total;
        if let Some(trainer) = changes.trainer {
            row.trainer = trainer;
        }
        Ok(1)
    }

    async fn delete_pokemon(&self, id: i32, scope: Option<&RowFilter>) -> Result<u64, StoreError> {
        let mut tables = self.write()?;
        let before = tables.pokemon.len();
        tables
            .pokemon
            .retain(|row| !(row.id == id && scope.map_or(true, |f| f.matches(&row.trainer))));
        Ok((before - tables.pokemon.len()) as u64)
    }
}
