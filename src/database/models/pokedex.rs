use serde::Serialize;
use sqlx::FromRow;

/// Static reference row. Names are stored title-cased.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PokedexEntry {
    pub pokedex_number: i32,
    pub name: String,
    pub type_1: Option<String>,
    pub type_2: Option<String>,
}
