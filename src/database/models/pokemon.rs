use serde::Serialize;
use sqlx::FromRow;

/// A `pokemon` row joined with its species name.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct PokemonListing {
    pub id: i32,
    pub pokedex_number: i32,
    pub name: String,
    pub trainer: String,
    pub description: Option<String>,
    pub base_total: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewPokemon {
    pub pokedex_number: i32,
    pub trainer: String,
    pub description: Option<String>,
    pub base_total: Option<i32>,
}

/// Replacement values for an edit. `trainer: None` keeps the current owner.
#[derive(Debug, Clone, Default)]
pub struct PokemonChanges {
    pub description: Option<String>,
    pub base_total: Option<i32>,
    pub trainer: Option<String>,
}
