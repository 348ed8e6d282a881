pub mod pokedex;
pub mod pokemon;
pub mod session;
pub mod user;

pub use pokedex::PokedexEntry;
pub use pokemon::{NewPokemon, PokemonChanges, PokemonListing};
pub use session::{NewSession, SessionRecord};
pub use user::{validate_username, Level, NewUser, UnknownLevel, User, UserChanges};
