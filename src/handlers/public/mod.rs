// Routes reachable without a session. `/` and `/searchPokemon` still consult
// the policy and degrade to the login form or a redirect.
pub mod health;
pub mod home;
pub mod login;
pub mod logout;
pub mod search;

pub use health::health;
pub use home::index;
pub use login::{login_get, login_post};
pub use logout::logout;
pub use search::{search_pokedex, search_pokemon};
