// Pokemon routes. Each one is row-scoped by the policy: regular users only
// ever see or touch records they own.
pub mod pokemon_add;
pub mod pokemon_delete;
pub mod pokemon_edit;

pub use pokemon_add::{add_get, add_post};
pub use pokemon_delete::delete_get;
pub use pokemon_edit::{edit_get, edit_post};
