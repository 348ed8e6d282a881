// Handlers are grouped by who may reach them:
// public (no login), protected (logged in, row-scoped pokemon routes) and
// elevated (user administration).
pub mod elevated;
pub mod protected;
pub mod public;
pub mod utils;
