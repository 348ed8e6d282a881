use sqlx::FromRow;

use super::Level;

/// A live login. `expires_at` is a unix timestamp in seconds.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub id: String,
    pub username: String,
    pub expires_at: i64,
}

/// A `sessions` row joined with its user's current level.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SessionRecord {
    pub id: String,
    pub username: String,
    #[sqlx(try_from = "String")]
    pub level: Level,
    pub expires_at: i64,
}

impl SessionRecord {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}
