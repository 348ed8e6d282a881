// Password hashing. bcrypt is CPU-bound, so both directions run on the
// blocking thread pool.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::OnceCell;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Password must not be empty")]
    Empty,
}

/// Hash a password with bcrypt at the given cost. The salt is embedded in the
/// returned string.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }
    let password = password.to_string();

    tokio::task::spawn_blocking(move || {
        bcrypt::hash(password, cost).map_err(|e| PasswordError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| PasswordError::Hashing(format!("Task join error: {}", e)))?
}

/// `Ok(false)` for a mismatch and for stored values that are not bcrypt hashes.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let hash = hash.to_string();

    tokio::task::spawn_blocking(move || match bcrypt::verify(password, &hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored password is not a valid bcrypt hash: {}", e);
            false
        }
    })
    .await
    .map_err(|e| PasswordError::Hashing(format!("Task join error: {}", e)))
}

/// Stand-in hash checked when a login names no known user, so that the
/// response takes as long as a real password check. Built lazily at the
/// configured cost and shared between clones.
#[derive(Debug, Clone, Default)]
pub struct DecoyHash {
    hash: Arc<OnceCell<String>>,
}

impl DecoyHash {
    const PASSWORD: &'static str = "decoy-password-never-issued";

    /// Always `Ok(false)`.
    pub async fn verify(&self, password: &str, cost: u32) -> Result<bool, PasswordError> {
        let hash = self
            .hash
            .get_or_try_init(|| hash_password(Self::PASSWORD, cost))
            .await?;
        verify_password(password, hash).await?;
        Ok(false)
    }
}
