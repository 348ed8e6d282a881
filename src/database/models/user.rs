use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Role stored in `users.level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "m")]
    Manager,
    #[serde(rename = "u")]
    User,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown user level '{0}'")]
pub struct UnknownLevel(pub String);

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Manager => "m",
            Level::User => "u",
        }
    }

    pub fn is_manager(&self) -> bool {
        matches!(self, Level::Manager)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::Manager => "manager",
            Level::User => "user",
        }
    }
}

impl FromStr for Level {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "m" | "M" => Ok(Level::Manager),
            "u" | "U" => Ok(Level::User),
            other => Err(UnknownLevel(other.to_string())),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = UnknownLevel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub username: String,
    /// bcrypt hash
    #[serde(skip_serializing)]
    pub password: String,
    #[sqlx(try_from = "String")]
    pub level: Level,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub level: Level,
}

/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub password_hash: Option<String>,
    pub level: Option<Level>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.password_hash.is_none() && self.level.is_none()
    }
}

/// Usernames appear in URLs, so keep them to a conservative character set.
pub fn validate_username(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > 32 {
        return Err("username must be 1 to 32 characters".to_string());
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        return Err("username may only contain letters, digits, '_', '-' and '.'".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels() {
        assert_eq!("m".parse::<Level>(), Ok(Level::Manager));
        assert_eq!(Level::try_from("u".to_string()), Ok(Level::User));
        assert_eq!("admin".parse::<Level>(), Err(UnknownLevel("admin".to_string())));
    }

    #[test]
    fn validates_usernames() {
        assert!(validate_username("ash_ketchum-1.0").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("ash ketchum").is_err());
        assert!(validate_username("<script>").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
    }

    #[test]
    fn password_never_serialized() {
        let user = User {
            username: "ash".into(),
            password: "$2b$04$hash".into(),
            level: Level::User,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json, serde_json::json!({ "username": "ash", "level": "u" }));
    }
}
