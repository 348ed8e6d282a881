use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Upper bound for `SESSION_EXPIRY_HOURS` (one year).
pub const MAX_SESSION_EXPIRY_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub name: String,
    pub port: u16,
    pub ssl: bool,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub session_secret: String,
    pub session_expiry_hours: u64,
    pub require_https: bool,
    pub user_admin: UserAdminAccess,
    pub bcrypt_cost: u32,
}

/// Who may reach the `/users` management routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserAdminAccess {
    /// Only managers (level `m`).
    ManagerOnly,
    /// Any logged-in session, regardless of level.
    AnyAuthenticated,
}

impl UserAdminAccess {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manager" | "managers" | "manager_only" => Some(Self::ManagerOnly),
            "any" | "authenticated" | "any_authenticated" => Some(Self::AnyAuthenticated),
            _ => None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Elastic Beanstalk style RDS_* variables win over the local DB_* ones
        if let Some(v) = first_var(&["RDS_HOSTNAME", "DB_HOST"]) {
            self.database.host = v;
        }
        if let Some(v) = first_var(&["RDS_USERNAME", "DB_USER"]) {
            self.database.user = v;
        }
        if let Some(v) = first_var(&["RDS_PASSWORD", "DB_PASSWORD"]) {
            self.database.password = v;
        }
        if let Some(v) = first_var(&["RDS_DB_NAME", "DB_NAME"]) {
            self.database.name = v;
        }
        if let Some(v) = first_var(&["RDS_PORT", "DB_PORT"]) {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Ok(v) = env::var("DB_SSL") {
            self.database.ssl = parse_flag(&v).unwrap_or(self.database.ssl);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        if let Ok(v) = env::var("SESSION_SECRET") {
            self.security.session_secret = v;
        }
        if let Ok(v) = env::var("SESSION_EXPIRY_HOURS") {
            let hours = v.parse().unwrap_or(self.security.session_expiry_hours);
            if hours > MAX_SESSION_EXPIRY_HOURS {
                tracing::warn!("SESSION_EXPIRY_HOURS {} capped at {}", hours, MAX_SESSION_EXPIRY_HOURS);
            }
            self.security.session_expiry_hours = hours.min(MAX_SESSION_EXPIRY_HOURS);
        }
        if let Ok(v) = env::var("SECURITY_REQUIRE_HTTPS") {
            self.security.require_https = parse_flag(&v).unwrap_or(self.security.require_https);
        }
        if let Ok(v) = env::var("USER_ADMIN_ACCESS") {
            match UserAdminAccess::parse(&v) {
                Some(access) => self.security.user_admin = access,
                None => tracing::warn!("Ignoring unknown USER_ADMIN_ACCESS value '{}'", v),
            }
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                host: "localhost".to_string(),
                user: "postgres".to_string(),
                password: "admin".to_string(),
                name: "assignment3".to_string(),
                port: 5434,
                ssl: false,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                session_secret: "fallback-secret-key".to_string(),
                session_expiry_hours: 24,
                require_https: false,
                user_admin: UserAdminAccess::ManagerOnly,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                host: "localhost".to_string(),
                user: "postgres".to_string(),
                password: String::new(),
                name: "assignment3".to_string(),
                port: 5432,
                ssl: true,
                max_connections: 20,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                // Must come from SESSION_SECRET
                session_secret: String::new(),
                session_expiry_hours: 8,
                require_https: true,
                user_admin: UserAdminAccess::ManagerOnly,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
        }
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.database.connection_timeout)
    }

    pub fn session_secret_missing(&self) -> bool {
        self.security.session_secret.trim().is_empty()
    }
}

impl SecurityConfig {
    /// How long a new session lives, capped at [`MAX_SESSION_EXPIRY_HOURS`].
    pub fn session_lifetime(&self) -> chrono::Duration {
        let hours = self.session_expiry_hours.min(MAX_SESSION_EXPIRY_HOURS);
        chrono::Duration::hours(hours as i64)
    }
}

fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| env::var(name).ok().filter(|v| !v.is_empty()))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.port, 5434);
        assert_eq!(config.database.name, "assignment3");
        assert!(!config.session_secret_missing());
        assert_eq!(config.security.user_admin, UserAdminAccess::ManagerOnly);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.require_https);
        assert!(config.database.ssl);
        assert!(config.session_secret_missing());
    }

    #[test]
    fn parses_user_admin_access() {
        assert_eq!(UserAdminAccess::parse("manager"), Some(UserAdminAccess::ManagerOnly));
        assert_eq!(UserAdminAccess::parse(" ANY "), Some(UserAdminAccess::AnyAuthenticated));
        assert_eq!(UserAdminAccess::parse("everyone"), None);
    }

    #[test]
    fn session_lifetime_is_capped() {
        let mut security = AppConfig::development().security;
        assert_eq!(security.session_lifetime(), chrono::Duration::hours(24));

        security.session_expiry_hours = u64::MAX;
        assert_eq!(
            security.session_lifetime(),
            chrono::Duration::hours(MAX_SESSION_EXPIRY_HOURS as i64)
        );
    }

    #[test]
    fn parses_flags() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
