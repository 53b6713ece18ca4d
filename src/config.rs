use std::{env, fmt::Display, str::FromStr};

use anyhow::{anyhow, Context};
use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        match dotenv::dotenv() {
            Ok(path) => info!("Loaded environment from {}", path.display()),
            Err(_) => warn!(".env file not found, reading process environment only"),
        }

        let bootstrap_admin = match env::var("BOOTSTRAP_ADMIN_EMAIL") {
            Ok(email) if !email.trim().is_empty() => Some(BootstrapAdmin {
                email: email.trim().to_string(),
                name: env::var("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|_| "Administrator".into()),
            }),
            _ => None,
        };

        Ok(Self {
            port: try_load("PORT", "8080")?,
            environment: try_load("APP_ENV", "development")?,
            database: DatabaseConfig {
                url: try_load("DATABASE_URL", "sqlite://recruitment.db?mode=rwc")?,
                max_connections: try_load("DB_MAX_CONNECTIONS", "10")?,
                min_connections: try_load("DB_MIN_CONNECTIONS", "1")?,
            },
            bootstrap_admin,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("invalid value for {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_aliases() {
        assert_eq!("prod".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!(
            " Development ".parse::<Environment>(),
            Ok(Environment::Development)
        );
        assert!("staging".parse::<Environment>().is_err());
    }
}
