use crate::services::auth_service::DEFAULT_BCRYPT_COST;
use std::{env, fmt::Display, path::PathBuf, str::FromStr};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub users_file: PathBuf,
    pub bcrypt_cost: u32,
    pub cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: try_load("PORT", 5000),
            users_file: env::var("USERS_FILE")
                .unwrap_or_else(|_| "data/users.json".to_string())
                .into(),
            bcrypt_cost: try_load("BCRYPT_COST", DEFAULT_BCRYPT_COST),
            cookie_secure: try_load("COOKIE_SECURE", false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            users_file: PathBuf::from("data/users.json"),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            cookie_secure: false,
        }
    }
}

fn try_load<T: FromStr + Display>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            log::warn!("⚠️  Invalid {} value '{}': {}, using default {}", key, raw, e, default);
            default
        }),
        Err(_) => default,
    }
}
