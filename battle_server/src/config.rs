//! Environment-driven settings. `main` loads `.env` first, so either source works.

use tracing::info;

use crate::engine::{EngineConfig, DEFAULT_WALL_BUFFER};
use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// How the snake looks in the game client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appearance {
    pub author: String,
    pub color: String,
    pub head: String,
    pub tail: String,
}

impl Default for Appearance {
    fn default() -> Self {
        Appearance {
            author: String::new(),
            color: "#00ffff".to_string(),
            head: "beluga".to_string(),
            tail: "pixel".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub engine: EngineConfig,
    pub appearance: Appearance,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            engine: EngineConfig::default(),
            appearance: Appearance::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = match lookup("PORT") {
            Some(raw) => {
                info!(port = %raw, "found provided port");
                raw.trim()
                    .parse::<u16>()
                    .map_err(|e| ConfigError::InvalidValue {
                        key: "PORT",
                        value: raw.clone(),
                        reason: e.to_string(),
                    })?
            }
            None => {
                info!(port = DEFAULT_PORT, "using default port");
                DEFAULT_PORT
            }
        };

        let wall_buffer = match lookup("WALL_BUFFER") {
            Some(raw) => parse_wall_buffer(&raw)?,
            None => DEFAULT_WALL_BUFFER,
        };

        let appearance = Appearance {
            author: lookup("SNAKE_AUTHOR").unwrap_or(defaults.appearance.author),
            color: lookup("SNAKE_COLOR").unwrap_or(defaults.appearance.color),
            head: lookup("SNAKE_HEAD").unwrap_or(defaults.appearance.head),
            tail: lookup("SNAKE_TAIL").unwrap_or(defaults.appearance.tail),
        };

        Ok(Config {
            host,
            port,
            engine: EngineConfig { wall_buffer },
            appearance,
        })
    }
}

fn parse_wall_buffer(raw: &str) -> Result<i32, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key: "WALL_BUFFER",
        value: raw.to_string(),
        reason,
    };
    let buffer = raw.trim().parse::<i32>().map_err(|e| invalid(e.to_string()))?;
    if buffer < 0 {
        return Err(invalid("must not be negative".to_string()));
    }
    Ok(buffer)
}
