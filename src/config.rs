//! Settings of the coordinator binary, read from the environment.
use std::path::PathBuf;
use thiserror::Error;

pub const HOST_ENV: &str = "AUCTION_HOST";
pub const PORT_ENV: &str = "AUCTION_PORT";
/// When unset the coordinator keeps its log in memory.
pub const LOG_FILE_ENV: &str = "AUCTION_LOG_FILE";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,actix_web=info";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("AUCTION_PORT must be a port number, got {0:?}")]
    InvalidPort(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(host) = lookup(HOST_ENV) {
            if host.trim().is_empty() {
                return Err(ConfigError::Empty(HOST_ENV));
            }
            config.host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        config.log_file = lookup(LOG_FILE_ENV)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    /// Address bidders use to reach this coordinator.
    pub fn public_address(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
