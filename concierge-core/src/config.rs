use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;

/// Primary port variable, takes precedence over `PORT`
pub const PORT_ENV: &str = "CONCIERGE_PORT";
/// Fallback port variable, commonly injected by hosting platforms
pub const PORT_FALLBACK_ENV: &str = "PORT";

const DEFAULT_PORT: u16 = 80;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid port in {var}: {value:?}")]
    InvalidPort { var: &'static str, value: String },
}

/// Process-wide server configuration, built once at startup
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listening port
    pub port: u16,
    /// Maximum number of concurrent threads (None = unlimited)
    pub max_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_threads: Some(100),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment.
    /// Port resolution: `CONCIERGE_PORT`, then `PORT`, then 80.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        for var in [PORT_ENV, PORT_FALLBACK_ENV] {
            if let Some(value) = lookup(var) {
                config.port = value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidPort { var, value })?;
                break;
            }
        }
        Ok(config)
    }

    /// Override the listening port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the maximum number of concurrent threads
    pub fn with_max_threads(mut self, max_threads: Option<usize>) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Socket address to bind, always on all interfaces
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn default_port_when_env_empty() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 80);
    }

    #[test]
    fn primary_var_wins_over_fallback() {
        let config =
            ServerConfig::from_lookup(lookup(&[(PORT_ENV, "8080"), (PORT_FALLBACK_ENV, "3000")]))
                .unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn fallback_var_used_when_primary_missing() {
        let config = ServerConfig::from_lookup(lookup(&[(PORT_FALLBACK_ENV, "3000")])).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = ServerConfig::from_lookup(lookup(&[(PORT_ENV, "not-a-port")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { var, .. } if var == PORT_ENV));
    }
}
