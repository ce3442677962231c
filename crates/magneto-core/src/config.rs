//! Settings loaded from the environment
//!
//! Every key maps to the upper-cased environment variable of the same name
//! (`port` ← `PORT`, `probe_max_collections` ← `PROBE_MAX_COLLECTIONS`).

use crate::probe::ProbeLimits;
use crate::{Error, Result};
use config::{Config, Environment};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

/// Process settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub shutdown_timeout_ms: u64,
    pub probe_max_collections: usize,
    pub probe_max_error_chars: usize,
}

impl Settings {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        Self::from_source(Environment::default().try_parsing(true))
    }

    /// Load from a custom environment source
    pub fn from_source(env: Environment) -> Result<Self> {
        let defaults = ProbeLimits::default();
        let conf = Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000)?
            .set_default("workers", num_cpus::get() as u64)?
            .set_default("shutdown_timeout_ms", 5000)?
            .set_default("probe_max_collections", defaults.max_collections as u64)?
            .set_default("probe_max_error_chars", defaults.max_error_chars as u64)?
            .add_source(env)
            .build()?;
        Ok(conf.try_deserialize()?)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            hostname: self.host.clone(),
            port: self.port,
            shutdown_timeout: Duration::from_millis(self.shutdown_timeout_ms),
        }
    }

    pub fn probe_limits(&self) -> ProbeLimits {
        ProbeLimits {
            max_collections: self.probe_max_collections,
            max_error_chars: self.probe_max_error_chars,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub hostname: String,
    pub port: u16,
    /// How long shutdown waits for open connections
    pub shutdown_timeout: Duration,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.hostname, self.port)
            .parse()
            .map_err(|e| Error::InvalidAddress(format!("{}:{}: {}", self.hostname, self.port, e)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hostname: "0.0.0.0".to_string(),
            port: 8000,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> Environment {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default().try_parsing(true).source(Some(vars))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_source(source(&[])).unwrap();
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 8000);
        assert!(settings.workers >= 1);
        assert_eq!(settings.probe_limits(), ProbeLimits::default());
        assert_eq!(settings.server_config().shutdown_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_source(source(&[
            ("PORT", "9090"),
            ("HOST", "127.0.0.1"),
            ("PROBE_MAX_COLLECTIONS", "3"),
            ("DATABASE_URL", "mongodb://localhost"),
        ]))
        .unwrap();

        assert_eq!(settings.port, 9090);
        assert_eq!(settings.probe_limits().max_collections, 3);
        assert_eq!(
            settings.server_config().socket_addr().unwrap(),
            "127.0.0.1:9090".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_bad_port_is_an_error() {
        assert!(Settings::from_source(source(&[("PORT", "not-a-port")])).is_err());
    }

    #[test]
    fn test_bad_host() {
        let config = ServerConfig {
            hostname: "not an address".to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(config.socket_addr(), Err(Error::InvalidAddress(_))));
    }
}
