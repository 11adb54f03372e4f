use crate::common::constants::{
    DEFAULT_BIND_ADDRESS, DEFAULT_CONCURRENCY_HINT, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_HEADER_SIZE,
    DEFAULT_PORT,
};
use crate::core::net::daemon::TransportOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address the daemon binds to
    pub bind_address: String,

    /// Port to listen on; 0 lets the OS choose
    pub port: u16,

    /// Advisory only: connections always get one thread each
    pub concurrency_hint: u32,

    /// Idle read timeout per connection; unset waits forever
    pub read_timeout_secs: Option<u64>,

    /// Socket write timeout per connection; unset waits forever
    pub write_timeout_secs: Option<u64>,

    /// Maximum size of request line plus headers
    pub max_header_size: usize,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// Default log level when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            concurrency_hint: DEFAULT_CONCURRENCY_HINT,
            read_timeout_secs: None,
            write_timeout_secs: None,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            read_timeout: self.read_timeout_secs.map(Duration::from_secs),
            write_timeout: self.write_timeout_secs.map(Duration::from_secs),
            max_header_size: self.max_header_size,
            max_body_size: self.max_body_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.concurrency_hint, 2);

        let options = config.transport_options();
        assert!(options.read_timeout.is_none());
        assert_eq!(options.max_body_size, DEFAULT_MAX_BODY_SIZE);
    }

    #[test]
    fn test_timeouts_map_to_durations() {
        let config = Config {
            read_timeout_secs: Some(5),
            write_timeout_secs: Some(1),
            ..Config::default()
        };
        let options = config.transport_options();
        assert_eq!(options.read_timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.write_timeout, Some(Duration::from_secs(1)));
    }
}
