//! Forwarder configuration

use crate::core::AddressKey;
use crate::error::{Error, Result};
use std::time::Duration;

/// How groups are written to the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForwardMode {
    /// Factor shared name, time and unit into a base record
    #[default]
    Compact,
    /// One self-contained entry per record, for receivers that do not resolve base fields
    Passthrough,
}

impl std::str::FromStr for ForwardMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(ForwardMode::Compact),
            "passthrough" => Ok(ForwardMode::Passthrough),
            _ => Err(format!("Invalid forward mode: {}. Use 'compact' or 'passthrough'", s)),
        }
    }
}

/// Settings of the remote endpoint. Read once at startup, never mutated.
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    pub remote_url: String,
    /// Sent as `Authorization: Bearer <token>` when present
    pub remote_token: Option<String>,
    /// Label of the inbound content type; informational only
    pub content_type: String,
    pub timeout: Duration,
    pub address_key: AddressKey,
    pub mode: ForwardMode,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            remote_url: "http://localhost:9000".to_string(),
            remote_token: None,
            content_type: "application/senml+json".to_string(),
            timeout: Duration::from_secs(30),
            address_key: AddressKey::default(),
            mode: ForwardMode::default(),
        }
    }
}

impl ForwarderConfig {
    pub fn new(remote_url: &str) -> Self {
        Self { remote_url: remote_url.to_string(), ..Default::default() }
    }

    /// An empty token is treated as no token.
    pub fn with_token(mut self, token: &str) -> Self {
        self.remote_token = (!token.is_empty()).then(|| token.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_address_key(mut self, key: AddressKey) -> Self {
        self.address_key = key;
        self
    }

    pub fn with_mode(mut self, mode: ForwardMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.remote_url.trim().is_empty() {
            return Err(Error::Config("remote URL must not be empty".to_string()));
        }
        reqwest::Url::parse(&self.remote_url).map_err(|e| {
            Error::Config(format!("invalid remote URL '{}': {}", self.remote_url, e))
        })?;
        if self.timeout.is_zero() {
            return Err(Error::Config("request timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}
