//! Configuration types for the BAO updater
//!
//! These are plain typed values; reading them from the environment is the
//! binary's job. [`BaoConfig::validate`] runs before any network call so a
//! bad setting fails fast.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::retry::RetryPolicy;

/// Main configuration for one reconcile pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaoConfig {
    /// DNS provider credentials and endpoint
    pub provider: ProviderConfig,

    /// Public IP lookup service
    pub ip_lookup: IpLookupConfig,

    /// Provider-assigned ID of the record to reconcile
    pub record_id: String,

    /// Retry and run-mode settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl BaoConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Error> {
        if self.record_id.trim().is_empty() {
            return Err(Error::config("Record ID cannot be empty"));
        }

        self.provider.validate()?;
        self.ip_lookup.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Access key ID
    pub access_key_id: String,

    /// Access key secret, never logged
    pub access_key_secret: String,

    /// API endpoint, either a bare host or a full URL
    pub endpoint: String,
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), Error> {
        if self.access_key_id.is_empty() {
            return Err(Error::config("Access key ID cannot be empty"));
        }
        if self.access_key_secret.is_empty() {
            return Err(Error::config("Access key secret cannot be empty"));
        }
        if self.endpoint.trim().is_empty() {
            return Err(Error::config("Provider endpoint cannot be empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// IP lookup service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpLookupConfig {
    /// URL answering with the caller's IP as plain text
    pub url: String,

    /// Client identifier sent as `User-Agent`
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Address family to accept
    #[serde(default)]
    pub version: IpVersion,
}

impl IpLookupConfig {
    /// Create a lookup configuration with default user agent and family
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_agent: default_user_agent(),
            version: IpVersion::default(),
        }
    }

    /// Validate the lookup configuration
    pub fn validate(&self) -> Result<(), Error> {
        if self.url.is_empty() {
            return Err(Error::config("IP lookup URL cannot be empty"));
        }
        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(Error::config(format!(
                "IP lookup URL must use HTTP or HTTPS scheme. Got: {}",
                self.url
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(Error::config("User agent cannot be empty"));
        }
        Ok(())
    }
}

/// Default lookup client identifier; some services block library defaults
pub fn default_user_agent() -> String {
    "curl".to_string()
}

/// IP version to accept from the lookup service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    /// IPv4 only
    V4,
    /// IPv6 only
    V6,
    /// Whatever the service answers
    #[default]
    Any,
}

impl IpVersion {
    /// Whether `addr` belongs to this family
    pub fn accepts(&self, addr: IpAddr) -> bool {
        match self {
            IpVersion::V4 => addr.is_ipv4(),
            IpVersion::V6 => addr.is_ipv6(),
            IpVersion::Any => true,
        }
    }
}

impl FromStr for IpVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v4" | "ipv4" | "4" => Ok(IpVersion::V4),
            "v6" | "ipv6" | "6" => Ok(IpVersion::V6),
            "any" | "both" | "" => Ok(IpVersion::Any),
            other => Err(Error::config(format!(
                "IP version '{}' is not valid. Valid values: v4, v6, any",
                other
            ))),
        }
    }
}

/// Whether the writer talks to the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Apply updates
    #[default]
    Live,
    /// Log the update that would be sent, change nothing
    DryRun,
}

impl FromStr for RunMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" | "" => Ok(RunMode::Live),
            "dry-run" | "dry_run" | "dryrun" => Ok(RunMode::DryRun),
            other => Err(Error::config(format!(
                "Mode '{}' is not valid. Valid modes: live, dry-run",
                other
            ))),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Attempts for the IP lookup and the record read (writes never retry)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff step in seconds
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Live or dry-run
    #[serde(default)]
    pub mode: RunMode,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), Error> {
        if !(1..=10).contains(&self.max_attempts) {
            return Err(Error::config(format!(
                "Max attempts must be between 1 and 10. Got: {}",
                self.max_attempts
            )));
        }
        if self.retry_delay_secs > 300 {
            return Err(Error::config(format!(
                "Retry delay must be at most 300 seconds. Got: {}",
                self.retry_delay_secs
            )));
        }
        Ok(())
    }

    /// Retry policy for the read side of the pass
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_secs(self.retry_delay_secs),
        )
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            mode: RunMode::default(),
        }
    }
}

fn default_max_attempts() -> u32 {
    crate::retry::DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay_secs() -> u64 {
    crate::retry::DEFAULT_BASE_DELAY.as_secs()
}
