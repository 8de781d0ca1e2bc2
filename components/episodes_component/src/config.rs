//! Configuration for the Episodes component

use crate::{EpisodesError, Result};
use beacon::BEACON_VERSION;
use episode_store::DEFAULT_QUEUE_CAPACITY;
use serde::{Deserialize, Serialize};

/// Default beacon endpoint
pub const DEFAULT_BEACON_ENDPOINT: &str = "/images/beacon.gif";

/// Configuration for the Episodes component
///
/// Controls when episode collection finishes, whether resource timing is
/// aggregated and whether a beacon is sent on `done`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EpisodesConfig {
    /// Finish collecting (call `done`) once the page has loaded
    autorun: bool,

    /// Aggregate resource timing entries during `done`
    include_resource_aggregation: bool,

    /// Send the beacon during `done`
    send_beacon: bool,

    /// URL the beacon query string is appended to
    beacon_endpoint: String,

    /// Hostname patterns whose resources are aggregated; empty means all
    domain_allowlist: Vec<String>,

    /// Value of the beacon's `v=` parameter
    version: String,

    /// Maximum number of commands held before initialisation
    queue_capacity: usize,
}

impl EpisodesConfig {
    /// Create a new builder for EpisodesConfig
    ///
    /// # Example
    ///
    /// ```
    /// use episodes_component::EpisodesConfig;
    ///
    /// let config = EpisodesConfig::builder()
    ///     .send_beacon(true)
    ///     .allowed_domain("*.example.com")
    ///     .build();
    ///
    /// assert!(config.send_beacon());
    /// ```
    pub fn builder() -> EpisodesConfigBuilder {
        EpisodesConfigBuilder::default()
    }

    /// Parse a JSON configuration; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that would make the component unusable
    pub fn validate(&self) -> Result<()> {
        if self.beacon_endpoint.trim().is_empty() {
            return Err(EpisodesError::InvalidConfiguration(
                "beaconEndpoint must not be empty".to_string(),
            ));
        }
        if self.version.trim().is_empty() {
            return Err(EpisodesError::InvalidConfiguration(
                "version must not be empty".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(EpisodesError::InvalidConfiguration(
                "queueCapacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get whether `done` runs automatically at load
    pub fn autorun(&self) -> bool {
        self.autorun
    }

    /// Get whether resource timing is aggregated
    pub fn include_resource_aggregation(&self) -> bool {
        self.include_resource_aggregation
    }

    /// Get whether the beacon is sent on `done`
    pub fn send_beacon(&self) -> bool {
        self.send_beacon
    }

    /// Get the beacon endpoint
    pub fn beacon_endpoint(&self) -> &str {
        &self.beacon_endpoint
    }

    /// Get the domain allowlist
    pub fn domain_allowlist(&self) -> &[String] {
        &self.domain_allowlist
    }

    /// Get the beacon version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the pending command capacity
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }
}

impl Default for EpisodesConfig {
    /// Create a default configuration
    ///
    /// Default values:
    /// - autorun: true
    /// - include_resource_aggregation: true
    /// - send_beacon: false
    /// - beacon_endpoint: "/images/beacon.gif"
    /// - domain_allowlist: [] (every domain)
    /// - version: "0.3"
    /// - queue_capacity: 256
    fn default() -> Self {
        Self {
            autorun: true,
            include_resource_aggregation: true,
            send_beacon: false,
            beacon_endpoint: DEFAULT_BEACON_ENDPOINT.to_string(),
            domain_allowlist: Vec::new(),
            version: BEACON_VERSION.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Builder for EpisodesConfig
///
/// Provides a fluent interface for constructing EpisodesConfig instances.
#[derive(Debug, Clone, Default)]
pub struct EpisodesConfigBuilder {
    autorun: Option<bool>,
    include_resource_aggregation: Option<bool>,
    send_beacon: Option<bool>,
    beacon_endpoint: Option<String>,
    domain_allowlist: Vec<String>,
    version: Option<String>,
    queue_capacity: Option<usize>,
}

impl EpisodesConfigBuilder {
    /// Finish automatically at load (or not)
    pub fn autorun(mut self, enabled: bool) -> Self {
        self.autorun = Some(enabled);
        self
    }

    /// Enable or disable resource timing aggregation
    pub fn include_resource_aggregation(mut self, enabled: bool) -> Self {
        self.include_resource_aggregation = Some(enabled);
        self
    }

    /// Send the beacon on `done`
    pub fn send_beacon(mut self, enabled: bool) -> Self {
        self.send_beacon = Some(enabled);
        self
    }

    /// Set the beacon endpoint
    ///
    /// # Arguments
    ///
    /// * `endpoint` - URL without query string (e.g., "https://example.com/gen204")
    pub fn beacon_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.beacon_endpoint = Some(endpoint.into());
        self
    }

    /// Add a hostname pattern to the allowlist
    ///
    /// # Arguments
    ///
    /// * `pattern` - Hostname, optionally prefixed with `*.` (e.g., "*.example.com")
    pub fn allowed_domain(mut self, pattern: impl Into<String>) -> Self {
        self.domain_allowlist.push(pattern.into());
        self
    }

    /// Set the beacon version
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the pending command capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Build the EpisodesConfig
    ///
    /// Uses default values for any options not explicitly set.
    pub fn build(self) -> EpisodesConfig {
        let default = EpisodesConfig::default();

        EpisodesConfig {
            autorun: self.autorun.unwrap_or(default.autorun),
            include_resource_aggregation: self
                .include_resource_aggregation
                .unwrap_or(default.include_resource_aggregation),
            send_beacon: self.send_beacon.unwrap_or(default.send_beacon),
            beacon_endpoint: self.beacon_endpoint.unwrap_or(default.beacon_endpoint),
            domain_allowlist: self.domain_allowlist,
            version: self.version.unwrap_or(default.version),
            queue_capacity: self.queue_capacity.unwrap_or(default.queue_capacity),
        }
    }
}
