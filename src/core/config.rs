//! Bridge configuration with documented defaults
//!
//! Every tunable the bridge reads lives here. Values load from TOML, any
//! missing section or field falls back to the defaults below, and the
//! connection target can be overridden from the environment.

use crate::bridge::service::DecisionEndpoint;
use crate::bridge::trigger::TriggerPolicy;
use crate::core::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `service.host`
pub const HOST_ENV: &str = "COMBAT_BRIDGE_HOST";
/// Environment variable overriding `service.port`
pub const PORT_ENV: &str = "COMBAT_BRIDGE_PORT";

/// Where the decision service lives and how long we wait on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Hostname or IP of the decision service
    pub host: String,

    /// TCP port of the decision service
    pub port: u16,

    /// Bounded wait for a graceful channel shutdown before forcing it closed
    pub release_timeout_ms: u64,

    /// Optional deadline for a single call.
    ///
    /// Absent means the bridge adds no deadline of its own and the call runs
    /// until the transport reports success or failure.
    pub call_timeout_ms: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5000,
            release_timeout_ms: 5000,
            call_timeout_ms: None,
        }
    }
}

impl ServiceConfig {
    pub fn release_timeout(&self) -> Duration {
        Duration::from_millis(self.release_timeout_ms)
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }
}

/// When and how the decision loop consults the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Which ticks trigger a decision call
    pub trigger: TriggerPolicy,

    /// Ticks between periodic calls.
    ///
    /// Any triggered call, reactive or periodic, restarts this countdown.
    pub interval_ticks: u64,

    /// Radar sweep issued on every tick regardless of decisions (degrees,
    /// positive = clockwise)
    pub radar_sweep_degrees: f64,

    /// Which RPC carries the game state
    pub endpoint: DecisionEndpoint,

    /// Commit each command to the host before applying the next one.
    ///
    /// Hosts that buffer "set" commands until the end of the tick can turn
    /// this off; the whole batch then commits once.
    pub commit_each_command: bool,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            trigger: TriggerPolicy::Both,
            interval_ticks: 100,
            radar_sweep_degrees: 360.0,
            endpoint: DecisionEndpoint::Act,
            commit_each_command: true,
        }
    }
}

/// Battlefield-derived thresholds used while encoding state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Distance to any wall below which the agent counts as near-wall
    pub wall_threshold: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            wall_threshold: 50.0,
        }
    }
}

/// Round bracketing behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Release the channel after the round outcome has been delivered.
    ///
    /// When false the channel stays open across rounds and is only released
    /// by an explicit shutdown.
    pub release_on_round_end: bool,

    /// Send a `reset_round` signal just before `start_round` so the service
    /// drops any state left over from an interrupted round.
    pub reset_on_start: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            release_on_round_end: true,
            reset_on_start: true,
        }
    }
}

/// Complete bridge configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub service: ServiceConfig,
    pub decision: DecisionConfig,
    pub geometry: GeometryConfig,
    pub lifecycle: LifecycleConfig,
}

impl BridgeConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BridgeConfig = toml::from_str(content)
            .map_err(|e| BridgeError::Config(format!("Failed to parse config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BridgeError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `COMBAT_BRIDGE_HOST` / `COMBAT_BRIDGE_PORT` overrides
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var(HOST_ENV) {
            self.service.host = host;
        }
        if let Ok(port) = std::env::var(PORT_ENV) {
            self.service.port = port
                .parse()
                .map_err(|_| BridgeError::Config(format!("{} is not a port: {}", PORT_ENV, port)))?;
        }
        self.validate()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.service.host.trim().is_empty() {
            return Err(BridgeError::Config("service.host must not be empty".into()));
        }
        if self.service.port == 0 {
            return Err(BridgeError::Config("service.port must be non-zero".into()));
        }
        if self.service.release_timeout_ms == 0 {
            return Err(BridgeError::Config(
                "service.release_timeout_ms must be positive".into(),
            ));
        }
        if self.service.call_timeout_ms == Some(0) {
            return Err(BridgeError::Config(
                "service.call_timeout_ms must be positive when set".into(),
            ));
        }
        if self.decision.interval_ticks == 0 {
            return Err(BridgeError::Config(
                "decision.interval_ticks must be at least 1".into(),
            ));
        }
        if !self.decision.radar_sweep_degrees.is_finite() {
            return Err(BridgeError::Config(
                "decision.radar_sweep_degrees must be finite".into(),
            ));
        }
        if !(self.geometry.wall_threshold.is_finite() && self.geometry.wall_threshold >= 0.0) {
            return Err(BridgeError::Config(format!(
                "geometry.wall_threshold ({}) must be a non-negative number",
                self.geometry.wall_threshold
            )));
        }
        Ok(())
    }
}
