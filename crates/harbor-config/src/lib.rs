//! # harbor-config
//!
//! Configuration for the HARBOR monitor, read from `~/.harbor/config.yaml`.
//!
//! Every section is optional; missing fields fall back to the values the
//! dashboard has always used (2 second ticks, five notifications shown for ten
//! seconds each).
//!
//! ```yaml
//! simulation:
//!   tick_interval_ms: 2000
//!   seed: 42
//! notifications:
//!   capacity: 5
//!   display_secs: 10
//! rules:
//!   reset_membership_on_enable: false
//!   initial:
//!     - target: all
//!       metric: utilization
//!       comparator: gt
//!       threshold_value: 90
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use harbor_core::rule::RawRuleDefinition;
use harbor_core::{HarborError, Result, logging};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default tick interval in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 2000;

/// Default notification feed capacity.
pub const DEFAULT_FEED_CAPACITY: usize = 5;

/// Default time a notification stays in the feed, in seconds.
pub const DEFAULT_DISPLAY_SECS: u64 = 10;

/// Config file path (`~/.harbor/config.yaml`).
pub fn config_path() -> Result<PathBuf> {
    Ok(logging::harbor_home()?.join("config.yaml"))
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarborConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub rules: RulesConfig,
}

/// Simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Interval between ticks in milliseconds
    pub tick_interval_ms: u64,

    /// Seed for the random source; random when absent
    pub seed: Option<u64>,

    /// Maximum utilization change per tick (percentage points)
    pub utilization_jitter: f64,

    /// Maximum movement per tick on each axis
    pub position_jitter: f64,

    /// Probability that a non-Error unit fails this tick
    pub error_probability: f64,

    /// Upper bound of the draw that sends a unit to Warning
    pub warning_probability: f64,

    /// Draws above this value recover a Warning unit
    pub recovery_threshold: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            seed: None,
            utilization_jitter: 3.0,
            position_jitter: 2.0,
            error_probability: 0.01,
            warning_probability: 0.05,
            recovery_threshold: 0.8,
        }
    }
}

impl SimulationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Notification feed settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Maximum notifications kept in the feed
    pub capacity: usize,

    /// Seconds before a notification expires (0 = never)
    pub display_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_FEED_CAPACITY,
            display_secs: DEFAULT_DISPLAY_SECS,
        }
    }
}

impl NotificationConfig {
    /// Display duration, or `None` when expiry is disabled.
    pub fn display_duration(&self) -> Option<Duration> {
        (self.display_secs > 0).then(|| Duration::from_secs(self.display_secs))
    }
}

/// Custom alert rule settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Clear a rule's trigger membership when it is re-enabled, so units that
    /// still match alert again
    pub reset_membership_on_enable: bool,

    /// Rules created when the monitor starts
    pub initial: Vec<RawRuleDefinition>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            reset_membership_on_enable: false,
            initial: Vec::new(),
        }
    }
}

impl HarborConfig {
    /// Load from the default path, falling back to defaults when the file is absent.
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            debug!(path = %path.display(), "config file does not exist, using defaults");
            return Ok(Self::default());
        }
        Self::from_yaml(&path)
    }

    /// Load and validate configuration from a YAML file.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HarborError::ConfigNotFound {
                    path: path.to_path_buf(),
                    source: Some(e),
                }
            } else {
                HarborError::io("reading config", path, e)
            }
        })?;

        let config = Self::parse(&content).map_err(|e| match e {
            HarborError::ConfigInvalid { message, .. } => HarborError::ConfigInvalid {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| HarborError::ConfigInvalid {
                path: PathBuf::from("<inline>"),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.tick_interval_ms == 0 {
            return Err(HarborError::config_validation(
                "simulation.tick_interval_ms must be greater than zero",
            ));
        }
        for (name, value) in [
            ("utilization_jitter", sim.utilization_jitter),
            ("position_jitter", sim.position_jitter),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(HarborError::config_validation(format!(
                    "simulation.{name} must be a non-negative number, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("error_probability", sim.error_probability),
            ("warning_probability", sim.warning_probability),
            ("recovery_threshold", sim.recovery_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(HarborError::config_validation(format!(
                    "simulation.{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        if sim.error_probability > sim.warning_probability {
            return Err(HarborError::config_validation(
                "simulation.error_probability cannot exceed warning_probability",
            ));
        }
        if self.notifications.capacity == 0 {
            return Err(HarborError::config_validation(
                "notifications.capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = HarborConfig::default();
        assert_eq!(config.simulation.tick_interval(), Duration::from_millis(2000));
        assert_eq!(config.notifications.capacity, 5);
        assert_eq!(
            config.notifications.display_duration(),
            Some(Duration::from_secs(10))
        );
        assert!(!config.rules.reset_membership_on_enable);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
simulation:
  tick_interval_ms: 500
  seed: 7
notifications:
  display_secs: 0
"#;
        let config = HarborConfig::parse(yaml).unwrap();
        assert_eq!(config.simulation.tick_interval_ms, 500);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.simulation.utilization_jitter, 3.0);
        assert_eq!(config.notifications.capacity, 5);
        assert_eq!(config.notifications.display_duration(), None);
    }

    #[test]
    fn test_membership_reset_is_opt_in() {
        let config = HarborConfig::parse("rules:\n  initial: []\n").unwrap();
        assert!(!config.rules.reset_membership_on_enable);

        let config =
            HarborConfig::parse("rules:\n  reset_membership_on_enable: true\n").unwrap();
        assert!(config.rules.reset_membership_on_enable);
    }

    #[test]
    fn test_parse_initial_rules() {
        let yaml = r#"
rules:
  initial:
    - target: T02
      metric: utilization
      comparator: lt
      threshold_value: 50
    - metric: health
      threshold_health: Error
"#;
        let config = HarborConfig::parse(yaml).unwrap();
        assert_eq!(config.rules.initial.len(), 2);
        assert_eq!(config.rules.initial[0].target, "T02");
        assert_eq!(config.rules.initial[1].target, "all");
        assert_eq!(config.rules.initial[1].threshold_health.as_deref(), Some("Error"));
    }

    #[test]
    fn test_validation_failures() {
        let zero_interval = "simulation:\n  tick_interval_ms: 0\n";
        assert!(matches!(
            HarborConfig::parse(zero_interval),
            Err(HarborError::ConfigValidation { .. })
        ));

        let bad_probability = "simulation:\n  error_probability: 1.5\n";
        assert!(HarborConfig::parse(bad_probability).is_err());

        let inverted = "simulation:\n  error_probability: 0.2\n  warning_probability: 0.1\n";
        assert!(HarborConfig::parse(inverted).is_err());

        let zero_capacity = "notifications:\n  capacity: 0\n";
        assert!(HarborConfig::parse(zero_capacity).is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = HarborConfig::parse("simulation: [not, a, map]").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "simulation:\n  tick_interval_ms: 250").unwrap();
        file.flush().unwrap();

        let config = HarborConfig::from_yaml(file.path()).unwrap();
        assert_eq!(config.simulation.tick_interval_ms, 250);
    }

    #[test]
    fn test_from_yaml_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = HarborConfig::from_yaml(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, HarborError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_from_yaml_reports_path_on_parse_error() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "notifications: 12").unwrap();
        file.flush().unwrap();

        match HarborConfig::from_yaml(file.path()).unwrap_err() {
            HarborError::ConfigInvalid { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
