//! Configuration loading and typed config structures for the Acequia
//! simulation.
//!
//! The configuration lives in `acequia-config.yaml` in the working
//! directory. This module defines strongly-typed structs that mirror the
//! YAML structure and a loader that reads and validates the file. Every
//! section is optional and falls back to the defaults below.

use std::path::{Path, PathBuf};

use acequia_world::{ScenarioSpec, WaterNetwork, WeatherEffects, WorldError};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a configuration or scenario file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },

    /// The configured scenario describes an invalid network.
    #[error("invalid scenario: {source}")]
    Scenario {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `acequia-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Run name and hour bounds.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Hourly weather settings.
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Where the network comes from.
    #[serde(default)]
    pub scenario: ScenarioConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Final report output.
    #[serde(default)]
    pub report: ReportConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `ACEQUIA_SCENARIO` overrides `scenario.path`
    /// - `ACEQUIA_REPORT` overrides `report.path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.max_hours == 0 {
            return Err(ConfigError::Invalid {
                reason: "simulation.max_hours must be at least 1".to_owned(),
            });
        }
        if self.simulation.start_hour >= self.simulation.max_hours {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "simulation.start_hour ({}) must be below max_hours ({})",
                    self.simulation.start_hour, self.simulation.max_hours
                ),
            });
        }
        for (field, value) in [
            ("weather.rain_gain", self.weather.rain_gain),
            ("weather.evaporation_loss", self.weather.evaporation_loss),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    reason: format!("{field} must be finite and non-negative, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// Apply `ACEQUIA_SCENARIO` and `ACEQUIA_REPORT` if they are set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("ACEQUIA_SCENARIO") {
            self.scenario.path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("ACEQUIA_REPORT") {
            self.report.path = Some(PathBuf::from(path));
        }
    }
}

/// Run name and hour bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Human-readable run name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Terminal hour.
    #[serde(default = "default_max_hours")]
    pub max_hours: u64,

    /// Hour the clock starts at.
    #[serde(default)]
    pub start_hour: u64,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            max_hours: default_max_hours(),
            start_hour: 0,
        }
    }
}

/// Hourly weather settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherConfig {
    /// Whether weather perturbs levels between hours.
    #[serde(default)]
    pub enabled: bool,

    /// Seed for the deterministic weather roll.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Level gained by every region when it rains.
    #[serde(default = "default_rain_gain")]
    pub rain_gain: f64,

    /// Level lost by every region during heat.
    #[serde(default = "default_evaporation_loss")]
    pub evaporation_loss: f64,
}

impl WeatherConfig {
    /// The effect magnitudes as the world crate expects them.
    pub const fn effects(&self) -> WeatherEffects {
        WeatherEffects {
            rain_gain: self.rain_gain,
            evaporation_loss: self.evaporation_loss,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            seed: default_seed(),
            rain_gain: default_rain_gain(),
            evaporation_loss: default_evaporation_loss(),
        }
    }
}

/// Where the network comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScenarioConfig {
    /// YAML scenario file. The built-in network is used when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl ScenarioConfig {
    /// Read the configured scenario file, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Yaml`] if the file
    /// cannot be read or parsed.
    pub fn load(&self) -> Result<Option<ScenarioSpec>, ConfigError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        let contents = std::fs::read_to_string(path)?;
        Ok(Some(parse_scenario(&contents)?))
    }

    /// Build the network for this run: the configured scenario file, or
    /// the built-in four-region network when no file is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Yaml`] if the file
    /// cannot be loaded, or [`ConfigError::Scenario`] if it describes an
    /// invalid network.
    pub fn build_network(&self) -> Result<WaterNetwork, ConfigError> {
        match self.load()? {
            Some(spec) => Ok(spec.build()?),
            None => Ok(acequia_world::create_default_scenario()?.0),
        }
    }
}

/// Parse a scenario description from YAML.
///
/// # Errors
///
/// Returns [`ConfigError::Yaml`] if the string is not a valid scenario.
pub fn parse_scenario(yaml: &str) -> Result<ScenarioSpec, ConfigError> {
    Ok(serde_yml::from_str(yaml)?)
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Final report output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportConfig {
    /// Write a JSON report here when the run ends.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_name() -> String {
    "Acequia".to_owned()
}

const fn default_max_hours() -> u64 {
    24
}

const fn default_seed() -> u64 {
    42
}

const fn default_rain_gain() -> f64 {
    0.5
}

const fn default_evaporation_loss() -> f64 {
    0.3
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.simulation.max_hours, 24);
        assert_eq!(config.simulation.start_hour, 0);
        assert!(!config.weather.enabled);
        assert_eq!(config.weather.seed, 42);
        assert!(config.scenario.path.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
simulation:
  name: "Rio Chama"
  max_hours: 48
  start_hour: 2

weather:
  enabled: true
  seed: 7
  rain_gain: 1.5
  evaporation_loss: 0.25

scenario:
  path: "scenarios/valley.yaml"

logging:
  level: "debug"
  json: true

report:
  path: "out/report.json"
"#;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.simulation.name, "Rio Chama");
        assert_eq!(config.simulation.max_hours, 48);
        assert_eq!(config.simulation.start_hour, 2);
        assert!(config.weather.enabled);
        assert_eq!(config.weather.seed, 7);
        assert_eq!(config.weather.effects().rain_gain, 1.5);
        assert_eq!(config.weather.effects().evaporation_loss, 0.25);
        assert_eq!(
            config.scenario.path.as_deref(),
            Some(Path::new("scenarios/valley.yaml"))
        );
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.report.path.as_deref(), Some(Path::new("out/report.json")));
    }

    #[test]
    fn parse_partial_yaml_uses_defaults() {
        let config = SimulationConfig::parse("simulation:\n  max_hours: 10\n").unwrap();
        assert_eq!(config.simulation.max_hours, 10);
        assert_eq!(config.simulation.name, "Acequia");
        assert_eq!(config.weather, WeatherConfig::default());
    }

    #[test]
    fn parse_empty_yaml_uses_defaults() {
        let config = SimulationConfig::parse("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn zero_max_hours_rejected() {
        let result = SimulationConfig::parse("simulation:\n  max_hours: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn start_hour_past_max_rejected() {
        let result = SimulationConfig::parse("simulation:\n  max_hours: 5\n  start_hour: 5\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn negative_weather_rejected() {
        let result = SimulationConfig::parse("weather:\n  rain_gain: -1.0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let result = SimulationConfig::parse("simulation: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn scenario_parses_and_builds() {
        let yaml = r"
regions:
  - { name: A, level: 2.0, need: 10.0, capacity: 30.0 }
  - { name: B, level: 20.0, need: 10.0, capacity: 30.0 }
canals:
  - { from: B, to: A }
  - { from: A, to: B }
";
        let spec = parse_scenario(yaml).unwrap();
        let network = spec.build().unwrap();
        assert_eq!(network.region_count(), 2);
        assert_eq!(network.canal_count(), 2);
        assert!(network.region_by_name("A").unwrap().is_in_drought);
    }

    #[test]
    fn missing_scenario_path_loads_nothing() {
        let config = ScenarioConfig::default();
        assert!(config.load().unwrap().is_none());
    }

    #[test]
    fn missing_scenario_path_builds_default_network() {
        let network = ScenarioConfig::default().build_network().unwrap();
        assert_eq!(network.region_count(), 4);
        assert!(network.region_by_name("North").is_some());
    }

    #[test]
    fn unreadable_scenario_is_io_error() {
        let config = ScenarioConfig {
            path: Some(PathBuf::from("/nonexistent/acequia/scenario.yaml")),
        };
        assert!(matches!(config.load(), Err(ConfigError::Io { .. })));
    }
}
