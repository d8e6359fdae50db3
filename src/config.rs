// src/config.rs - YAML monitor declarations

use crate::error::{Result, UaError};
use crate::variants::limit::Thresholds;
use crate::variants::off_normal::OffNormalKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Top-level configuration: a namespace index and the monitors to build.
///
/// # Examples
///
/// ```rust
/// use uamon::Config;
///
/// let config = Config::from_yaml(r#"
/// namespace: 2
/// monitors:
///   - name: Tank1
///     alarm_name: LevelAlarm
///     initial_value: 40.0
///     kind: exclusive_limit
///     limits: { low_low: 20.0, low: 30.0, high: 50.0, high_high: 80.0 }
/// "#).unwrap();
/// assert_eq!(config.monitors.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Namespace index for all created nodes
    #[serde(default = "default_namespace")]
    pub namespace: u16,

    /// Monitor declarations
    pub monitors: Vec<MonitorConfig>,
}

/// One monitor declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Browse name of the monitored variable
    pub name: String,

    /// Browse name of the condition instance
    #[serde(default = "default_alarm_name")]
    pub alarm_name: String,

    /// Initial monitored value
    #[serde(default)]
    pub initial_value: f64,

    /// Alarm family and its parameters
    #[serde(flatten)]
    pub kind: MonitorKind,
}

/// Alarm family selector with family-specific parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MonitorKind {
    /// Exclusive limit alarm on the raw value
    ExclusiveLimit {
        /// Threshold ladder
        limits: LimitsConfig,
    },
    /// Non-exclusive limit alarm on the raw value
    NonExclusiveLimit {
        /// Threshold ladder
        limits: LimitsConfig,
    },
    /// Deviation-from-setpoint limit alarm
    Deviation {
        /// Threshold ladder over the deviation
        limits: LimitsConfig,
        /// Initial setpoint value
        setpoint: f64,
    },
    /// Rate-of-change limit alarm
    RateOfChange {
        /// Threshold ladder over the per-notification delta
        limits: LimitsConfig,
    },
    /// Off-normal alarm family
    OffNormal {
        /// Initial normal value
        normal_value: f64,
        /// Concrete off-normal condition type
        #[serde(default = "default_off_normal_kind", rename = "off_normal_kind")]
        kind: OffNormalKind,
    },
    /// Discrete allowed-value-set alarm
    Discrete {
        /// Allowed values
        allowed: Vec<i64>,
    },
    /// Operator dialog condition
    Dialog {
        /// Prompt text
        prompt: String,
    },
    /// Expected-vs-actual discrepancy alarm
    Discrepancy {
        /// Initial expected value
        expected_value: f64,
    },
    /// Acknowledgeable condition (lifecycle methods only)
    Acknowledgeable,
}

/// Threshold ladder as written in configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// LowLow limit
    pub low_low: f64,
    /// Low limit
    pub low: f64,
    /// High limit
    pub high: f64,
    /// HighHigh limit
    pub high_high: f64,
}

impl LimitsConfig {
    /// Convert to runtime thresholds.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            low_low: self.low_low,
            low: self.low,
            high: self.high,
            high_high: self.high_high,
        }
    }
}

fn default_namespace() -> u16 {
    2
}

fn default_alarm_name() -> String {
    "Alarm".to_string()
}

fn default_off_normal_kind() -> OffNormalKind {
    OffNormalKind::OffNormal
}

impl Config {
    /// Parse and validate a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Structural validation beyond what serde enforces.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for monitor in &self.monitors {
            if monitor.name.is_empty() {
                return Err(UaError::Config("monitor name must not be empty".to_string()));
            }
            if !seen.insert(monitor.name.as_str()) {
                return Err(UaError::Config(format!(
                    "duplicate monitor name '{}'",
                    monitor.name
                )));
            }
            match &monitor.kind {
                MonitorKind::ExclusiveLimit { limits }
                | MonitorKind::NonExclusiveLimit { limits }
                | MonitorKind::Deviation { limits, .. }
                | MonitorKind::RateOfChange { limits } => limits.thresholds().validate()?,
                MonitorKind::Discrete { allowed } => {
                    if allowed.is_empty() {
                        return Err(UaError::Config(format!(
                            "discrete alarm '{}' needs at least one allowed value",
                            monitor.name
                        )));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}
