//! Simulation Configuration
//!
//! Physics and timing tunables. Every field has a default, so a JSON file
//! only needs to name the values it overrides.

use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::error::ConfigError;

/// Tunables for the frame loop and physics engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Downward acceleration added to velocity per second
    pub gravity: f32,
    /// Per-axis velocity magnitude cap
    pub terminal_velocity: f32,
    /// Velocity-to-pixels conversion (displacement = velocity * delta * unit_scale)
    pub unit_scale: f32,
    /// Downward probe distance used by the ground check
    pub ground_probe: f32,
    /// Margin added on every side for contact-damage touch checks
    pub touch_margin: f32,
    /// Upper bound on a single frame's delta (seconds)
    pub max_frame_delta: f32,
    /// Delta multiplier for enemies while slow motion is running
    pub slow_motion_factor: f32,
    /// How long the first demo screen is shown (seconds)
    pub demo_first_screen: f32,
    /// How long each later demo screen is shown (seconds)
    pub demo_screen: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: 7.5,
            terminal_velocity: 100.0,
            unit_scale: 100.0,
            ground_probe: 0.2,
            touch_margin: 0.2,
            max_frame_delta: 0.5,
            slow_motion_factor: 0.25,
            demo_first_screen: 1.0,
            demo_screen: 1.8,
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON, filling missing fields from defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reject values the physics engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame_delta <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "max_frame_delta",
                reason: format!("must be positive, got {}", self.max_frame_delta),
            });
        }
        if self.terminal_velocity <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "terminal_velocity",
                reason: format!("must be positive, got {}", self.terminal_velocity),
            });
        }
        if !(0.0..=1.0).contains(&self.slow_motion_factor) {
            return Err(ConfigError::Invalid {
                field: "slow_motion_factor",
                reason: format!("must be within [0, 1], got {}", self.slow_motion_factor),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = SimConfig::from_json_str(r#"{ "gravity": 9.0 }"#).unwrap();
        assert_eq!(config.gravity, 9.0);
        assert_eq!(config.terminal_velocity, 100.0);
        assert_eq!(config.max_frame_delta, 0.5);
    }

    #[test]
    fn test_rejects_non_positive_frame_delta() {
        let err = SimConfig::from_json_str(r#"{ "max_frame_delta": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_frame_delta", .. }));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.json");
        std::fs::write(&path, r#"{ "slow_motion_factor": 0.5 }"#).unwrap();

        let config = SimConfig::from_path(&path).unwrap();
        assert_eq!(config.slow_motion_factor, 0.5);
        assert!(SimConfig::from_path(dir.path().join("missing.json")).is_err());
    }
}
