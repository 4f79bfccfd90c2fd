//! Controller tunables, loaded from RON.
//!
//! Defaults give a slow ramp to a 5 units/s walk with an eye height of 0.8.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ControllerError;
use crate::input::KeyBindings;

/// Frame rate the per-frame ramp values were tuned at.
pub const REFERENCE_FRAME_RATE: f64 = 60.0;

/// How the acceleration/deceleration increments relate to time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RampMode {
    /// Fixed increment per `update` call. The ramp speed depends on frame rate.
    #[default]
    PerFrame,
    /// Increment scaled by `delta * REFERENCE_FRAME_RATE`.
    PerSecond,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Step along the easing curve's input per accelerating frame.
    pub acceleration: f64,
    /// Step back along the easing curve's input per idle frame.
    pub deceleration: f64,
    /// Top speed in world units per second.
    pub running_speed: f64,
    pub look_sensitivity: f64,
    /// Eye height above the player position.
    pub height_offset: f64,
    pub ramp: RampMode,
    pub controls: KeyBindings,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            acceleration: 0.0035,
            deceleration: 0.005,
            running_speed: 5.0,
            look_sensitivity: 1.5,
            height_offset: 0.8,
            ramp: RampMode::PerFrame,
            controls: KeyBindings::default(),
        }
    }
}

/// Validated subset of the config consumed by the momentum model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementTuning {
    pub acceleration: f64,
    pub deceleration: f64,
    pub running_speed: f64,
    pub ramp: RampMode,
}

impl MovementTuning {
    /// Curve-domain step for this frame.
    pub fn increment(&self, amount: f64, delta: f64) -> f64 {
        match self.ramp {
            RampMode::PerFrame => amount,
            RampMode::PerSecond => amount * delta * REFERENCE_FRAME_RATE,
        }
    }
}

impl ControllerConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ControllerError> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ControllerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ControllerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&text)?;
        info!("Loaded controller config from {:?}", path);
        Ok(config)
    }

    /// Checks every tunable. Key bindings are checked by `KeyBindings::compile`.
    pub fn validate(&self) -> Result<(), ControllerError> {
        positive("acceleration", self.acceleration)?;
        positive("deceleration", self.deceleration)?;
        positive("running_speed", self.running_speed)?;
        positive("look_sensitivity", self.look_sensitivity)?;
        if !self.height_offset.is_finite() || self.height_offset < 0.0 {
            return Err(ControllerError::invalid(
                "height_offset",
                format!("must be a finite number >= 0, got {}", self.height_offset),
            ));
        }
        Ok(())
    }

    pub fn movement(&self) -> MovementTuning {
        MovementTuning {
            acceleration: self.acceleration,
            deceleration: self.deceleration,
            running_speed: self.running_speed,
            ramp: self.ramp,
        }
    }
}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<(), ControllerError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ControllerError::invalid(
            field,
            format!("must be a finite number > 0, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.controls.compile().is_ok());
    }

    #[test]
    fn test_non_positive_values_rejected() {
        let cases: [(&str, fn(&mut ControllerConfig)); 5] = [
            ("acceleration", |c| c.acceleration = 0.0),
            ("deceleration", |c| c.deceleration = -0.5),
            ("running_speed", |c| c.running_speed = f64::NAN),
            ("look_sensitivity", |c| c.look_sensitivity = 0.0),
            ("height_offset", |c| c.height_offset = -1.0),
        ];
        for (field, mutate) in cases {
            let mut config = ControllerConfig::default();
            mutate(&mut config);
            let err = config.validate().unwrap_err();
            assert_eq!(err.field(), Some(field));
        }
    }

    #[test]
    fn test_zero_height_offset_allowed() {
        let config = ControllerConfig {
            height_offset: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_ron_partial() {
        let config = ControllerConfig::from_ron_str(
            r#"(
                acceleration: 0.35,
                running_speed: 2.6,
                ramp: PerSecond,
                controls: (forward: "w", left: "a"),
            )"#,
        )
        .unwrap();
        assert_eq!(config.acceleration, 0.35);
        assert_eq!(config.running_speed, 2.6);
        assert_eq!(config.deceleration, ControllerConfig::default().deceleration);
        assert_eq!(config.ramp, RampMode::PerSecond);
        assert_eq!(config.controls.forward, "w");
        assert_eq!(config.controls.backward, "S");
    }

    #[test]
    fn test_from_ron_garbage() {
        let err = ControllerConfig::from_ron_str("(acceleration: \"fast\")").unwrap_err();
        assert!(matches!(err, ControllerError::ConfigParse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ControllerConfig::load("/definitely/not/here/controller.ron").unwrap_err();
        assert!(matches!(err, ControllerError::ConfigRead { .. }));
    }

    #[test]
    fn test_per_second_increment() {
        let tuning = ControllerConfig {
            ramp: RampMode::PerSecond,
            ..Default::default()
        }
        .movement();
        let one_frame = tuning.increment(0.3, 1.0 / 60.0);
        assert!((one_frame - 0.3).abs() < 1e-12);

        let tuning = ControllerConfig::default().movement();
        assert_eq!(tuning.increment(0.3, 1.0 / 144.0), 0.3);
    }
}
