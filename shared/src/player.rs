//! Player state: position, look orientation and momentum, plus the per-frame step.

use std::f64::consts::FRAC_PI_2;

use bevy::math::{DVec2, DVec3};
use bevy::prelude::*;

use crate::config::MovementTuning;
use crate::direction::resolve_direction;
use crate::input::{PressedActions, LOOK_SCALE};
use crate::momentum::Momentum;

/// Look orientation. Roll is always zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    /// Radians around world up. Unbounded.
    pub yaw: f64,
    /// Radians around the local right axis, within `[-PI/2, PI/2]`.
    pub pitch: f64,
}

impl Orientation {
    /// Apply a raw pointer delta. Moving right turns right, moving down looks down.
    pub fn apply_look(&mut self, delta: DVec2, sensitivity: f64) {
        self.yaw -= delta.x * sensitivity / LOOK_SCALE;
        self.pitch = (self.pitch - delta.y * sensitivity / LOOK_SCALE)
            .clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Yaw first, then pitch about the resulting right axis. Reordering couples in roll.
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw as f32, self.pitch as f32, 0.0)
    }
}

/// What the rendering layer needs to place its camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    /// Eye position: player position raised by the height offset.
    pub position: DVec3,
    pub yaw: f64,
    pub pitch: f64,
}

impl CameraTransform {
    pub fn rotation(&self) -> Quat {
        Orientation {
            yaw: self.yaw,
            pitch: self.pitch,
        }
        .rotation()
    }

    pub fn to_transform(&self) -> Transform {
        Transform::from_translation(self.position.as_vec3()).with_rotation(self.rotation())
    }
}

#[derive(Debug, Clone)]
pub struct PlayerState {
    pub position: DVec3,
    pub orientation: Orientation,
    pub momentum: Momentum,
    height_offset: f64,
    tuning: MovementTuning,
}

impl PlayerState {
    pub fn new(tuning: MovementTuning, height_offset: f64) -> Self {
        Self {
            position: DVec3::ZERO,
            orientation: Orientation::default(),
            momentum: Momentum::default(),
            height_offset,
            tuning,
        }
    }

    /// Advance momentum from the held actions and integrate position.
    ///
    /// Orientation is read, never written: look input changes it between frames.
    pub fn step(&mut self, pressed: &PressedActions, delta: f64) -> CameraTransform {
        let delta = if delta.is_finite() && delta > 0.0 {
            delta
        } else {
            if delta != 0.0 {
                debug!("ignoring frame delta {delta}");
            }
            0.0
        };

        let heading = resolve_direction(pressed);
        self.momentum
            .step(heading, self.orientation.yaw, &self.tuning, delta);

        // Yaw zero faces -Z; positive headings turn towards -X.
        let distance = self.momentum.speed * delta;
        let (sin, cos) = self.momentum.direction.sin_cos();
        self.position.x -= distance * sin;
        self.position.z -= distance * cos;

        self.camera_transform()
    }

    pub fn camera_transform(&self) -> CameraTransform {
        CameraTransform {
            position: self.position + DVec3::Y * self.height_offset,
            yaw: self.orientation.yaw,
            pitch: self.orientation.pitch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RampMode;
    use crate::input::LogicalAction;
    use std::f64::consts::PI;

    fn player() -> PlayerState {
        PlayerState::new(
            MovementTuning {
                acceleration: 0.35,
                deceleration: 0.5,
                running_speed: 2.6,
                ramp: RampMode::PerFrame,
            },
            1.8,
        )
    }

    fn held(actions: &[LogicalAction]) -> PressedActions {
        actions.iter().copied().collect()
    }

    #[test]
    fn test_pitch_clamps_exactly() {
        let mut orientation = Orientation::default();
        for _ in 0..100 {
            orientation.apply_look(DVec2::new(0.0, -200.0), 1.5);
        }
        assert_eq!(orientation.pitch, FRAC_PI_2);

        for _ in 0..200 {
            orientation.apply_look(DVec2::new(0.0, 200.0), 1.5);
        }
        assert_eq!(orientation.pitch, -FRAC_PI_2);
    }

    #[test]
    fn test_yaw_is_unbounded() {
        let mut orientation = Orientation::default();
        for _ in 0..10 {
            orientation.apply_look(DVec2::new(-1000.0, 0.0), 1.0);
        }
        assert!((orientation.yaw - 10.0).abs() < 1e-12);
        assert_eq!(orientation.pitch, 0.0);
    }

    #[test]
    fn test_forward_moves_along_negative_z() {
        let mut player = player();
        let forward = held(&[LogicalAction::Forward]);
        for _ in 0..10 {
            player.step(&forward, 1.0 / 60.0);
        }
        assert!(player.position.z < 0.0);
        assert!(player.position.x.abs() < 1e-12);
        assert_eq!(player.position.y, 0.0);
    }

    #[test]
    fn test_strafe_left_moves_along_negative_x() {
        let mut player = player();
        let left = held(&[LogicalAction::StrafeLeft]);
        for _ in 0..10 {
            player.step(&left, 1.0 / 60.0);
        }
        assert!(player.position.x < 0.0);
        assert!(player.position.z.abs() < 1e-9);
    }

    #[test]
    fn test_backward_with_turned_yaw() {
        let mut player = player();
        player.orientation.yaw = PI / 2.0;
        let back = held(&[LogicalAction::Backward]);
        player.step(&back, 1.0 / 60.0);
        // Facing -X, so walking backward goes towards +X.
        assert!(player.position.x > 0.0);
        assert!(player.position.z.abs() < 1e-9);
    }

    #[test]
    fn test_camera_transform_adds_eye_height() {
        let mut player = player();
        player.position = DVec3::new(1.0, 2.0, 3.0);
        player.orientation = Orientation { yaw: 0.4, pitch: -0.2 };
        let camera = player.camera_transform();
        assert!(camera.position.abs_diff_eq(DVec3::new(1.0, 3.8, 3.0), 1e-12));
        assert_eq!(camera.yaw, 0.4);
        assert_eq!(camera.pitch, -0.2);
    }

    #[test]
    fn test_rotation_is_yaw_then_pitch() {
        let orientation = Orientation { yaw: 0.7, pitch: 0.3 };
        let expected = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(0.3);
        assert!(orientation.rotation().abs_diff_eq(expected, 1e-6));

        // Looking straight ahead at yaw zero faces -Z.
        let forward = Orientation::default().rotation() * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn test_bad_delta_does_not_move() {
        let mut player = player();
        let forward = held(&[LogicalAction::Forward]);
        player.step(&forward, 1.0 / 60.0);
        let before = player.position;
        player.step(&forward, -1.0);
        player.step(&forward, f64::NAN);
        assert_eq!(player.position, before);
    }
}
