//! The first-person controller the host owns and drives.
//!
//! Input handlers and `update` are the only entry points. Handlers mutate the
//! input session and orientation; `update` is the sole writer of position and
//! momentum.

use bevy::math::{DVec2, DVec3};
use bevy::prelude::*;

use crate::config::{positive, ControllerConfig};
use crate::error::ControllerError;
use crate::input::{CaptureEvent, InputSession, KeyEvent, KeyMap, PointerMotion};
use crate::player::{CameraTransform, PlayerState};

#[derive(Resource, Debug, Clone)]
pub struct FirstPersonController {
    player: PlayerState,
    session: InputSession,
    keys: KeyMap,
    look_sensitivity: f64,
}

/// Validate `config` and build a controller standing at the origin, facing -Z.
pub fn configure(config: &ControllerConfig) -> Result<FirstPersonController, ControllerError> {
    config.validate()?;
    let keys = config.controls.compile()?;

    info!(
        "Controller configured: accel {} decel {} speed {} sensitivity {} ramp {:?}",
        config.acceleration,
        config.deceleration,
        config.running_speed,
        config.look_sensitivity,
        config.ramp
    );

    Ok(FirstPersonController {
        player: PlayerState::new(config.movement(), config.height_offset),
        session: InputSession::new(),
        keys,
        look_sensitivity: config.look_sensitivity,
    })
}

impl FirstPersonController {
    pub fn with_position(mut self, position: DVec3) -> Self {
        self.player.position = position;
        self
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn session(&self) -> &InputSession {
        &self.session
    }

    pub fn look_sensitivity(&self) -> f64 {
        self.look_sensitivity
    }

    /// Retune look input while running. Rejects the same values `configure` does.
    pub fn set_look_sensitivity(&mut self, sensitivity: f64) -> Result<(), ControllerError> {
        positive("look_sensitivity", sensitivity)?;
        self.look_sensitivity = sensitivity;
        debug!("look sensitivity set to {sensitivity}");
        Ok(())
    }

    /// Pending capture request for the host to act on, handed out once.
    pub fn take_capture_request(&mut self) -> bool {
        self.session.take_capture_request()
    }

    pub fn handle_capture(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::Requested => self.session.request_capture(),
            CaptureEvent::Changed(active) => self.session.capture_changed(active),
        }
    }

    /// Look input. Ignored unless the pointer is captured.
    pub fn handle_pointer(&mut self, motion: PointerMotion) {
        if !self.session.is_active() {
            return;
        }
        self.player
            .orientation
            .apply_look(motion.delta, self.look_sensitivity);
    }

    /// Movement key input. Unbound keys and keys while uncaptured are ignored.
    pub fn handle_key(&mut self, event: &KeyEvent) {
        let (key, pressed) = match event {
            KeyEvent::Pressed(key) => (key, true),
            KeyEvent::Released(key) => (key, false),
        };
        let Some(action) = self.keys.action_for(key) else {
            return;
        };
        if pressed {
            self.session.press(action);
        } else {
            self.session.release(action);
        }
    }

    /// Shorthand for `handle_pointer` with a bare delta.
    pub fn look(&mut self, delta: DVec2) {
        self.handle_pointer(PointerMotion { delta });
    }

    /// Advance one rendered frame. Call at most once per frame.
    pub fn update(&mut self, delta_seconds: f64) -> CameraTransform {
        self.player.step(self.session.pressed(), delta_seconds)
    }

    pub fn camera_transform(&self) -> CameraTransform {
        self.player.camera_transform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::LogicalAction;
    use std::f64::consts::FRAC_PI_2;

    fn scenario_config() -> ControllerConfig {
        ControllerConfig {
            acceleration: 0.35,
            deceleration: 0.5,
            running_speed: 2.6,
            height_offset: 1.8,
            ..Default::default()
        }
    }

    fn captured(config: &ControllerConfig) -> FirstPersonController {
        let mut controller = configure(config).unwrap();
        controller.handle_capture(CaptureEvent::Changed(true));
        controller
    }

    fn press(controller: &mut FirstPersonController, key: &str) {
        controller.handle_key(&KeyEvent::Pressed(key.to_string()));
    }

    #[test]
    fn test_configure_rejects_invalid() {
        let config = ControllerConfig {
            running_speed: 0.0,
            ..Default::default()
        };
        let err = configure(&config).unwrap_err();
        assert!(matches!(
            err,
            ControllerError::InvalidConfiguration {
                field: "running_speed",
                ..
            }
        ));
    }

    #[test]
    fn test_hold_forward_end_to_end() {
        let mut controller = captured(&scenario_config());
        press(&mut controller, "z");

        let mut prev_speed = 0.0;
        let mut prev_z = 0.0;
        for _ in 0..10 {
            let camera = controller.update(1.0 / 60.0);
            let player = controller.player();
            let speed = player.momentum.speed;

            assert!(speed > prev_speed);
            assert!(speed <= 2.6);
            assert!(player.position.z < prev_z);
            assert!(player.position.x.abs() < 1e-9);
            assert!((camera.position.y - 1.8).abs() < 1e-12);
            assert_eq!(camera.position.z, player.position.z);

            prev_speed = speed;
            prev_z = player.position.z;
        }
    }

    #[test]
    fn test_capture_loss_gives_pure_deceleration() {
        let mut controller = captured(&scenario_config());
        press(&mut controller, "Z");
        press(&mut controller, "Q");
        for _ in 0..5 {
            controller.update(1.0 / 60.0);
        }
        let direction = controller.player().momentum.direction;
        let speed = controller.player().momentum.speed;

        controller.handle_capture(CaptureEvent::Changed(false));
        assert!(controller.session().pressed().is_empty());

        controller.update(1.0 / 60.0);
        let momentum = controller.player().momentum;
        assert_eq!(momentum.direction, direction);
        assert!(momentum.speed < speed);
    }

    #[test]
    fn test_repeated_key_down_is_idempotent() {
        let mut controller = captured(&scenario_config());
        press(&mut controller, "d");
        press(&mut controller, "D");
        assert_eq!(controller.session().pressed().len(), 1);
        controller.handle_key(&KeyEvent::Released("d".to_string()));
        assert_eq!(controller.session().pressed().len(), 0);
    }

    #[test]
    fn test_input_ignored_until_captured() {
        let mut controller = configure(&scenario_config()).unwrap();
        press(&mut controller, "z");
        controller.look(DVec2::new(500.0, 500.0));
        assert!(controller.session().pressed().is_empty());
        assert_eq!(controller.player().orientation.yaw, 0.0);
        assert_eq!(controller.player().orientation.pitch, 0.0);

        controller.update(1.0 / 60.0);
        assert_eq!(controller.player().position, DVec3::ZERO);
    }

    #[test]
    fn test_unbound_keys_ignored() {
        let mut controller = captured(&scenario_config());
        press(&mut controller, "w");
        press(&mut controller, "Escape");
        assert!(controller.session().pressed().is_empty());
    }

    #[test]
    fn test_look_clamps_pitch() {
        let mut controller = captured(&scenario_config());
        for _ in 0..50 {
            controller.look(DVec2::new(0.0, 300.0));
        }
        assert_eq!(controller.player().orientation.pitch, -FRAC_PI_2);
        for _ in 0..100 {
            controller.look(DVec2::new(0.0, -300.0));
        }
        assert_eq!(controller.player().orientation.pitch, FRAC_PI_2);
    }

    #[test]
    fn test_capture_request_flow() {
        let mut controller = configure(&scenario_config()).unwrap();
        controller.handle_capture(CaptureEvent::Requested);
        assert!(controller.take_capture_request());
        assert!(!controller.session().is_active());

        controller.handle_capture(CaptureEvent::Changed(true));
        assert!(controller.session().is_active());
        assert!(!controller.take_capture_request());
    }

    #[test]
    fn test_strafe_keys_follow_bindings() {
        let config = ControllerConfig {
            controls: crate::input::KeyBindings {
                forward: "w".to_string(),
                backward: "s".to_string(),
                left: "a".to_string(),
                right: "d".to_string(),
            },
            ..scenario_config()
        };
        let mut controller = captured(&config);
        press(&mut controller, "A");
        assert!(controller
            .session()
            .pressed()
            .contains(LogicalAction::StrafeLeft));
    }

    #[test]
    fn test_set_look_sensitivity() {
        let mut controller = captured(&scenario_config());
        controller.set_look_sensitivity(3.0).unwrap();
        controller.look(DVec2::new(-100.0, 0.0));
        assert!((controller.player().orientation.yaw - 0.3).abs() < 1e-12);

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = controller.set_look_sensitivity(bad).unwrap_err();
            assert_eq!(err.field(), Some("look_sensitivity"));
        }
        assert_eq!(controller.look_sensitivity(), 3.0);
    }

    #[test]
    fn test_spawn_position() {
        let controller = configure(&scenario_config())
            .unwrap()
            .with_position(DVec3::new(2.0, 0.0, -3.0));
        let camera = controller.camera_transform();
        assert_eq!(camera.position, DVec3::new(2.0, 1.8, -3.0));
    }
}
