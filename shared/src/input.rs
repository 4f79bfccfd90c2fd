//! Input session: pointer-lock state, key bindings and the pressed-action set.
//!
//! Events arrive from the host at arbitrary times. They only ever touch the
//! session (capture state, pressed actions) and the player's orientation,
//! never position or momentum.

use bevy::math::DVec2;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ControllerError;

/// Pointer deltas are reported in raw device units; sensitivity is per 1000.
pub const LOOK_SCALE: f64 = 1000.0;

/// Abstract movement command, decoupled from the key bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalAction {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
}

impl LogicalAction {
    pub const ALL: [LogicalAction; 4] = [
        LogicalAction::Forward,
        LogicalAction::Backward,
        LogicalAction::StrafeLeft,
        LogicalAction::StrafeRight,
    ];

    fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Contribution in the local (forward, strafe-left) plane.
    pub fn local_vector(self) -> DVec2 {
        match self {
            LogicalAction::Forward => DVec2::new(1.0, 0.0),
            LogicalAction::Backward => DVec2::new(-1.0, 0.0),
            LogicalAction::StrafeLeft => DVec2::new(0.0, 1.0),
            LogicalAction::StrafeRight => DVec2::new(0.0, -1.0),
        }
    }
}

/// Set of currently held movement actions. Holds each action at most once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PressedActions(u8);

impl PressedActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the action was already held.
    pub fn insert(&mut self, action: LogicalAction) -> bool {
        let was_held = self.contains(action);
        self.0 |= action.bit();
        !was_held
    }

    /// Returns `false` if the action was not held.
    pub fn remove(&mut self, action: LogicalAction) -> bool {
        let was_held = self.contains(action);
        self.0 &= !action.bit();
        was_held
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn contains(&self, action: LogicalAction) -> bool {
        self.0 & action.bit() != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = LogicalAction> + '_ {
        LogicalAction::ALL
            .into_iter()
            .filter(move |action| self.contains(*action))
    }
}

impl FromIterator<LogicalAction> for PressedActions {
    fn from_iter<I: IntoIterator<Item = LogicalAction>>(iter: I) -> Self {
        let mut set = PressedActions::new();
        for action in iter {
            set.insert(action);
        }
        set
    }
}

/// Key names bound to each action, as they appear in the config file.
///
/// Keys are single characters compared case-insensitively. The defaults are
/// the AZERTY layout (Z/Q/S/D) rather than WASD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "Z".to_string(),
            backward: "S".to_string(),
            left: "Q".to_string(),
            right: "D".to_string(),
        }
    }
}

impl KeyBindings {
    /// Validates the bindings and builds the lookup table used at runtime.
    pub fn compile(&self) -> Result<KeyMap, ControllerError> {
        let entries = [
            ("controls.forward", &self.forward, LogicalAction::Forward),
            ("controls.backward", &self.backward, LogicalAction::Backward),
            ("controls.left", &self.left, LogicalAction::StrafeLeft),
            ("controls.right", &self.right, LogicalAction::StrafeRight),
        ];

        let mut map = Vec::with_capacity(entries.len());
        for (field, key, action) in entries {
            let key = normalize_key(key);
            if key.chars().count() != 1 {
                return Err(ControllerError::invalid(
                    field,
                    format!("expected a single character, got {key:?}"),
                ));
            }
            if let Some((_, other)) = map.iter().find(|(bound, _)| *bound == key) {
                return Err(ControllerError::invalid(
                    field,
                    format!("key {key:?} is already bound to {other:?}"),
                ));
            }
            map.push((key, action));
        }

        Ok(KeyMap { entries: map })
    }
}

/// Validated physical-key to action table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    entries: Vec<(String, LogicalAction)>,
}

impl KeyMap {
    pub fn action_for(&self, key: &str) -> Option<LogicalAction> {
        let key = normalize_key(key);
        self.entries
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, action)| *action)
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_uppercase()
}

/// Capture-request source events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    /// The user made the gesture that asks for pointer lock (a click).
    Requested,
    /// The host granted or revoked pointer lock.
    Changed(bool),
}

/// Raw relative pointer movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMotion {
    pub delta: DVec2,
}

/// Key source events, carrying the key's text as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Pointer-lock activation plus the live pressed-action set.
#[derive(Debug, Clone, Default)]
pub struct InputSession {
    active: bool,
    capture_requested: bool,
    pressed: PressedActions,
}

impl InputSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn pressed(&self) -> &PressedActions {
        &self.pressed
    }

    /// Records a user gesture asking for pointer capture.
    pub fn request_capture(&mut self) {
        if self.active {
            return;
        }
        self.capture_requested = true;
    }

    /// Hands a pending capture request to the host, at most once.
    pub fn take_capture_request(&mut self) -> bool {
        std::mem::take(&mut self.capture_requested)
    }

    /// Capture state notification from the host.
    ///
    /// Any change clears the pressed set, so keys held while focus moved away
    /// cannot stay stuck.
    pub fn capture_changed(&mut self, active: bool) {
        if active != self.active {
            debug!(
                "pointer capture {}",
                if active { "acquired" } else { "released" }
            );
        }
        self.active = active;
        self.capture_requested = false;
        self.pressed.clear();
    }

    /// Returns `true` if the pressed set changed.
    pub fn press(&mut self, action: LogicalAction) -> bool {
        self.active && self.pressed.insert(action)
    }

    /// Returns `true` if the pressed set changed.
    pub fn release(&mut self, action: LogicalAction) -> bool {
        self.active && self.pressed.remove(action)
    }
}
