//! First-person locomotion core shared by the client and its tests.
//!
//! Turns pointer and keyboard input into an eased walk and a clamped look
//! orientation, one frame at a time. Rendering lives in the client; this crate
//! only produces the camera transform.

pub mod attach;
pub mod config;
pub mod controller;
pub mod direction;
pub mod easing;
pub mod error;
pub mod input;
pub mod momentum;
pub mod player;

pub use attach::{attach_input, BoxedSource, InputAttachment, InputClock, InputSource, Stamped};
pub use config::{ControllerConfig, MovementTuning, RampMode, REFERENCE_FRAME_RATE};
pub use controller::{configure, FirstPersonController};
pub use direction::resolve_direction;
pub use easing::{ease_out_expo, ease_out_expo_inverse};
pub use error::ControllerError;
pub use input::{
    CaptureEvent, InputSession, KeyBindings, KeyEvent, KeyMap, LogicalAction, PointerMotion,
    PressedActions, LOOK_SCALE,
};
pub use momentum::Momentum;
pub use player::{CameraTransform, Orientation, PlayerState};
