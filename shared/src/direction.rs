//! Resolves the held movement actions into a heading relative to facing.

use std::f64::consts::PI;

use bevy::math::DVec2;

use crate::input::PressedActions;

/// Heading of the held movement actions relative to where the player faces.
///
/// `0` is straight ahead, positive angles turn left. Returns `None` when the
/// actions cancel out or nothing is held.
pub fn resolve_direction(pressed: &PressedActions) -> Option<f64> {
    let sum: DVec2 = pressed.iter().map(|action| action.local_vector()).sum();
    let (adjacent, opposite) = (sum.x, sum.y);

    if adjacent == 0.0 && opposite == 0.0 {
        return None;
    }
    // Pure backward is pinned to -PI rather than the +PI atan2 would give.
    if adjacent == -1.0 && opposite == 0.0 {
        return Some(-PI);
    }
    Some(opposite.atan2(adjacent))
}
