//! Speed and heading of the player, advanced once per frame along the easing curve.
//!
//! Speed is stored in world units, but every step converts it to the curve's
//! input domain, moves linearly there, and maps back. That gives a brisk start
//! and a soft landing on `running_speed` without any extra state.

use crate::config::MovementTuning;
use crate::easing::{ease_out_expo, ease_out_expo_inverse};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Momentum {
    /// Absolute world heading in radians. Only meaningful while `speed > 0`.
    pub direction: f64,
    /// Always within `[0, running_speed]`.
    pub speed: f64,
}

impl Momentum {
    /// Advance one frame.
    ///
    /// `heading` is the resolver output relative to `yaw`; `None` decays speed
    /// and keeps the last heading so the player glides to a stop.
    pub fn step(&mut self, heading: Option<f64>, yaw: f64, tuning: &MovementTuning, delta: f64) {
        let running_speed = tuning.running_speed;
        let ratio = (self.speed / running_speed).clamp(0.0, 1.0);
        let t = ease_out_expo_inverse(ratio);

        match heading {
            Some(heading) => {
                self.speed = if ratio >= 1.0 {
                    // The inverse maps 1 back to 1; stepping from there would dip below the cap.
                    running_speed
                } else {
                    let t = t + tuning.increment(tuning.acceleration, delta);
                    ease_out_expo(t) * running_speed
                };
                self.direction = yaw + heading;
            }
            None => {
                let t = (t - tuning.increment(tuning.deceleration, delta)).max(0.0);
                self.speed = ease_out_expo(t) * running_speed;
            }
        }
    }
}
