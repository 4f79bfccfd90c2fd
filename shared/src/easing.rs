//! Exponential ease-out curve used to shape speed ramps.
//!
//! The momentum model steps linearly in the inverse domain of this curve, so
//! speed rises quickly near zero and settles into the cap.

/// `1 - 2^(-10x)`, pinned to exactly 1 at `x == 1`.
pub fn ease_out_expo(x: f64) -> f64 {
    if x == 1.0 {
        1.0
    } else {
        1.0 - 2f64.powf(-10.0 * x)
    }
}

/// Inverse of [`ease_out_expo`] on `[0, 1)`, pinned to 1 at `y == 1`.
pub fn ease_out_expo_inverse(y: f64) -> f64 {
    if y == 1.0 {
        1.0
    } else {
        (1.0 - y).log2() / -10.0
    }
}
