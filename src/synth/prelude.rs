// Shared imports for the synthesis modules

// fmt
pub use core::fmt;

// PI constants
pub use core::f64::consts::{PI, TAU};

// serde derives, only when the feature is on
#[cfg(feature = "serde")]
pub use serde::{Deserialize, Serialize};

/// Wraps an angle in radians into `[0, TAU)`.
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to TAU itself for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
