//! Sky coordinates
//!
//! A pair of axis angles, read as (RA, Dec) or (Az, Alt) depending on the
//! mount's tracking mode.

use std::fmt;

/// Normalize an angle into [0, 360)
pub fn normalize_degrees(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Normalize an angle into [-180, 180)
pub fn normalize_signed(angle: f64) -> f64 {
    let normalized = normalize_degrees(angle);
    if normalized >= 180.0 {
        normalized - 360.0
    } else {
        normalized
    }
}

/// Signed shortest rotation from `from` to `to`
///
/// A half-turn in either direction is always reported as +180.
pub fn shortest_delta(from: f64, to: f64) -> f64 {
    let delta = normalize_signed(to - from);
    if delta == -180.0 {
        180.0
    } else {
        delta
    }
}

/// Mount pointing on both axes, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyCoordinate {
    horizontal: f64,
    vertical: f64,
}

impl SkyCoordinate {
    /// Build a normalized coordinate
    ///
    /// `horizontal` (RA/Az) lands in [0, 360). `vertical` (Dec/Alt) is read as a
    /// signed angle, so 350 becomes -10, then clamped to the poles.
    pub fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal: normalize_degrees(horizontal),
            vertical: normalize_signed(vertical).clamp(-90.0, 90.0),
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// RA or Az, degrees
    pub fn horizontal(&self) -> f64 {
        self.horizontal
    }

    /// Dec or Alt, degrees
    pub fn vertical(&self) -> f64 {
        self.vertical
    }

    pub fn is_finite(&self) -> bool {
        self.horizontal.is_finite() && self.vertical.is_finite()
    }
}

impl Default for SkyCoordinate {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for SkyCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}°, {:.4}°)", self.horizontal, self.vertical)
    }
}
