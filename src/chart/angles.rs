//! Angular arithmetic shared by chart computation and rendering.
//!
//! Everything here operates on ecliptic longitudes in degrees. Inputs are
//! normalized with `rem_euclid(360.0)` so negative or oversized values are
//! handled uniformly.

use serde::{Deserialize, Serialize};

use crate::chart::types::{AspectType, ZodiacSign, ASPECT_ORB, ASPECT_ORDER};

/// A longitude decomposed into its 30° zodiac segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignPosition {
    pub sign: ZodiacSign,
    /// Degrees within the sign, `[0, 30)`.
    pub degree: f64,
}

/// Decompose an ecliptic longitude into sign and within-sign degree.
pub fn degree_to_sign(longitude: f64) -> SignPosition {
    let normalized = longitude.rem_euclid(360.0);
    let sign = ZodiacSign::from_index((normalized / 30.0).floor() as usize);
    SignPosition {
        sign,
        degree: normalized % 30.0,
    }
}

/// Shortest angular distance between two longitudes, in `[0, 180]`.
pub fn angular_separation(a: f64, b: f64) -> f64 {
    let diff = (a.rem_euclid(360.0) - b.rem_euclid(360.0)).abs();
    diff.min(360.0 - diff)
}

/// Match the separation of two longitudes against the canonical aspect
/// angles. Angles are checked in [`ASPECT_ORDER`]; the first one within the
/// 8° tolerance wins, so a pair yields at most one aspect.
pub fn match_aspect(a: f64, b: f64) -> Option<(AspectType, f64)> {
    let separation = angular_separation(a, b);
    for aspect in ASPECT_ORDER {
        let orb = (separation - aspect.angle()).abs();
        if orb <= ASPECT_ORB {
            return Some((aspect, orb));
        }
    }
    None
}
