//! Chart calculator: planetary placements, aspects, and house cusps.
//!
//! [`compute_chart`] is the single entry point. It is a pure function from a
//! [`BirthProfile`] to a [`ChartSnapshot`] — deterministic, no I/O, and it
//! never fails for finite inputs. The underlying model is deliberately
//! simplified: planet longitudes follow the mean solar motion with fixed
//! offsets, and houses are equal 30° sectors counted from the Ascendant.

pub mod angles;
pub mod compute;
pub mod types;

pub use angles::{angular_separation, degree_to_sign, match_aspect};
pub use compute::compute_chart;
pub use types::{
    Aspect, AspectType, BirthProfile, ChartSnapshot, HouseCusp, Planet, PlanetPlacement,
    ZodiacSign,
};
