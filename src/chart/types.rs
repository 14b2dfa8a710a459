//! Core chart type definitions.
//!
//! Defines [`Planet`] (the nine tracked bodies), [`ZodiacSign`],
//! [`AspectType`] (the four canonical angles), and the chart output
//! structures: [`PlanetPlacement`], [`Aspect`], [`HouseCusp`], and
//! [`ChartSnapshot`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The nine tracked chart bodies, in fixed computation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Planet {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    /// Rising point — reference angle for the house wheel.
    Ascendant,
    /// Midheaven (MC) — Ascendant + 90° in this model.
    Midheaven,
}

/// All bodies in the order placements are computed and emitted.
pub const PLANET_ORDER: [Planet; 9] = [
    Planet::Sun,
    Planet::Moon,
    Planet::Mercury,
    Planet::Venus,
    Planet::Mars,
    Planet::Jupiter,
    Planet::Saturn,
    Planet::Ascendant,
    Planet::Midheaven,
];

impl Planet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sun => "Sun",
            Self::Moon => "Moon",
            Self::Mercury => "Mercury",
            Self::Venus => "Venus",
            Self::Mars => "Mars",
            Self::Jupiter => "Jupiter",
            Self::Saturn => "Saturn",
            Self::Ascendant => "Ascendant",
            Self::Midheaven => "Midheaven",
        }
    }
}

impl std::fmt::Display for Planet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The twelve zodiac signs in canonical order starting at Aries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

const SIGN_ORDER: [ZodiacSign; 12] = [
    ZodiacSign::Aries,
    ZodiacSign::Taurus,
    ZodiacSign::Gemini,
    ZodiacSign::Cancer,
    ZodiacSign::Leo,
    ZodiacSign::Virgo,
    ZodiacSign::Libra,
    ZodiacSign::Scorpio,
    ZodiacSign::Sagittarius,
    ZodiacSign::Capricorn,
    ZodiacSign::Aquarius,
    ZodiacSign::Pisces,
];

impl ZodiacSign {
    /// Sign for a zero-based 30° segment index. Callers pass `0..=11`.
    pub fn from_index(index: usize) -> Self {
        SIGN_ORDER[index % 12]
    }

    /// Zero-based position in the canonical order (Aries = 0).
    pub fn index(&self) -> usize {
        SIGN_ORDER.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aries => "Aries",
            Self::Taurus => "Taurus",
            Self::Gemini => "Gemini",
            Self::Cancer => "Cancer",
            Self::Leo => "Leo",
            Self::Virgo => "Virgo",
            Self::Libra => "Libra",
            Self::Scorpio => "Scorpio",
            Self::Sagittarius => "Sagittarius",
            Self::Capricorn => "Capricorn",
            Self::Aquarius => "Aquarius",
            Self::Pisces => "Pisces",
        }
    }
}

impl std::fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four canonical aspect angles, in the fixed order they are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectType {
    Conjunction,
    Square,
    Trine,
    Opposition,
}

/// Match order: ascending canonical angle. A pair gets at most one aspect,
/// first angle within tolerance wins.
pub const ASPECT_ORDER: [AspectType; 4] = [
    AspectType::Conjunction,
    AspectType::Square,
    AspectType::Trine,
    AspectType::Opposition,
];

/// Tolerance window around each canonical angle, in degrees.
pub const ASPECT_ORB: f64 = 8.0;

impl AspectType {
    /// Exact angle of this aspect in degrees.
    pub fn angle(&self) -> f64 {
        match self {
            Self::Conjunction => 0.0,
            Self::Square => 90.0,
            Self::Trine => 120.0,
            Self::Opposition => 180.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conjunction => "conjunction",
            Self::Square => "square",
            Self::Trine => "trine",
            Self::Opposition => "opposition",
        }
    }
}

impl std::fmt::Display for AspectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's birth data — the sole input to chart computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthProfile {
    /// Birth instant, UTC.
    pub birth_instant: DateTime<Utc>,
    /// Birth latitude in `[-90, 90]`. Range validation is the caller's job.
    pub latitude: f64,
    /// Birth longitude in `[-180, 180]`.
    pub longitude: f64,
}

/// One body's position on the chart wheel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetPlacement {
    pub planet: Planet,
    /// Ecliptic longitude in `[0, 360)`.
    pub longitude: f64,
    pub sign: ZodiacSign,
    /// Degrees within the sign, `[0, 30)`.
    pub sign_degree: f64,
    /// Equal-house number, `1..=12`.
    pub house: u8,
}

/// A near-canonical angular relationship between two bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub a: Planet,
    pub b: Planet,
    pub aspect: AspectType,
    /// Deviation from the exact canonical angle, in degrees.
    pub orb: f64,
}

/// One of the twelve house cusps, evenly spaced from the Ascendant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseCusp {
    /// House number, `1..=12`.
    pub house: u8,
    /// Cusp ecliptic longitude in `[0, 360)`.
    pub longitude: f64,
    pub sign: ZodiacSign,
    pub sign_degree: f64,
}

/// A full chart computation result. Immutable once produced; a new profile
/// yields a new snapshot wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshot {
    pub profile: BirthProfile,
    pub julian_day: f64,
    /// One placement per tracked body, in [`PLANET_ORDER`].
    pub planets: Vec<PlanetPlacement>,
    pub aspects: Vec<Aspect>,
    /// Exactly twelve cusps, houses 1 through 12 in order.
    pub houses: Vec<HouseCusp>,
    pub computed_at: DateTime<Utc>,
}

impl ChartSnapshot {
    /// Look up the placement for a specific body.
    pub fn placement(&self, planet: Planet) -> Option<&PlanetPlacement> {
        self.planets.iter().find(|p| p.planet == planet)
    }
}
