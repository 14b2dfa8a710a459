//! Chart computation — the full pipeline from birth profile to snapshot.
//!
//! The model is a deliberate simplification: the Sun moves at the mean rate
//! of 0.9856°/day, every other planet sits at a fixed offset from the Sun,
//! and houses are equal 30° sectors from the Ascendant. It trades
//! astronomical accuracy for determinism and zero external data.

use chrono::{Datelike, Timelike, Utc};

use crate::chart::angles::degree_to_sign;
use crate::chart::types::{
    Aspect, BirthProfile, ChartSnapshot, HouseCusp, Planet, PlanetPlacement, PLANET_ORDER,
};

/// Mean solar motion in degrees per day.
const MEAN_DAILY_MOTION: f64 = 0.9856;

/// Fixed longitude offsets from the Sun for the non-luminary planets.
const PLANET_OFFSETS: [(Planet, f64); 6] = [
    (Planet::Moon, 120.0),
    (Planet::Mercury, 30.0),
    (Planet::Venus, 60.0),
    (Planet::Mars, 90.0),
    (Planet::Jupiter, 150.0),
    (Planet::Saturn, 210.0),
];

/// Convert a birth instant to a Julian Day number.
fn julian_day(profile: &BirthProfile) -> f64 {
    profile.birth_instant.timestamp_millis() as f64 / 86_400_000.0 + 2_440_587.5
}

/// Ascendant longitude from birth date, time of day, and birth longitude.
fn ascendant_longitude(profile: &BirthProfile) -> f64 {
    let instant = profile.birth_instant;
    let day_of_year = instant.ordinal() as f64;
    let hour_fraction = instant.hour() as f64 + instant.minute() as f64 / 60.0;
    (day_of_year * MEAN_DAILY_MOTION + hour_fraction * 15.0 + profile.longitude)
        .rem_euclid(360.0)
}

/// Equal-house number for a longitude, counted from the Ascendant.
fn house_of(longitude: f64, ascendant: f64) -> u8 {
    // rem_euclid can round to exactly 360.0 when the longitude sits a hair
    // below the ascendant; the modulo wraps that back into house 1.
    let diff = (longitude - ascendant).rem_euclid(360.0);
    ((diff / 30.0).floor() as u8 % 12) + 1
}

fn placement(planet: Planet, longitude: f64, house: u8) -> PlanetPlacement {
    let longitude = longitude.rem_euclid(360.0);
    let pos = degree_to_sign(longitude);
    PlanetPlacement {
        planet,
        longitude,
        sign: pos.sign,
        sign_degree: pos.degree,
        house,
    }
}

/// Compute a full chart snapshot from a birth profile.
///
/// Deterministic: identical inputs produce identical longitudes. Never fails
/// for finite inputs; degenerate dates yield degenerate but defined numbers.
pub fn compute_chart(profile: &BirthProfile) -> ChartSnapshot {
    let jd = julian_day(profile);
    let ascendant = ascendant_longitude(profile);

    let sun = (jd.rem_euclid(360.0) * MEAN_DAILY_MOTION).rem_euclid(360.0);
    let midheaven = (ascendant + 90.0).rem_euclid(360.0);

    let mut planets = Vec::with_capacity(PLANET_ORDER.len());
    planets.push(placement(Planet::Sun, sun, house_of(sun, ascendant)));
    for (planet, offset) in PLANET_OFFSETS {
        let lon = (sun + offset).rem_euclid(360.0);
        planets.push(placement(planet, lon, house_of(lon, ascendant)));
    }
    // Reference angles carry their traditional houses rather than the
    // equal-house formula result.
    planets.push(placement(Planet::Ascendant, ascendant, 1));
    planets.push(placement(Planet::Midheaven, midheaven, 10));

    let aspects = find_aspects(&planets);
    let houses = house_cusps(ascendant);

    ChartSnapshot {
        profile: profile.clone(),
        julian_day: jd,
        planets,
        aspects,
        houses,
        computed_at: Utc::now(),
    }
}

/// Scan every unordered pair of placements for a canonical aspect.
fn find_aspects(planets: &[PlanetPlacement]) -> Vec<Aspect> {
    let mut aspects = Vec::new();
    for i in 0..planets.len() {
        for j in (i + 1)..planets.len() {
            if let Some((aspect, orb)) =
                crate::chart::angles::match_aspect(planets[i].longitude, planets[j].longitude)
            {
                aspects.push(Aspect {
                    a: planets[i].planet,
                    b: planets[j].planet,
                    aspect,
                    orb,
                });
            }
        }
    }
    aspects
}

/// Twelve equal house cusps starting at the Ascendant.
fn house_cusps(ascendant: f64) -> Vec<HouseCusp> {
    (0..12u8)
        .map(|i| {
            let longitude = (ascendant + f64::from(i) * 30.0).rem_euclid(360.0);
            let pos = degree_to_sign(longitude);
            HouseCusp {
                house: i + 1,
                longitude,
                sign: pos.sign,
                sign_degree: pos.degree,
            }
        })
        .collect()
}
