//! CLI `profile` commands — save and display the birth profile.

use anyhow::{ensure, Context, Result};
use chrono::{DateTime, Utc};

use lifechart::chart::BirthProfile;
use lifechart::config::LifechartConfig;
use lifechart::{db, profile};

/// Save (or overwrite) a user's birth profile. Validates coordinate ranges
/// at this boundary; the calculator itself assumes in-range inputs.
pub fn set(
    config: &LifechartConfig,
    user: &str,
    birthday: &str,
    latitude: f64,
    longitude: f64,
) -> Result<()> {
    ensure!(
        (-90.0..=90.0).contains(&latitude),
        "latitude must be in [-90, 90], got {latitude}"
    );
    ensure!(
        (-180.0..=180.0).contains(&longitude),
        "longitude must be in [-180, 180], got {longitude}"
    );

    let birth_instant = DateTime::parse_from_rfc3339(birthday)
        .context("birthday must be an RFC 3339 timestamp, e.g. 2000-06-15T08:30:00Z")?
        .with_timezone(&Utc);

    let conn = db::open_database(config.resolved_db_path())?;
    let birth_profile = BirthProfile {
        birth_instant,
        latitude,
        longitude,
    };
    profile::upsert_profile(&conn, user, &birth_profile)?;

    println!("Profile saved for {user}");
    println!("  Birth:     {birth_instant}");
    println!("  Latitude:  {latitude}");
    println!("  Longitude: {longitude}");
    Ok(())
}

/// Display a user's saved birth profile.
pub fn show(config: &LifechartConfig, user: &str) -> Result<()> {
    let conn = db::open_database(config.resolved_db_path())?;
    match profile::get_profile(&conn, user)? {
        Some(p) => {
            println!("Profile: {user}");
            println!("  Birth:     {}", p.birth_instant);
            println!("  Latitude:  {}", p.latitude);
            println!("  Longitude: {}", p.longitude);
        }
        None => println!("No profile saved for {user}"),
    }
    Ok(())
}
