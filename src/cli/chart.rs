//! CLI `chart` command — compute and display the natal chart.

use anyhow::{Context, Result};

use lifechart::chart::compute_chart;
use lifechart::config::LifechartConfig;
use lifechart::{db, profile};

/// Compute the chart for a user's saved profile and print it.
pub fn show(config: &LifechartConfig, user: &str) -> Result<()> {
    let conn = db::open_database(config.resolved_db_path())?;
    let birth_profile = profile::get_profile(&conn, user)?
        .context("no birth profile saved; run `lifechart profile set` first")?;

    let chart = compute_chart(&birth_profile);

    println!("Chart for {user}");
    println!("{}", "=".repeat(50));
    println!("  Birth:      {}", chart.profile.birth_instant);
    println!("  Julian day: {:.5}", chart.julian_day);
    println!();
    println!("Placements:");
    for p in &chart.planets {
        println!(
            "  {:<10} {} {:>5.1}°  (house {})",
            p.planet.to_string(),
            p.sign,
            p.sign_degree,
            p.house
        );
    }

    if !chart.aspects.is_empty() {
        println!();
        println!("Aspects:");
        for a in &chart.aspects {
            println!("  {} {} {} (orb {:.1}°)", a.a, a.aspect, a.b, a.orb);
        }
    }

    println!();
    println!("House cusps:");
    for c in &chart.houses {
        println!("  {:>2}: {} {:>5.1}°", c.house, c.sign, c.sign_degree);
    }
    Ok(())
}
