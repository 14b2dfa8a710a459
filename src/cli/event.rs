//! CLI `event` commands — record and list life events.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use lifechart::config::LifechartConfig;
use lifechart::{db, events};

/// Record a life event. `date` defaults to now when omitted.
pub fn add(
    config: &LifechartConfig,
    user: &str,
    title: &str,
    description: &str,
    date: Option<&str>,
) -> Result<()> {
    let date = match date {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .context("date must be an RFC 3339 timestamp")?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let conn = db::open_database(config.resolved_db_path())?;
    let id = events::add_event(&conn, user, title, description, date)?;
    println!("Event {id} recorded for {user}");
    Ok(())
}

/// List a user's events, most recent first.
pub fn list(config: &LifechartConfig, user: &str) -> Result<()> {
    let conn = db::open_database(config.resolved_db_path())?;
    let events = events::list_events(&conn, user)?;

    if events.is_empty() {
        println!("No events recorded for {user}");
        return Ok(());
    }

    println!("Events for {user} ({} total):", events.len());
    for event in &events {
        let mut line = format!("  {} — {}", event.date.format("%Y-%m-%d"), event.title);
        if !event.description.is_empty() {
            line.push_str(": ");
            line.push_str(&event.description);
        }
        println!("{line}");
    }
    Ok(())
}
