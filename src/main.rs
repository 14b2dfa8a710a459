mod cli;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

use lifechart::analysis::AnalysisKind;
use lifechart::config::LifechartConfig;

#[derive(Parser)]
#[command(name = "lifechart", version, about = "Natal chart and cached AI fate analysis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage the birth profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Record and list life events
    Event {
        #[command(subcommand)]
        action: EventAction,
    },
    /// Compute and display the natal chart
    Chart {
        #[arg(long, default_value = "default")]
        user: String,
    },
    /// Run the fate analysis (cache-aware)
    Analyze {
        #[arg(long, default_value = "default")]
        user: String,
        /// past, next7days, monthly, yearly, or all
        #[arg(long, default_value = "all")]
        kind: String,
        /// Invalidate the cache and recompute
        #[arg(long)]
        refresh: bool,
    },
    /// Inspect or clear the analysis cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Save the birth profile (birthday as RFC 3339, e.g. 2000-06-15T08:30:00Z)
    Set {
        #[arg(long, default_value = "default")]
        user: String,
        #[arg(long)]
        birthday: String,
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lon: f64,
    },
    /// Display the saved birth profile
    Show {
        #[arg(long, default_value = "default")]
        user: String,
    },
}

#[derive(Subcommand)]
enum EventAction {
    /// Record a life event
    Add {
        #[arg(long, default_value = "default")]
        user: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// RFC 3339 timestamp; defaults to now
        #[arg(long)]
        date: Option<String>,
    },
    /// List recorded events
    List {
        #[arg(long, default_value = "default")]
        user: String,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cached analyses and their fingerprints
    Inspect {
        #[arg(long, default_value = "default")]
        user: String,
    },
    /// Remove cached analyses (all horizons unless --kind is given)
    Clear {
        #[arg(long, default_value = "default")]
        user: String,
        #[arg(long)]
        kind: Option<String>,
    },
}

fn parse_kind(raw: &str) -> Result<Option<AnalysisKind>> {
    if raw == "all" {
        Ok(None)
    } else {
        AnalysisKind::from_str(raw).map(Some).map_err(|e| anyhow!(e))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = LifechartConfig::load()?;

    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Logged here, after the subscriber is installed, so it is not dropped.
    let config_path = lifechart::config::default_config_path();
    if !config_path.exists() {
        tracing::info!("no config file at {}, using defaults", config_path.display());
    }

    match cli.command {
        Command::Profile { action } => match action {
            ProfileAction::Set {
                user,
                birthday,
                lat,
                lon,
            } => cli::profile::set(&config, &user, &birthday, lat, lon)?,
            ProfileAction::Show { user } => cli::profile::show(&config, &user)?,
        },
        Command::Event { action } => match action {
            EventAction::Add {
                user,
                title,
                description,
                date,
            } => cli::event::add(&config, &user, &title, &description, date.as_deref())?,
            EventAction::List { user } => cli::event::list(&config, &user)?,
        },
        Command::Chart { user } => cli::chart::show(&config, &user)?,
        Command::Analyze {
            user,
            kind,
            refresh,
        } => {
            let kind = parse_kind(&kind)?;
            cli::analyze::run(&config, &user, kind, refresh).await?;
        }
        Command::Cache { action } => match action {
            CacheAction::Inspect { user } => cli::cache::inspect(&config, &user)?,
            CacheAction::Clear { user, kind } => {
                let kind = kind
                    .as_deref()
                    .map(|k| AnalysisKind::from_str(k).map_err(|e| anyhow!(e)))
                    .transpose()?;
                cli::cache::clear(&config, &user, kind)?;
            }
        },
    }

    Ok(())
}
