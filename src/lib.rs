//! Life-archive journal core: natal chart computation and cached AI fate analysis.
//!
//! `lifechart` records life events alongside a birth profile and derives two
//! things from them:
//!
//! - a deterministic **chart snapshot** (planetary ecliptic longitudes, zodiac
//!   sign/degree/house placements, inter-planet aspects, twelve house cusps)
//!   computed from the birth instant and location, and
//! - an AI-generated **fate analysis** for four time horizons (past, next
//!   7 days, monthly, yearly), obtained from a generative-text endpoint and
//!   cached with fingerprint-based invalidation so unchanged inputs never
//!   trigger a second request.
//!
//! The chart math is an intentionally simplified linear model (mean solar
//! motion, fixed planetary offsets, equal houses) — deterministic and
//! self-contained rather than astronomically precise.
//!
//! # Architecture
//!
//! - **Storage**: SQLite holding the birth profile, life events, and the
//!   per-horizon analysis cache
//! - **Pipeline**: prompt builder → retrying HTTP transport → strict-JSON
//!   response normalizer, each independently testable
//! - **Caching**: lazy staleness detection via a fingerprint over
//!   {horizon, birthday, event count, time bucket, newest event timestamp}
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization and schema
//! - [`chart`] — Chart calculator: placements, aspects, house cusps
//! - [`analysis`] — Fate-analysis pipeline and cache store
//! - [`profile`] — Birth-profile persistence
//! - [`events`] — Life-event records and aggregates

pub mod analysis;
pub mod chart;
pub mod config;
pub mod db;
pub mod events;
pub mod profile;
