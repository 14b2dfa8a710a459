pub mod analyze;
pub mod cache;
pub mod chart;
pub mod event;
pub mod profile;
