//! Command-line front end for the fiber sweep engine
//!
//! Loads model and sweep descriptions, checks sweep readiness, and inspects
//! or converts saved sweep outputs. Physics is never computed here; running a
//! sweep needs an optical response implementation linked against
//! `fibersweep_core`.

pub mod commands;
pub mod config;
pub mod logging;

pub use config::{ConfigError, SweepFile, default_data_dir, load_model};
pub use logging::init_logging;
