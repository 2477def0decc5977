//! Core library for the FleetMate yacht operations app.
//!
//! Two facades over one SQLite database: `integration` reads a job's
//! records across every module into a single view and pushes sync records
//! back out, while `analytics` tracks user actions and turns them into
//! patterns, suggestions, and usage reports. `db` owns persistence,
//! `domain` the shared vocabulary, and `config` the tunable thresholds.

pub mod analytics;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod integration;
mod migrations;

pub use config::PolicyConfig;
pub use db::FleetDb;
pub use error::{ApiError, CoreError};
