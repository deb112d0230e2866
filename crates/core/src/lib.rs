//! docker-hooks core — hook discovery, lifecycle runner, config and logging.
//!
//! This crate holds everything the `docker-hooks` binary does apart from
//! argument parsing: it scans the hook directory, orders the hooks for a
//! lifecycle phase and launches them with the container state payload.

pub mod config;
pub mod env;
pub mod hooks;
pub mod logging;
pub mod state;

pub use config::Config;
