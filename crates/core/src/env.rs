//! Environment variable constants used throughout the application.
//!
//! Centralized definition of all `DOCKER_HOOKS_*` environment variables to
//! ensure consistency and avoid hardcoded strings.

/// Configuration file path override (CLI arg default env)
pub const DOCKER_HOOKS_CONFIG: &str = "DOCKER_HOOKS_CONFIG";

/// Hook directory override (e.g. `/usr/libexec/docker/hooks.d`)
pub const DOCKER_HOOKS_DIR: &str = "DOCKER_HOOKS_DIR";

/// Log sink override: `syslog`, `stderr` or `file`
pub const DOCKER_HOOKS_LOG_SINK: &str = "DOCKER_HOOKS_LOG_SINK";
