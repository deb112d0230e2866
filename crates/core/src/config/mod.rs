use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::env::{DOCKER_HOOKS_CONFIG, DOCKER_HOOKS_DIR, DOCKER_HOOKS_LOG_SINK};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/docker-hooks/config.toml";

/// Well-known directory holding the installed hook executables
pub const DEFAULT_HOOKS_DIR: &str = "/usr/libexec/docker/hooks.d";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// File this config was read from, if any (not serialized)
    #[serde(skip)]
    pub source: Option<PathBuf>,

    #[serde(default)]
    pub hooks: HooksConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HooksConfig {
    /// Directory scanned for hook executables
    #[serde(default = "default_hooks_dir")]
    pub dir: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSink {
    #[default]
    Syslog,
    Stderr,
    File,
}

impl LogSink {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogSink::Syslog => "syslog",
            LogSink::Stderr => "stderr",
            LogSink::File => "file",
        }
    }
}

impl std::str::FromStr for LogSink {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "syslog" => Ok(LogSink::Syslog),
            "stderr" => Ok(LogSink::Stderr),
            "file" => Ok(LogSink::File),
            other => anyhow::bail!("Unknown log sink: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub sink: LogSink,

    /// Program tag attached to every syslog record
    #[serde(default = "default_log_ident")]
    pub ident: String,

    /// Log file used when `sink = "file"`
    #[serde(default = "default_log_file")]
    pub file: String,
}

// Default value functions
fn default_hooks_dir() -> String {
    DEFAULT_HOOKS_DIR.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_ident() -> String {
    "docker-hooks".to_string()
}
fn default_log_file() -> String {
    "/var/log/docker-hooks.log".to_string()
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            dir: default_hooks_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            sink: LogSink::default(),
            ident: default_log_ident(),
            file: default_log_file(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Resolution order for the file: `explicit` (usually `--config`), then
    /// `DOCKER_HOOKS_CONFIG`, then [`DEFAULT_CONFIG_PATH`]. A missing file is
    /// not an error; defaults apply. Env overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => std::env::var_os(DOCKER_HOOKS_CONFIG)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
        };

        let mut config = Self::load_from(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults plus the env overrides that parse. Used when the config file
    /// itself is unusable, so logging still reaches the requested sink.
    pub fn fallback() -> Self {
        Self::fallback_with(|key| std::env::var(key).ok())
    }

    fn fallback_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        // a bad override keeps the default for that key
        let _ = config.apply_overrides(lookup);
        config
    }

    /// Load configuration from a file without consulting the environment
    /// for overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        config.expand_env_vars();

        Ok(config)
    }

    /// Apply `DOCKER_HOOKS_*` overrides using the given variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DOCKER_HOOKS_DIR).filter(|d| !d.is_empty()) {
            self.hooks.dir = dir;
        }
        if let Some(sink) = lookup(DOCKER_HOOKS_LOG_SINK).filter(|s| !s.is_empty()) {
            self.logging.sink = sink.parse()?;
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) {
        self.hooks.dir = expand_path(&self.hooks.dir);
        self.logging.file = expand_path(&self.logging.file);
    }

    /// Directory scanned for hooks
    pub fn hooks_dir(&self) -> PathBuf {
        PathBuf::from(&self.hooks.dir)
    }

    pub fn get_value(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["hooks", "dir"] => Ok(self.hooks.dir.clone()),
            ["logging", "level"] => Ok(self.logging.level.clone()),
            ["logging", "sink"] => Ok(self.logging.sink.as_str().to_string()),
            ["logging", "ident"] => Ok(self.logging.ident.clone()),
            ["logging", "file"] => Ok(self.logging.file.clone()),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
    }
}

fn expand_path(s: &str) -> String {
    shellexpand::full(s)
        .map(|expanded| expanded.into_owned())
        .unwrap_or_else(|_| s.to_string())
}
