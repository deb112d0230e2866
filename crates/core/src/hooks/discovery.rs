//! Hook discovery from the hook directory

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::HookError;

/// One entry found in the hook directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookDescriptor {
    /// Base name of the entry; orders hooks and pairs them in poststop
    pub name: OsString,

    /// Full path the hook is launched from
    pub path: PathBuf,

    /// True only for ordinary files. Directories, symlinks, devices, sockets
    /// and fifos are listed but never launched.
    pub is_regular_executable: bool,
}

impl HookDescriptor {
    pub fn new(dir: &Path, name: impl Into<OsString>, is_regular_executable: bool) -> Self {
        let name = name.into();
        let path = dir.join(&name);
        Self {
            name,
            path,
            is_regular_executable,
        }
    }

    /// Check if this descriptor carries the given name
    pub fn has_name(&self, name: &OsStr) -> bool {
        self.name == name
    }

    pub fn display_name(&self) -> std::borrow::Cow<'_, str> {
        self.name.to_string_lossy()
    }
}

/// Source of hook listings.
///
/// Implementations must return entries sorted by name; the runner relies on
/// that order as the hook priority.
pub trait HookSource: Send + Sync {
    fn scan(&self) -> Result<Vec<HookDescriptor>, HookError>;
}

/// The on-disk hook directory
#[derive(Debug, Clone)]
pub struct HookDir {
    dir: PathBuf,
}

impl HookDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl HookSource for HookDir {
    fn scan(&self) -> Result<Vec<HookDescriptor>, HookError> {
        scan_hooks(&self.dir)
    }
}

/// List every entry of `dir`, sorted by file name.
///
/// Entry types are read without following symlinks. A missing or unreadable
/// directory is an error.
pub fn scan_hooks(dir: &Path) -> Result<Vec<HookDescriptor>, HookError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        HookError::io(format!("failed to read hook directory {}", dir.display()), e)
    })?;

    let mut hooks = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            HookError::io(format!("failed to list hook directory {}", dir.display()), e)
        })?;
        let file_type = entry.file_type().map_err(|e| {
            HookError::io(format!("failed to stat {}", entry.path().display()), e)
        })?;
        hooks.push(HookDescriptor::new(dir, entry.file_name(), file_type.is_file()));
    }

    hooks.sort_by(|a, b| a.name.cmp(&b.name));

    debug!(
        "Found {} entries ({} regular) in {}",
        hooks.len(),
        hooks.iter().filter(|h| h.is_regular_executable).count(),
        dir.display()
    );

    Ok(hooks)
}
