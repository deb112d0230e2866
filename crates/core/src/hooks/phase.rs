//! Container lifecycle phases that trigger hooks

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

/// Lifecycle point at which the hook directory is run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// After namespace/cgroup setup, before the user workload starts.
    /// Hooks run in ascending name order.
    Prestart,
    /// After the workload's init process exits. Hooks run in reverse order.
    Poststop,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Prestart, Phase::Poststop];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Prestart => "prestart",
            Phase::Poststop => "poststop",
        }
    }

    /// Match an exact phase name. Anything else is `None`.
    pub fn from_name(name: &str) -> Option<Phase> {
        Phase::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// Resolve the phase from the name the program was invoked under
    /// (`argv[0]`), e.g. a `prestart` symlink pointing at the binary.
    pub fn from_invocation(arg0: &OsStr) -> Option<Phase> {
        Path::new(arg0)
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(Phase::from_name)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
