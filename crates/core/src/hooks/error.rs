//! Errors produced while discovering or launching hooks

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Any failure in the scan → order → launch chain. Every variant is fatal to
/// the phase that produced it.
#[derive(Debug, Error)]
pub enum HookError {
    /// Hook directory unreadable, payload unreadable, or stdin pipe missing
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The hook process could not be started
    #[error("failed to launch hook {}: {source}", path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The payload could not be written to a started hook's stdin
    #[error("failed to deliver payload to hook {}: {source}", path.display())]
    Transfer {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HookError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        HookError::Io {
            context: context.into(),
            source,
        }
    }

    /// Short machine-friendly label for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            HookError::Io { .. } => "io",
            HookError::Launch { .. } => "launch",
            HookError::Transfer { .. } => "transfer",
        }
    }
}
