//! Logging setup for the hook runner
//!
//! The runner is started by the container runtime, usually with no terminal
//! attached, so records go to syslog by default. `stderr` and `file` sinks
//! are available for debugging.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::{LogSink, LoggingConfig};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over everything; otherwise `verbose` selects `debug` and
/// the configured level applies.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let log_level = if verbose {
        "debug"
    } else {
        config.level.as_str()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match config.sink {
        LogSink::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogSink::File => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.file)
                .with_context(|| format!("Failed to open log file {}", config.file))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        LogSink::Syslog => match syslog::Syslog::connect(&config.ident) {
            Ok(writer) => builder
                .with_ansi(false)
                .without_time()
                .with_target(false)
                .with_level(false)
                .with_writer(writer)
                .try_init(),
            Err(e) => {
                let installed = builder.with_writer(std::io::stderr).try_init();
                tracing::warn!("syslog unavailable, logging to stderr: {}", e);
                installed
            }
        },
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))
}

/// Like [`init`], but a sink that cannot be set up falls back to stderr.
///
/// The runner must still drain stdin and report through its exit status
/// when the configured sink is broken, so this never fails.
pub fn init_or_stderr(config: &LoggingConfig, verbose: bool) {
    let Err(e) = init(config, verbose) else {
        return;
    };
    let fallback = LoggingConfig {
        sink: LogSink::Stderr,
        ..config.clone()
    };
    match init(&fallback, verbose) {
        Ok(()) => tracing::warn!("{:#}; logging to stderr", e),
        Err(_) => eprintln!("docker-hooks: {:#}", e),
    }
}

/// Syslog severities used by the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Err = 3,
    Warning = 4,
    Notice = 5,
    Debug = 7,
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::ERROR => Severity::Err,
            Level::WARN => Severity::Warning,
            Level::INFO => Severity::Notice,
            _ => Severity::Debug,
        }
    }
}

#[cfg(unix)]
pub mod syslog {
    //! RFC 3164 records over the local `/dev/log` datagram socket

    use std::io::{self, Write};
    use std::os::unix::net::UnixDatagram;
    use std::path::Path;
    use std::sync::Arc;

    use tracing::Metadata;
    use tracing_subscriber::fmt::MakeWriter;

    use super::Severity;

    pub const DEFAULT_SOCKET: &str = "/dev/log";

    /// `LOG_DAEMON`
    const FACILITY_DAEMON: u8 = 3;

    /// Longest message body sent; longer records are cut so the datagram
    /// stays within what syslog daemons accept
    pub const MAX_MESSAGE_LEN: usize = 2048;

    #[derive(Debug, Clone)]
    pub struct Syslog {
        socket: Arc<UnixDatagram>,
        ident: String,
        pid: u32,
    }

    impl Syslog {
        pub fn connect(ident: &str) -> io::Result<Self> {
            Self::connect_to(Path::new(DEFAULT_SOCKET), ident)
        }

        pub fn connect_to(socket_path: &Path, ident: &str) -> io::Result<Self> {
            let socket = UnixDatagram::unbound()?;
            socket.connect(socket_path)?;
            Ok(Self {
                socket: Arc::new(socket),
                ident: ident.to_string(),
                pid: std::process::id(),
            })
        }

        /// Start a record at the given severity; it is sent when dropped
        pub fn record(&self, severity: Severity) -> Record {
            let priority = FACILITY_DAEMON * 8 + severity as u8;
            Record {
                socket: Arc::clone(&self.socket),
                header: format!("<{}>{}[{}]: ", priority, self.ident, self.pid),
                buf: Vec::new(),
            }
        }
    }

    impl<'a> MakeWriter<'a> for Syslog {
        type Writer = Record;

        fn make_writer(&'a self) -> Self::Writer {
            self.record(Severity::Notice)
        }

        fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
            self.record(Severity::from(*meta.level()))
        }
    }

    /// One formatted event, buffered until drop
    pub struct Record {
        socket: Arc<UnixDatagram>,
        header: String,
        buf: Vec<u8>,
    }

    impl Write for Record {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for Record {
        fn drop(&mut self) {
            let mut message = self.buf.trim_ascii_end();
            if message.is_empty() {
                return;
            }
            message = &message[..message.len().min(MAX_MESSAGE_LEN)];
            let mut datagram = Vec::with_capacity(self.header.len() + message.len());
            datagram.extend_from_slice(self.header.as_bytes());
            datagram.extend_from_slice(message);
            // nowhere left to report a failed log write
            let _ = self.socket.send(&datagram);
        }
    }

}

#[cfg(not(unix))]
mod syslog {
    use std::io;

    pub struct Syslog;

    impl Syslog {
        pub fn connect(_ident: &str) -> io::Result<fn() -> io::Stderr> {
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "syslog is only available on unix",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(Severity::from(Level::ERROR), Severity::Err);
        assert_eq!(Severity::from(Level::WARN), Severity::Warning);
        assert_eq!(Severity::from(Level::INFO), Severity::Notice);
        assert_eq!(Severity::from(Level::DEBUG), Severity::Debug);
        assert_eq!(Severity::from(Level::TRACE), Severity::Debug);
    }

    #[test]
    fn test_unusable_file_sink_falls_back_to_stderr() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = LoggingConfig {
            sink: LogSink::File,
            file: temp_dir
                .path()
                .join("absent")
                .join("hooks.log")
                .to_string_lossy()
                .into_owned(),
            ..LoggingConfig::default()
        };

        assert!(init(&config, false).is_err());
        init_or_stderr(&config, false);
        assert!(tracing::dispatcher::has_been_set());
    }
}
