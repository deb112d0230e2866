//! Container lifecycle hooks
//!
//! Hooks are executables installed in a single directory (by default
//! `/usr/libexec/docker/hooks.d`). They fire at two points in a container's
//! life:
//! - prestart: after namespaces and cgroups exist, before the workload runs
//! - poststop: after the workload's init process exits
//!
//! Prestart launches every regular file in ascending name order; poststop
//! walks the same listing in reverse, so a hook that sets something up is
//! torn down in LIFO order relative to the others.
//!
//! Each hook is started with the invoking process's own argument vector and
//! receives the container state payload on stdin. Hooks are not awaited.
//! The first launch or delivery failure aborts the whole phase.

mod discovery;
mod error;
mod launcher;
mod payload;
mod phase;
mod runner;

pub use discovery::{HookDescriptor, HookDir, HookSource, scan_hooks};
pub use error::HookError;
pub use launcher::{Launcher, ProcessLauncher};
pub use payload::LifecyclePayload;
pub use phase::Phase;
pub use runner::HookEngine;
