//! Hook lifecycle runner

use std::ffi::OsString;
use std::path::Path;

use tracing::debug;

use super::discovery::{HookDescriptor, HookDir, HookSource};
use super::error::HookError;
use super::launcher::{Launcher, ProcessLauncher};
use super::payload::LifecyclePayload;
use super::phase::Phase;

/// Hook engine that orders and launches the hooks of one lifecycle phase.
///
/// Hooks run strictly one after another. The first failure aborts the phase;
/// hooks already launched are not rolled back.
pub struct HookEngine<S = HookDir, L = ProcessLauncher> {
    source: S,
    launcher: L,
    /// Argument vector forwarded verbatim to every hook
    args: Vec<OsString>,
}

impl HookEngine {
    /// Create an engine over an on-disk hook directory, launching real
    /// processes that receive `args` as their argument vector
    pub fn new(dir: &Path, args: Vec<OsString>) -> Self {
        Self::with_parts(HookDir::new(dir), ProcessLauncher, args)
    }
}

impl<S: HookSource, L: Launcher> HookEngine<S, L> {
    pub fn with_parts(source: S, launcher: L, args: Vec<OsString>) -> Self {
        Self {
            source,
            launcher,
            args,
        }
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Hooks `phase` would launch, in launch order.
    ///
    /// Prestart keeps the scan order. Poststop walks the listing backwards
    /// and, for each position, launches every regular entry sharing that
    /// position's name; with unique names that is exactly the reverse of
    /// prestart, and a name listed k times yields k*k launches.
    pub fn plan(&self, phase: Phase) -> Result<Vec<HookDescriptor>, HookError> {
        let hooks = self.source.scan()?;

        let ordered = match phase {
            Phase::Prestart => hooks
                .iter()
                .filter(|h| h.is_regular_executable)
                .cloned()
                .collect(),
            Phase::Poststop => {
                let mut ordered = Vec::new();
                for position in hooks.iter().rev() {
                    ordered.extend(
                        hooks
                            .iter()
                            .filter(|h| h.is_regular_executable && h.has_name(&position.name))
                            .cloned(),
                    );
                }
                ordered
            }
        };

        Ok(ordered)
    }

    /// Run every hook of `phase` with `payload`, stopping at the first error
    pub async fn run(&self, phase: Phase, payload: &LifecyclePayload) -> Result<(), HookError> {
        let hooks = self.plan(phase)?;

        debug!("Running {} {} hook(s)", hooks.len(), phase);

        for hook in &hooks {
            self.launcher.launch(hook, payload, &self.args).await?;
        }

        Ok(())
    }

    pub async fn prestart(&self, payload: &LifecyclePayload) -> Result<(), HookError> {
        self.run(Phase::Prestart, payload).await
    }

    pub async fn poststop(&self, payload: &LifecyclePayload) -> Result<(), HookError> {
        self.run(Phase::Poststop, payload).await
    }
}
