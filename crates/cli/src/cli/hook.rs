use anyhow::{Context, Result};
use std::ffi::{OsStr, OsString};
use tracing::{Instrument, debug, error, info, info_span, warn};

use docker_hooks_core::config::Config;
use docker_hooks_core::hooks::{HookEngine, HookError, LifecyclePayload, Phase};
use docker_hooks_core::logging;
use docker_hooks_core::state::ContainerState;

use super::Cli;

/// Entry point for a lifecycle invocation.
///
/// Any failure is logged and terminates the process with status 1; the
/// runtime treats that as a failed lifecycle transition.
pub async fn run(phase: Phase, cli: &Cli, args: Vec<OsString>) -> Result<()> {
    let payload = read_payload().await;

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            logging::init_or_stderr(&Config::fallback().logging, cli.verbose);
            error!("ERROR: {:#}", e);
            std::process::exit(1);
        }
    };
    logging::init_or_stderr(&config.logging, cli.verbose);

    log_invocation(&args);

    let result = match payload {
        Ok(payload) => run_phase(phase, &config, &payload, args).await,
        Err(e) => Err(e).context("Failed to read container state from stdin"),
    };
    if let Err(e) = result {
        error!("ERROR: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Entry point when no lifecycle phase was selected: stdin is drained and
/// nothing runs. Nothing here can fail the invocation.
pub async fn ignore(requested: Option<&OsStr>, cli: &Cli, args: &[OsString]) -> Result<()> {
    let payload = read_payload().await;

    match cli.load_config() {
        Ok(config) => logging::init_or_stderr(&config.logging, cli.verbose),
        Err(e) => {
            logging::init_or_stderr(&Config::fallback().logging, cli.verbose);
            warn!("{:#}; using defaults", e);
        }
    }

    log_invocation(args);

    let requested = requested.map(OsStr::to_string_lossy).unwrap_or_default();
    match payload {
        Ok(payload) => debug!(
            "No lifecycle phase selected ({:?}); {} payload bytes discarded",
            requested,
            payload.len()
        ),
        Err(e) => debug!("No lifecycle phase selected ({:?}); stdin: {}", requested, e),
    }

    Ok(())
}

fn log_invocation(args: &[OsString]) {
    info!(
        "HOOKS: {}",
        args.first()
            .map(|arg0| arg0.to_string_lossy())
            .unwrap_or_default()
    );
}

/// Stdin is read before anything else can fail, so the runtime's write
/// never sees a closed pipe
async fn read_payload() -> Result<LifecyclePayload, HookError> {
    LifecyclePayload::read_from(&mut tokio::io::stdin()).await
}

async fn run_phase(
    phase: Phase,
    config: &Config,
    payload: &LifecyclePayload,
    args: Vec<OsString>,
) -> Result<()> {
    let span = match ContainerState::decode(payload.as_bytes()) {
        Ok(state) => {
            debug!(
                "Container {} (machine {} id {}), rootfs {}",
                state.id,
                state.machine_name(),
                state.machine_id(),
                state.config.rootfs
            );
            info_span!(
                "hooks",
                %phase,
                container = %state.id,
                pid = state.init_process_pid
            )
        }
        Err(e) => {
            debug!("Payload is not a container state ({}); forwarding as-is", e);
            info_span!("hooks", %phase)
        }
    };

    let engine = HookEngine::new(&config.hooks_dir(), args);
    engine
        .run(phase, payload)
        .instrument(span)
        .await
        .with_context(|| format!("{} hooks failed", phase))?;

    Ok(())
}
