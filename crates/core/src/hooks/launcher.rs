//! One-shot hook process launch

use std::ffi::OsString;
use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::discovery::HookDescriptor;
use super::error::HookError;
use super::payload::LifecyclePayload;

/// Starts a hook and hands it the payload
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Launch `hook` with `args` as its full argument vector (including
    /// argv[0]) and deliver `payload` on its stdin.
    ///
    /// Returns once the payload is written; the hook is not awaited.
    async fn launch(
        &self,
        hook: &HookDescriptor,
        payload: &LifecyclePayload,
        args: &[OsString],
    ) -> Result<(), HookError>;
}

/// Launches hooks as detached OS processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(
        &self,
        hook: &HookDescriptor,
        payload: &LifecyclePayload,
        args: &[OsString],
    ) -> Result<(), HookError> {
        info!("FILE RUN: {}", hook.path.display());

        let mut command = Command::new(&hook.path);
        if let Some((arg0, rest)) = args.split_first() {
            #[cfg(unix)]
            command.arg0(arg0);
            #[cfg(not(unix))]
            let _ = arg0;
            command.args(rest);
        }
        command.stdin(Stdio::piped()).kill_on_drop(false);

        let mut child = command.spawn().map_err(|source| HookError::Launch {
            path: hook.path.clone(),
            source,
        })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            HookError::io(
                format!("stdin pipe unavailable for {}", hook.path.display()),
                io::Error::new(io::ErrorKind::BrokenPipe, "no stdin handle"),
            )
        })?;

        let delivered = async {
            stdin.write_all(payload.as_bytes()).await?;
            stdin.flush().await
        }
        .await;
        // closing the pipe lets the hook see EOF
        drop(stdin);

        match delivered {
            Ok(()) => {}
            // the hook exited or closed stdin without reading it
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!(
                    "Hook {} declined the payload ({})",
                    hook.display_name(),
                    e
                );
            }
            Err(source) => {
                return Err(HookError::Transfer {
                    path: hook.path.clone(),
                    source,
                });
            }
        }

        debug!(
            "Hook {} started (pid {:?}), {} payload bytes",
            hook.display_name(),
            child.id(),
            payload.len()
        );

        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_script(dir: &Path, name: &str, body: &str) -> HookDescriptor {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        HookDescriptor::new(dir, name, true)
    }

    async fn wait_for(path: &Path) -> String {
        for _ in 0..100 {
            if let Ok(content) = fs::read_to_string(path)
                && content.ends_with("END\n")
            {
                return content;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("hook never wrote {}", path.display());
    }

    #[tokio::test]
    async fn test_launch_forwards_payload_and_args() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let hook = write_script(
            temp_dir.path(),
            "01-net",
            &format!(
                "{{ echo \"$@\"; cat; echo; echo END; }} > {}.tmp && mv {}.tmp {}",
                out.display(),
                out.display(),
                out.display()
            ),
        );
        let payload = LifecyclePayload::from(&b"{\"id\":\"abc\"}"[..]);
        let args: Vec<OsString> = ["prestart", "--bundle", "/run/c1"]
            .into_iter()
            .map(OsString::from)
            .collect();

        ProcessLauncher.launch(&hook, &payload, &args).await.unwrap();

        let content = wait_for(&out).await;
        let lines: Vec<&str> = content.lines().collect();
        // argv[0] is replaced by the interpreter for scripts; the rest is verbatim
        assert_eq!(lines[0], "--bundle /run/c1");
        assert_eq!(lines[1], "{\"id\":\"abc\"}");
    }

    #[tokio::test]
    async fn test_launch_hook_ignoring_stdin() {
        let temp_dir = TempDir::new().unwrap();
        let hook = write_script(temp_dir.path(), "01-notify", "exit 0");
        // larger than a pipe buffer, so the write outlives the hook
        let payload = LifecyclePayload::new(vec![b'x'; 512 * 1024]);

        for _ in 0..5 {
            ProcessLauncher.launch(&hook, &payload, &[]).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_launch_missing_executable() {
        let hook = HookDescriptor::new(Path::new("/nonexistent/hooks.d"), "01-net", true);
        let err = ProcessLauncher
            .launch(&hook, &LifecyclePayload::empty(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, HookError::Launch { .. }));
    }

    #[tokio::test]
    async fn test_launch_without_execute_permission() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("01-net");
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
        let hook = HookDescriptor::new(temp_dir.path(), "01-net", true);

        let err = ProcessLauncher
            .launch(&hook, &LifecyclePayload::empty(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, HookError::Launch { .. }));
    }
}
