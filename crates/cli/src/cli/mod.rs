pub mod config;
pub mod hook;
pub mod list;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use docker_hooks_core::config::Config;
use docker_hooks_core::hooks::Phase;

#[derive(Parser, Default)]
#[command(name = "docker-hooks")]
#[command(version, about = "Run container lifecycle hooks", long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Configuration file (default: $DOCKER_HOOKS_CONFIG or /etc/docker-hooks/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Hook directory (overrides config and $DOCKER_HOOKS_DIR)
    #[arg(long, global = true)]
    pub hooks_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run prestart hooks, forwarding stdin to each
    #[command(disable_help_flag = true)]
    Prestart(PhaseArgs),

    /// Run poststop hooks in reverse order, forwarding stdin to each
    #[command(disable_help_flag = true)]
    Poststop(PhaseArgs),

    /// Show the hooks a phase would launch, in launch order
    List(list::ListArgs),

    /// Inspect the resolved configuration
    Config(config::ConfigArgs),

    /// Any other phase name: stdin is consumed and nothing runs
    #[command(external_subcommand)]
    Other(Vec<OsString>),
}

#[derive(Args, Debug, Default)]
pub struct PhaseArgs {
    /// Extra runtime arguments; accepted and forwarded to hooks as part of argv
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub passthrough: Vec<OsString>,
}

impl Cli {
    /// Resolve the process arguments into a command line.
    ///
    /// Invoked under a phase name, the runtime's arguments are never handed
    /// to clap. Otherwise anything clap rejects is treated like an unknown
    /// phase: stdin is drained and nothing runs. Help and version requests
    /// are only honored for a terminal on stdin.
    pub fn from_args(args: &[OsString]) -> Self {
        if let Some(phase) = args.first().and_then(|arg0| Phase::from_invocation(arg0)) {
            return Self::for_phase(phase);
        }

        match Self::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) if is_display_request(e.kind()) && std::io::stdin().is_terminal() => e.exit(),
            Err(_) => Self::default(),
        }
    }

    /// Command line equivalent of being invoked under a phase name
    pub fn for_phase(phase: Phase) -> Self {
        let args = PhaseArgs::default();
        Self {
            command: Some(match phase {
                Phase::Prestart => Commands::Prestart(args),
                Phase::Poststop => Commands::Poststop(args),
            }),
            ..Self::default()
        }
    }

    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(ref dir) = self.hooks_dir {
            config.hooks.dir = dir.to_string_lossy().into_owned();
        }
        Ok(config)
    }
}

fn is_display_request(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_prestart_with_runtime_args() {
        let cli = Cli::try_parse_from(["docker-hooks", "prestart", "--bundle", "/run/c1"]).unwrap();
        match cli.command {
            Some(Commands::Prestart(args)) => {
                assert_eq!(args.passthrough, ["--bundle", "/run/c1"]);
            }
            _ => panic!("expected prestart"),
        }
    }

    #[test]
    fn test_unknown_phase_is_accepted() {
        let cli = Cli::try_parse_from(["docker-hooks", "poststart", "x"]).unwrap();
        match cli.command {
            Some(Commands::Other(args)) => assert_eq!(args, ["poststart", "x"]),
            _ => panic!("expected external subcommand"),
        }
    }

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_prestart_help_is_a_runtime_arg() {
        let cli = Cli::from_args(&os_args(&["docker-hooks", "prestart", "--help", "-h"]));
        match cli.command {
            Some(Commands::Prestart(args)) => assert_eq!(args.passthrough, ["--help", "-h"]),
            _ => panic!("expected prestart"),
        }
    }

    #[test]
    fn test_help_is_an_unknown_phase() {
        let cli = Cli::from_args(&os_args(&["docker-hooks", "help"]));
        assert!(matches!(cli.command, Some(Commands::Other(ref args)) if args == &["help"]));
    }

    #[test]
    fn test_rejected_args_run_nothing() {
        for args in [
            &["docker-hooks", "--bundle", "/run/c1"][..],
            &["docker-hooks", "-x"],
            &["docker-hooks", "list", "--phase", "poststart"],
        ] {
            let cli = Cli::from_args(&os_args(args));
            assert!(cli.command.is_none(), "{:?}", args);
        }
    }

    #[test]
    fn test_phase_name_in_argv0_skips_parsing() {
        let cli = Cli::from_args(&os_args(&["/usr/libexec/docker/hooks/prestart", "--help"]));
        assert!(matches!(cli.command, Some(Commands::Prestart(_))));
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::try_parse_from(["docker-hooks", "-v"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.verbose);
    }

    #[test]
    fn test_for_phase() {
        let cli = Cli::for_phase(Phase::Poststop);
        assert!(matches!(cli.command, Some(Commands::Poststop(_))));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_hooks_dir_overrides_config() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let cli = Cli::try_parse_from([
            "docker-hooks",
            "--config",
            temp_dir.path().join("absent.toml").to_str().unwrap(),
            "--hooks-dir",
            "/opt/hooks.d",
            "list",
        ])
        .unwrap();

        let config = cli.load_config().unwrap();
        assert_eq!(config.hooks_dir(), PathBuf::from("/opt/hooks.d"));
    }
}
