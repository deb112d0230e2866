use anyhow::Result;
use clap::{Args, ValueEnum};

use docker_hooks_core::config::Config;
use docker_hooks_core::hooks::{HookEngine, Phase};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Phase whose launch order is shown
    #[arg(short, long, value_enum, default_value_t = PhaseArg::Prestart)]
    pub phase: PhaseArg,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PhaseArg {
    Prestart,
    Poststop,
}

impl From<PhaseArg> for Phase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Prestart => Phase::Prestart,
            PhaseArg::Poststop => Phase::Poststop,
        }
    }
}

pub fn run(args: ListArgs, config: &Config) -> Result<()> {
    let phase = Phase::from(args.phase);
    let dir = config.hooks_dir();
    let hooks = HookEngine::new(&dir, Vec::new()).plan(phase)?;

    if args.format.as_str() == "json" {
        let output = serde_json::json!({
            "phase": phase.as_str(),
            "dir": dir.display().to_string(),
            "hooks": hooks
                .iter()
                .map(|h| serde_json::json!({
                    "name": h.display_name(),
                    "path": h.path.display().to_string(),
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if hooks.is_empty() {
        println!("No {} hooks in {}", phase, dir.display());
        return Ok(());
    }

    println!("{} hooks in {}:", phase, dir.display());
    for (i, hook) in hooks.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, hook.display_name());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_arg_conversion() {
        assert_eq!(Phase::from(PhaseArg::Prestart), Phase::Prestart);
        assert_eq!(Phase::from(PhaseArg::Poststop), Phase::Poststop);
    }

    #[test]
    fn test_list_missing_dir_is_an_error() {
        let mut config = Config::default();
        config.hooks.dir = "/nonexistent/hooks.d".to_string();
        let args = ListArgs {
            phase: PhaseArg::Poststop,
            format: "text".to_string(),
        };
        assert!(run(args, &config).is_err());
    }

    #[test]
    fn test_list_empty_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.hooks.dir = temp_dir.path().to_string_lossy().into_owned();
        let args = ListArgs {
            phase: PhaseArg::Prestart,
            format: "json".to_string(),
        };
        run(args, &config).unwrap();
    }
}
