use anyhow::Result;
use std::ffi::OsString;

mod cli;

use cli::{Cli, Commands};
use docker_hooks_core::hooks::Phase;
use docker_hooks_core::logging;

fn main() -> Result<()> {
    let args: Vec<OsString> = std::env::args_os().collect();
    let cli = Cli::from_args(&args);

    // Hooks run one at a time; a single-threaded runtime is enough
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async_main(cli, args))
}

async fn async_main(mut cli: Cli, args: Vec<OsString>) -> Result<()> {
    match cli.command.take() {
        Some(Commands::Prestart(_)) => cli::hook::run(Phase::Prestart, &cli, args).await,
        Some(Commands::Poststop(_)) => cli::hook::run(Phase::Poststop, &cli, args).await,
        Some(Commands::List(list_args)) => {
            let config = cli.load_config()?;
            logging::init(&config.logging, cli.verbose)?;
            cli::list::run(list_args, &config)
        }
        Some(Commands::Config(config_args)) => {
            let config = cli.load_config()?;
            logging::init(&config.logging, cli.verbose)?;
            cli::config::run(config_args, &config)
        }
        Some(Commands::Other(requested)) => {
            cli::hook::ignore(requested.first().map(OsString::as_os_str), &cli, &args).await
        }
        None => cli::hook::ignore(None, &cli, &args).await,
    }
}
