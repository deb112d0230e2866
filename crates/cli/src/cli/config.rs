use anyhow::Result;
use clap::{Args, Subcommand};

use docker_hooks_core::config::Config;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print a resolved value (e.g. hooks.dir, logging.sink)
    Get {
        /// Dotted key
        key: String,
    },

    /// Show which configuration file was loaded
    Path,
}

pub fn run(args: ConfigArgs, config: &Config) -> Result<()> {
    match args.command {
        ConfigCommands::Get { key } => {
            println!("{}", config.get_value(&key)?);
        }
        ConfigCommands::Path => match config.source {
            Some(ref path) => println!("{}", path.display()),
            None => println!("(no config file, using defaults)"),
        },
    }
    Ok(())
}
