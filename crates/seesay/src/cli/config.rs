//! The `seesay config` command.

use std::path::Path;

use clap::{Args, Subcommand};
use seesay_core::Config;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration (file, env overrides, defaults)
    Show,

    /// Print the config file path
    Path,

    /// Write a config file populated with defaults
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let path = Config::default_path();
            let source = if path.exists() {
                path.display().to_string()
            } else {
                "defaults".to_string()
            };
            let config = Config::load()?;
            println!("# source: {source}");
            println!("{}", config.to_toml()?);
        }
        ConfigCommand::Path => println!("{}", Config::default_path().display()),
        ConfigCommand::Init { force } => {
            let path = Config::default_path();
            write_default(&path, force)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }
    Ok(())
}

/// Write the default configuration to `path`, refusing to clobber unless
/// `force` is set.
fn write_default(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::default().to_toml()?)?;
    Ok(())
}
