//! Seesay CLI - describe images aloud for blind and low-vision users.
//!
//! Seesay sends an image to a vision-language model for a short objective
//! description, then turns that description into speech.
//!
//! # Usage
//!
//! ```bash
//! # Describe a single image and play the result
//! seesay describe photo.jpg
//!
//! # Start the web interface on 0.0.0.0:5000
//! seesay serve
//!
//! # View configuration
//! seesay config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;
mod web;

/// Seesay - vision-to-speech assistant.
#[derive(Parser, Debug)]
#[command(name = "seesay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Describe an image and speak the description
    Describe(cli::describe::DescribeArgs),

    /// Run the web interface
    Serve(cli::serve::ServeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match seesay_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `seesay config path`."
            );
            seesay_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Seesay v{}", seesay_core::VERSION);

    match cli.command {
        Commands::Describe(args) => cli::describe::execute(args, config).await,
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
