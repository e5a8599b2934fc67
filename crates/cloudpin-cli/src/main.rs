//! cloudpin - browse a remote record list and its thumbnails.
//!
//! A thin wrapper over `cloudpin-sync`: each invocation opens one store,
//! starts one sync engine with a fresh thumbnail cache, and runs a single
//! command against it.

mod cli;
mod commands;
mod output;
mod settings;
mod store;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let settings = Settings::load(&cli.overrides())?;

    match cli.command {
        Commands::List(args) => commands::list::run(settings, args).await,
        Commands::Thumbnail(args) => commands::thumbnail::run(settings, args).await,
        Commands::Browse(args) => commands::browse::run(settings, args).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so stdout stays machine-readable.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
