mod book;
mod cli;
mod config;
mod generate;
mod languages;
mod pipeline;
mod segment;
mod session;
mod translate;
mod utils;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = cli.verbose || Config::load().map(|c| c.general.verbose).unwrap_or(false);
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Generate(args) => generate::run(args).await?,
        Commands::Segment(args) => segment::run(args)?,
        Commands::Languages => languages::run()?,
        Commands::Config(args) => config::commands::run(args)?,
    }

    Ok(())
}
