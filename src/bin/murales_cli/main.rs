//! murales-cli: command-line client for the street-art gallery API.
#![deny(clippy::all, clippy::pedantic)]

mod args;
mod client;
mod handlers;
mod print;


use clap::Parser;
use murales::{config, infra::telemetry};

use args::{Cli, Commands};
use client::{CliError, build_ctx};
use handlers::{admin, filters, geocode, murals, submit};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let settings = config::load(&cli.config)?;
    telemetry::init(&settings.logging)?;
    let ctx = build_ctx(settings)?;

    match cli.command {
        Commands::Murals(cmd) => murals::handle(&ctx, cmd.action).await?,
        Commands::Filters(cmd) => filters::handle(&ctx, cmd.action).await?,
        Commands::Geocode(point) => geocode::handle(&ctx, point).await?,
        Commands::Submit(args) => submit::handle(&ctx, args).await?,
        Commands::Admin(cmd) => admin::handle(&ctx, cmd.action).await?,
    }

    Ok(())
}
