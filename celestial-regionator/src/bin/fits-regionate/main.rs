//! fits-regionate: FITS point catalogs to regionated KML
//!
//! Reads a binary-table catalog, tiles its objects into a quad-tree of
//! bounded regions and writes one KML document per populated region.

mod cli;
mod flatten;
mod inspect;
mod progress_bar;
mod regionate;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match &cli.command {
        Commands::Regionate(args) => regionate::run(args, &cli),
        Commands::Inspect(args) => inspect::run(args, &cli),
        Commands::Flatten(args) => flatten::run(args, &cli),
    }
}
