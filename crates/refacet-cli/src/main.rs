//! Refacet CLI: the `refacet` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { package, json } => commands::validate::run(package, json),

        Commands::Emit { package, out, json } => commands::emit::run(package, out, json),

        Commands::Compose { packages, json } => commands::compose::run(packages, json),
    }
}
