use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "refacet",
    about = "Refacet: structural validation and B-method artifact generation for contract packages",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a package description; never writes files
    Validate {
        /// Path to the package description (.json or .toml)
        package: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate, totalize, and emit the refinement and glue artifacts
    Emit {
        /// Path to the package description (.json or .toml)
        package: String,

        /// Output directory for the artifacts
        #[arg(long)]
        out: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the cross-package composition checks over a set of packages
    Compose {
        /// Paths to the package descriptions to compose
        #[arg(required = true)]
        packages: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
