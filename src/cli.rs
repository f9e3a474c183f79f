use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Tokenized Time Tracking - track freelance hours and pay for them on-chain",
    long_about = "Connects a wallet to the TokenizedTimeTracking contract to create projects, register freelancers, log worked time and pay for it. Settings come from the environment or a .env file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Opens the terminal dashboard. This is the default.
    Dashboard,

    /// Deploys a new contract instance and prints its address.
    Deploy {
        #[arg(short, long, help = "Compiled contract artifact (defaults to ARTIFACT_PATH)")]
        artifact: Option<PathBuf>,
    },
}
