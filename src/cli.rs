// CLI module for handling command-line interface

use clap::{Parser, Subcommand};
use scaf::constants::DEFAULT_MANIFEST_FILE;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scaf")]
#[command(about = "Resolve Minecraft server plugins to concrete, lockable artifacts")]
pub struct Cli {
    /// Log resolution details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve every plugin in the manifest and print the artifacts as YAML
    Resolve {
        #[arg(short, long, default_value = DEFAULT_MANIFEST_FILE)]
        manifest: PathBuf,

        /// Resolver settings (TOML); defaults to ./scaf.toml when present
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overall deadline in seconds for the whole batch
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,
    },
    /// List the supported sources
    Sources,
}
