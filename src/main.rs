mod cli;
mod commands;
mod manifest;
mod ui;

use clap::Parser;
use cli::{Cli, Commands};
use commands::resolve::ResolveOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let exit_code = match cli.command {
        Commands::Resolve {
            manifest,
            config,
            timeout,
        } => {
            commands::resolve::resolve(ResolveOptions {
                manifest,
                config,
                timeout,
            })
            .await?
        }
        Commands::Sources => commands::sources::sources()?,
    };

    std::process::exit(exit_code);
}
