mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    fgate_runtime::init_logging();

    let cli = Cli::parse();

    // Init doesn't need config
    if let Commands::Init { path } = &cli.command {
        return commands::init::run_init(path);
    }

    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init { .. } => unreachable!(),
        Commands::Check {
            user,
            resource,
            permissions,
            combinator,
        } => {
            commands::check::execute(&user, resource, permissions, combinator.into(), &config)
                .await?;
        }
        Commands::Demo { user } => {
            commands::demo::execute(user, &config).await?;
        }
    }

    Ok(())
}
