mod cli;
mod cli_utils;
mod commands;

use anyhow::Result;
use clap::Parser;

use clusto::config::ConfigOverrides;
use clusto::{config_discovery, logging};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        url: cli.connection.url.clone(),
        auth: cli.connection.auth.clone(),
        log_level: cli.connection.log_level.clone(),
    };
    let config = config_discovery::load_config_with_discovery(cli.connection.config.as_deref())?
        .merge(overrides);

    logging::init(&config.log.level, config.log_format());

    match &cli.command {
        Commands::Show(args) => commands::entity::show(&config, args).await,
        Commands::Attrs(args) => commands::entity::attrs(&config, args).await,
        Commands::Parents(args) => commands::entity::parents(&config, args).await,
        Commands::Contents(args) => commands::entity::contents(&config, args).await,
        Commands::Siblings(args) => commands::entity::siblings(&config, args).await,
        Commands::Info(args) => commands::entity::info(&config, args).await,
        Commands::Delete(args) => commands::entity::delete(&config, args).await,
        Commands::AddAttr(args) => commands::entity::add_attr(&config, args).await,
        Commands::Get(args) => commands::query::get(&config, args).await,
        Commands::Entities(args) => commands::query::entities(&config, args).await,
        Commands::Pools(args) => commands::query::pools(&config, args).await,
        Commands::IpManager(args) => commands::query::ip_manager(&config, args).await,
        Commands::Call(args) => commands::call::run(&config, args).await,
        Commands::Pool(args) => commands::pool::run(&config, args).await,
        Commands::Config(args) => commands::config::run(&args.command, &config),
    }
}
