use anyhow::Result;
use tracing::info;

use clusto::config::ClustoConfig;

use crate::cli::ConfigCommands;

/// `show` prints the effective configuration, so it takes the merged config
pub fn run(command: &ConfigCommands, effective: &ClustoConfig) -> Result<()> {
    match command {
        ConfigCommands::Validate { path } => validate(path),
        ConfigCommands::Generate => generate(),
        ConfigCommands::Show => show(effective),
    }
}

fn validate(path: &str) -> Result<()> {
    info!("Validating config file: {}", path);

    let config = ClustoConfig::from_file(path)?;
    config.validate()?;

    println!("✓ Configuration file is valid: {}", path);
    println!("\nSummary:");
    println!("  - URL: {}", config.url.as_deref().unwrap_or("(not set)"));
    println!(
        "  - Auth: {}",
        if config.auth.is_some() { "configured" } else { "none" }
    );
    println!("  - Log level: {}", config.log.level);
    println!("  - Log format: {}", config.log.format);

    Ok(())
}

fn generate() -> Result<()> {
    info!("Generating example config");
    println!("{}", ClustoConfig::example()?);
    Ok(())
}

fn show(effective: &ClustoConfig) -> Result<()> {
    info!("Showing effective configuration");

    println!("Effective Configuration:\n");
    println!("{}", toml::to_string_pretty(&effective.redacted())?);

    Ok(())
}
