/// `clusto pool` - create pools and insert entities into them
use anyhow::{Context, Result};

use clusto::config::ClustoConfig;

use super::{connect, resolve};
use crate::cli::{PoolArgs, PoolCommand};
use crate::cli_utils::clusto_prefix;

pub async fn run(config: &ClustoConfig, args: &PoolArgs) -> Result<()> {
    match &args.command {
        PoolCommand::Create { name } => create(config, name).await,
        PoolCommand::Insert { pool, object } => insert(config, pool, object).await,
    }
}

async fn create(config: &ClustoConfig, name: &str) -> Result<()> {
    let client = connect(config)?;
    let pool = client
        .create_pool(name)
        .await
        .with_context(|| format!("Failed to create pool {}", name))?;
    println!("{} Created: {}", clusto_prefix(), pool.path());
    Ok(())
}

async fn insert(config: &ClustoConfig, pool: &str, object: &str) -> Result<()> {
    let client = connect(config)?;
    let mut pool = resolve(&client, pool).await?;
    let object = resolve(&client, object).await?;

    pool.insert(object.path())
        .await
        .with_context(|| format!("Failed to insert {} into {}", object.path(), pool.path()))?;

    println!(
        "{} Inserted {} into {}",
        clusto_prefix(),
        object.path(),
        pool.path()
    );
    Ok(())
}
