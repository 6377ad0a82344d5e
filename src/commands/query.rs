/// Service-wide lookups: get, entities, pools, ip-manager
use anyhow::{Context, Result};

use clusto::config::ClustoConfig;
use clusto::EntityQuery;

use super::connect;
use crate::cli::{EntitiesArgs, EntityArgs, IpManagerArgs, PoolsArgs};
use crate::cli_utils::print_entities;

pub async fn get(config: &ClustoConfig, args: &EntityArgs) -> Result<()> {
    let client = connect(config)?;
    let entities = client
        .get(&args.name)
        .await
        .with_context(|| format!("Failed to look up {}", args.name))?;
    print_entities(&entities, args.json)
}

pub async fn entities(config: &ClustoConfig, args: &EntitiesArgs) -> Result<()> {
    let client = connect(config)?;
    let query = build_query(args);
    let entities = client
        .get_entities(&query)
        .await
        .context("Failed to query entities")?;
    print_entities(&entities, args.json)
}

pub async fn pools(config: &ClustoConfig, args: &PoolsArgs) -> Result<()> {
    let client = connect(config)?;
    let types: Vec<&str> = args.types.iter().map(String::as_str).collect();
    let entities = client
        .get_from_pools(&args.pools, &types)
        .await
        .with_context(|| format!("Failed to list pools {}", args.pools.join(",")))?;
    print_entities(&entities, args.json)
}

pub async fn ip_manager(config: &ClustoConfig, args: &IpManagerArgs) -> Result<()> {
    let client = connect(config)?;
    let manager = client
        .get_ip_manager(&args.ip)
        .await
        .with_context(|| format!("Failed to find IP manager for {}", args.ip))?;
    println!("{}", manager.path());
    Ok(())
}

/// Only filters the user actually gave are sent
fn build_query(args: &EntitiesArgs) -> EntityQuery {
    let mut query = EntityQuery::new();
    if !args.types.is_empty() {
        query = query.clusto_types(args.types.iter().cloned());
    }
    if !args.names.is_empty() {
        query = query.names(args.names.iter().cloned());
    }
    if !args.drivers.is_empty() {
        query = query.clusto_drivers(args.drivers.iter().cloned());
    }
    query
}
