pub mod call;
pub mod config;
pub mod entity;
pub mod pool;
pub mod query;

use anyhow::{Context, Result};

use clusto::config::ClustoConfig;
use clusto::ClustoClient;

/// Connect to the service described by the merged configuration
pub fn connect(config: &ClustoConfig) -> Result<ClustoClient> {
    ClustoClient::from_config(config).context("Failed to set up clusto client")
}

/// Resolve an entity by name, with the name in the error on failure
pub async fn resolve(client: &ClustoClient, name: &str) -> Result<clusto::EntityProxy> {
    client
        .get_by_name(name)
        .await
        .with_context(|| format!("Failed to look up {}", name))
}
