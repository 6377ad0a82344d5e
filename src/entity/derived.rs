//! Properties computed from an entity's attributes and relationships
//!
//! These helpers combine several round trips (a parent listing, then one
//! attribute lookup per parent, ...). Requests are issued one after another.

use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use super::network::is_private;
use super::{AttrFilter, EntityProxy};
use crate::client::{ClustoError, Result};
use crate::logging::operations;

const POOLTYPE: &str = "pooltype";
const ROLE: &str = "role";

impl EntityProxy {
    /// Entities sharing every role pool this entity belongs to
    ///
    /// Role pools are parents carrying a `pooltype`/`role` attribute.
    /// `exclude` removes pool names from that set and `include` adds arbitrary
    /// ones. The result is the intersection of the contents of those pools,
    /// without this entity. No pools means no siblings.
    pub async fn siblings(
        &mut self,
        include: &[&str],
        exclude: &[&str],
        use_cache: bool,
    ) -> Result<HashSet<EntityProxy>> {
        let mut pools = BTreeSet::new();
        for mut parent in self.parents(use_cache).await? {
            if is_role_pool(&mut parent).await? {
                pools.insert(parent.name().to_string());
            }
        }
        for name in exclude {
            pools.remove(*name);
        }
        for name in include {
            pools.insert(name.to_string());
        }

        debug!(
            operation = operations::SIBLINGS,
            entity = %self.path(),
            pools = ?pools,
            "resolving sibling pools"
        );

        let mut siblings: Option<HashSet<EntityProxy>> = None;
        for name in &pools {
            let mut pool = self.client().get_by_name(name).await?;
            let members: HashSet<EntityProxy> = pool.contents(use_cache).await?.into_iter().collect();
            siblings = Some(match siblings {
                Some(acc) => acc.intersection(&members).cloned().collect(),
                None => members,
            });
        }

        let mut siblings = siblings.unwrap_or_default();
        siblings.remove(&*self);
        Ok(siblings)
    }

    /// First `ip`/`ipstring` attribute value in a private range
    pub async fn private_ip(&mut self) -> Result<String> {
        let filter = AttrFilter::new().key("ip").subkey("ipstring");
        self.attr_values(&filter)
            .await?
            .into_iter()
            .filter_map(|value| value.as_str().map(str::to_string))
            .find(|ip| is_private(ip))
            .ok_or_else(|| ClustoError::NoPrivateIp(self.path().to_string()))
    }

    /// `puppet`/`datacenter`, resolved through parent containers
    pub async fn datacenter(&mut self) -> Result<Option<String>> {
        let filter = AttrFilter::new()
            .key("puppet")
            .subkey("datacenter")
            .merged();
        Ok(self.attr_value(&filter).await?.map(value_to_string))
    }

    /// Name of the first parent pool whose `pooltype` is `role`
    pub async fn role(&mut self) -> Result<Option<String>> {
        let filter = AttrFilter::new().key(POOLTYPE);
        for mut parent in self.parents(true).await? {
            if parent.entity_type() != "pool" {
                continue;
            }
            if parent.attr_value(&filter).await? == Some(Value::from(ROLE)) {
                return Ok(Some(parent.name().to_string()));
            }
        }
        Ok(None)
    }
}

/// A parent is a role pool when it carries a `pooltype`/`role` attribute
async fn is_role_pool(parent: &mut EntityProxy) -> Result<bool> {
    let filter = AttrFilter::new().key(POOLTYPE).subkey(ROLE);
    Ok(!parent.attrs(&filter, true).await?.is_empty())
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(json!("sjc1")), "sjc1");
        assert_eq!(value_to_string(json!(3)), "3");
    }
}
