use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::debug;

use super::{AttrFilter, Attribute, Descriptor};
use crate::client::{ActionArgs, ArgValue, ClustoClient, ClustoError, Result};
use crate::logging::{operations, status};

/// Local handle on one remote entity
///
/// Any action the service exposes under the entity's path can be invoked with
/// [`EntityProxy::call`]. The descriptor returned by `show` is cached on the
/// proxy and reused by `contents`, `parents` and `attrs` until refreshed.
///
/// Two proxies are equal when their names (last path segment) are equal,
/// whatever their cache state.
#[derive(Clone)]
pub struct EntityProxy {
    path: String,
    name: String,
    client: ClustoClient,
    cache: Option<Descriptor>,
}

#[derive(Clone, Copy)]
enum Relation {
    Parents,
    Contents,
}

impl Relation {
    fn label(self) -> &'static str {
        match self {
            Relation::Parents => "parents",
            Relation::Contents => "contents",
        }
    }

    fn select(self, descriptor: &Descriptor) -> Option<&Vec<String>> {
        match self {
            Relation::Parents => descriptor.parents.as_ref(),
            Relation::Contents => descriptor.contents.as_ref(),
        }
    }
}

impl EntityProxy {
    pub fn new(client: ClustoClient, path: impl Into<String>) -> Self {
        let path = path.into();
        let name = basename(&path).to_string();
        Self {
            path,
            name,
            client,
            cache: None,
        }
    }

    /// Proxy whose cache starts out holding `descriptor`
    pub fn with_descriptor(client: ClustoClient, descriptor: Descriptor) -> Self {
        let mut proxy = Self::new(client, descriptor.object.clone());
        proxy.cache = Some(descriptor);
        proxy
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First path segment: `/server/web1` is a `server`
    pub fn entity_type(&self) -> &str {
        self.path
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default()
    }

    pub fn client(&self) -> &ClustoClient {
        &self.client
    }

    pub fn cached(&self) -> Option<&Descriptor> {
        self.cache.as_ref()
    }

    /// Drop the cached descriptor; the next read goes to the service
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    fn action_path(&self, action: &str) -> String {
        format!("{}/{}", self.path.trim_end_matches('/'), action)
    }

    /// Invoke a remote action on this entity
    ///
    /// Issues `GET <path>/<action>?<args>` and decodes the JSON reply. An empty
    /// body yields `None`.
    pub async fn call(&self, action: &str, args: &ActionArgs) -> Result<Option<Value>> {
        let mut path = self.action_path(action);
        if !args.is_empty() {
            path.push('?');
            path.push_str(&args.to_query());
        }

        let response = self
            .client
            .request(Method::GET, &path, "")
            .await?
            .expect_status(StatusCode::OK)?;

        if response.body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(response.json()?))
    }

    /// Like [`EntityProxy::call`], but a missing body is an error
    async fn call_expecting(&self, action: &str, args: &ActionArgs) -> Result<Value> {
        self.call(action, args).await?.ok_or_else(|| {
            ClustoError::UnexpectedResponse(format!("{} returned an empty body", action))
        })
    }

    /// Full descriptor of the entity
    ///
    /// With `use_cache` the cached descriptor is returned when present;
    /// otherwise it is fetched and replaces the cache.
    pub async fn show(&mut self, use_cache: bool) -> Result<Descriptor> {
        if use_cache {
            if let Some(descriptor) = &self.cache {
                debug!(
                    operation = operations::SHOW,
                    entity = %self.path,
                    status = status::CACHED,
                    "descriptor served from cache"
                );
                return Ok(descriptor.clone());
            }
        }

        let value = self.call_expecting("show", &ActionArgs::new()).await?;
        let descriptor = Descriptor::from_value(value)?;
        debug!(
            operation = operations::SHOW,
            entity = %self.path,
            status = status::FETCHED,
            "descriptor fetched"
        );
        self.cache = Some(descriptor.clone());
        Ok(descriptor)
    }

    /// Entities contained in this one
    pub async fn contents(&mut self, use_cache: bool) -> Result<Vec<EntityProxy>> {
        self.related(Relation::Contents, use_cache).await
    }

    /// Entities this one is contained in
    pub async fn parents(&mut self, use_cache: bool) -> Result<Vec<EntityProxy>> {
        self.related(Relation::Parents, use_cache).await
    }

    async fn related(&mut self, relation: Relation, use_cache: bool) -> Result<Vec<EntityProxy>> {
        let cached = if use_cache {
            self.cache
                .as_ref()
                .and_then(|d| relation.select(d))
                .cloned()
        } else {
            None
        };

        let paths = match cached {
            Some(paths) => paths,
            None => {
                // A cached descriptor without the list is stale for this purpose
                let descriptor = self.show(false).await?;
                relation.select(&descriptor).cloned().unwrap_or_default()
            }
        };

        debug!(
            operation = relation.label(),
            entity = %self.path,
            entry_count = paths.len(),
            "resolved related entities"
        );

        Ok(paths
            .into_iter()
            .map(|path| EntityProxy::new(self.client.clone(), path))
            .collect())
    }

    /// Attribute records matching `filter`
    ///
    /// Served from the cached descriptor when allowed. A filter asking for
    /// merged container attributes always goes to the service.
    pub async fn attrs(&mut self, filter: &AttrFilter, use_cache: bool) -> Result<Vec<Attribute>> {
        if use_cache && !filter.merge_container_attrs {
            if let Some(attrs) = self.cache.as_ref().and_then(|d| d.attrs.as_ref()) {
                debug!(
                    operation = operations::ATTRS,
                    entity = %self.path,
                    status = status::CACHED,
                    "attributes served from cache"
                );
                return Ok(filter.apply(attrs));
            }
        }

        let mut value = self.call_expecting("attrs", &filter.to_args()).await?;
        let attrs = value
            .get_mut("attrs")
            .map(Value::take)
            .ok_or_else(|| {
                ClustoError::UnexpectedResponse(format!(
                    "attrs response for {} has no attrs field",
                    self.path
                ))
            })?;

        debug!(
            operation = operations::ATTRS,
            entity = %self.path,
            status = status::FETCHED,
            "attributes fetched"
        );
        Ok(serde_json::from_value(attrs)?)
    }

    pub async fn attr_values(&mut self, filter: &AttrFilter) -> Result<Vec<Value>> {
        Ok(self
            .attrs(filter, true)
            .await?
            .into_iter()
            .map(|attr| attr.value)
            .collect())
    }

    /// The single value matching `filter`
    ///
    /// `None` when nothing matches; `Ambiguous` when more than one record does.
    pub async fn attr_value(&mut self, filter: &AttrFilter) -> Result<Option<Value>> {
        let mut attrs = self.attrs(filter, true).await?;
        match attrs.len() {
            0 => Ok(None),
            1 => Ok(attrs.pop().map(|attr| attr.value)),
            n => Err(ClustoError::Ambiguous(n)),
        }
    }

    /// Delete the entity on the service
    pub async fn delete(&self) -> Result<()> {
        self.client
            .request(Method::DELETE, &self.action_path(""), "")
            .await?
            .expect_status(StatusCode::OK)?;
        debug!(entity = %self.path, "entity deleted");
        Ok(())
    }

    /// Insert `object` (an entity path such as `/server/web3`) into this entity
    pub async fn insert(&mut self, object: &str) -> Result<EntityProxy> {
        let args = ActionArgs::new().arg("object", object);
        let value = self.call_expecting("insert", &args).await?;
        self.absorb(Descriptor::from_value(value)?)
    }

    /// Add an attribute; `datatype` may be `int` or `relation`, string otherwise
    pub async fn add_attr(
        &mut self,
        key: &str,
        subkey: &str,
        value: impl Into<ArgValue>,
        datatype: Option<&str>,
    ) -> Result<EntityProxy> {
        let mut args = ActionArgs::new()
            .arg("key", key)
            .arg("subkey", subkey)
            .arg("value", value);
        if let Some(datatype) = datatype {
            args.set("datatype", datatype);
        }
        let value = self.call_expecting("addattr", &args).await?;
        self.absorb(Descriptor::from_value(value)?)
    }

    pub async fn set_port_attr(
        &self,
        porttype: &str,
        portnum: u32,
        key: &str,
        value: impl Into<ArgValue>,
    ) -> Result<Option<Value>> {
        let args = ActionArgs::new()
            .arg("porttype", porttype)
            .arg("portnum", portnum)
            .arg("key", key)
            .arg("value", value);
        self.call("set_port_attr", &args).await
    }

    pub async fn get_port_attr(
        &self,
        porttype: &str,
        portnum: u32,
        key: &str,
    ) -> Result<Option<Value>> {
        let args = ActionArgs::new()
            .arg("porttype", porttype)
            .arg("portnum", portnum)
            .arg("key", key);
        self.call("get_port_attr", &args).await
    }

    /// Proxy for a descriptor returned by a mutating action; refreshes our own
    /// cache when the descriptor is for this entity
    fn absorb(&mut self, descriptor: Descriptor) -> Result<EntityProxy> {
        if descriptor.object == self.path {
            self.cache = Some(descriptor.clone());
        }
        Ok(EntityProxy::with_descriptor(self.client.clone(), descriptor))
    }
}

fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

impl PartialEq for EntityProxy {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for EntityProxy {}

impl Hash for EntityProxy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for EntityProxy {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EntityProxy {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for EntityProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl fmt::Debug for EntityProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityProxy({:?}, {:?})", self.path, self.client)
    }
}
