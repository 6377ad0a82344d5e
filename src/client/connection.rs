use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use url::form_urlencoded;

use super::{ActionArgs, ClustoError, EntityQuery, Result};
use crate::config::ClustoConfig;
use crate::entity::{Descriptor, EntityProxy};

/// Environment variable holding the service base URL
pub const URL_ENV: &str = "CLUSTO_URL";
/// Environment variable holding the `user:password` credential
pub const AUTH_ENV: &str = "CLUSTO_AUTH";

/// Connection to a clusto service
///
/// Holds the base URL and optional basic-auth credential. Cloning is cheap and
/// every clone shares the same configuration, so entity proxies keep one each.
#[derive(Clone)]
pub struct ClustoClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    url: String,
    auth: Option<String>,
    http: Client,
}

/// Status, headers and undecoded body of one HTTP exchange
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Fail with `RequestFailed` unless the status is `expected`
    pub fn expect_status(self, expected: StatusCode) -> Result<Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(ClustoError::request_failed(self.status.as_u16(), self.body))
        }
    }
}

impl ClustoClient {
    /// Create a client for the service at `url`
    ///
    /// `auth` is a `user:password` credential sent as HTTP Basic auth.
    pub fn new(url: impl Into<String>, auth: Option<String>) -> Result<Self> {
        let url = url.into();
        url::Url::parse(&url)
            .map_err(|e| ClustoError::Config(format!("invalid service URL {url}: {e}")))?;

        let url = url.trim_end_matches('/').to_string();
        debug!(url = %url, auth = auth.is_some(), "Creating clusto client");

        Ok(Self {
            inner: Arc::new(ClientInner {
                url,
                auth: auth.filter(|a| !a.is_empty()),
                http: Client::new(),
            }),
        })
    }

    /// Create a client from `CLUSTO_URL` and `CLUSTO_AUTH`
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Create a client using the provided environment lookup
    pub fn from_env_with<F>(env_lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = env_lookup(URL_ENV).ok_or_else(|| {
            ClustoError::Config(format!(
                "{URL_ENV} environment variable is not set and no url was passed"
            ))
        })?;
        Self::new(url, env_lookup(AUTH_ENV))
    }

    /// Create a client from a merged configuration
    pub fn from_config(config: &ClustoConfig) -> Result<Self> {
        let url = config.url.clone().ok_or_else(|| {
            ClustoError::Config("no clusto URL configured (set url or CLUSTO_URL)".to_string())
        })?;
        Self::new(url, config.auth.clone())
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn has_auth(&self) -> bool {
        self.inner.auth.is_some()
    }

    /// Proxy for `path` without contacting the service
    pub fn entity(&self, path: impl Into<String>) -> EntityProxy {
        EntityProxy::new(self.clone(), path)
    }

    fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.inner.url, path)
        } else {
            format!("{}/{}", self.inner.url, path)
        }
    }

    fn auth_header(&self) -> Option<String> {
        self.inner
            .auth
            .as_ref()
            .map(|auth| format!("Basic {}", STANDARD.encode(auth.as_bytes())))
    }

    /// Issue one request and return the raw response
    ///
    /// Non-success statuses are logged but not turned into errors here.
    pub async fn request(&self, method: Method, path: &str, body: &str) -> Result<RawResponse> {
        self.send(method, path, body.to_string(), None).await
    }

    /// Issue one request with a form-encoded body
    pub async fn request_form(
        &self,
        method: Method,
        path: &str,
        form: &ActionArgs,
    ) -> Result<RawResponse> {
        self.send(
            method,
            path,
            form.to_query(),
            Some("application/x-www-form-urlencoded"),
        )
        .await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: String,
        content_type: Option<&str>,
    ) -> Result<RawResponse> {
        let url = self.endpoint(path);
        debug!("{} {}", method, url);
        let start = Instant::now();

        let mut request = self.inner.http.request(method, &url);
        if let Some(header) = self.auth_header() {
            request = request.header(AUTHORIZATION, header);
        }
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        if status.as_u16() >= 400 {
            warn!("Server error {}: {}", status.as_u16(), body);
        }
        debug!("Response time: {:.3}s", start.elapsed().as_secs_f64());

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Entities matching arbitrary filter criteria
    pub async fn get_entities(&self, query: &EntityQuery) -> Result<Vec<EntityProxy>> {
        let path = if query.is_empty() {
            "/query/get_entities".to_string()
        } else {
            format!("/query/get_entities?{}", query.to_query())
        };
        let response = self
            .request(Method::GET, &path, "")
            .await?
            .expect_status(StatusCode::OK)?;
        self.entities_from(response.json()?)
    }

    /// Entities whose name matches `name`, each with its descriptor cached
    pub async fn get(&self, name: &str) -> Result<Vec<EntityProxy>> {
        let path = format!("/query/get?{}", encode_pair("name", name));
        let response = self
            .request(Method::GET, &path, "")
            .await?
            .expect_status(StatusCode::OK)?;
        self.entities_from(response.json()?)
    }

    /// Exactly one entity by name; `NotFound` on 404
    pub async fn get_by_name(&self, name: &str) -> Result<EntityProxy> {
        let path = format!("/query/get_by_name?{}", encode_pair("name", name));
        let response = self.request(Method::GET, &path, "").await?;
        match response.status {
            StatusCode::OK => {
                let descriptor = Descriptor::from_value(response.json()?)?;
                Ok(EntityProxy::with_descriptor(self.clone(), descriptor))
            }
            StatusCode::NOT_FOUND => Err(ClustoError::NotFound(name.to_string())),
            status => Err(ClustoError::request_failed(status.as_u16(), response.body)),
        }
    }

    /// Entities contained in every one of `pools`, optionally restricted by type
    pub async fn get_from_pools<P: AsRef<str>>(
        &self,
        pools: &[P],
        types: &[&str],
    ) -> Result<Vec<EntityProxy>> {
        let pools: Vec<&str> = pools.iter().map(AsRef::as_ref).collect();
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("pools", &pools.join(","));
        if !types.is_empty() {
            serializer.append_pair("types", &types.join(","));
        }
        let path = format!("/query/get_from_pools?{}", serializer.finish());

        let response = self
            .request(Method::GET, &path, "")
            .await?
            .expect_status(StatusCode::OK)?;
        self.entities_from(response.json()?)
    }

    /// The IP manager responsible for `ip`
    pub async fn get_ip_manager(&self, ip: &str) -> Result<EntityProxy> {
        let path = format!("/query/get_ip_manager?{}", encode_pair("ip", ip));
        let response = self
            .request(Method::GET, &path, "")
            .await?
            .expect_status(StatusCode::OK)?;
        self.entity_from(response.json()?)
    }

    /// Create a pool; the service answers 201 with the new pool's descriptor
    pub async fn create_pool(&self, name: &str) -> Result<EntityProxy> {
        let path = format!("/pool/{name}");
        let response = self
            .request(Method::POST, &path, "")
            .await?
            .expect_status(StatusCode::CREATED)?;
        let descriptor = Descriptor::from_value(response.json()?)?;
        Ok(EntityProxy::with_descriptor(self.clone(), descriptor))
    }

    /// Build a proxy from a bare path or a full descriptor
    pub(crate) fn entity_from(&self, value: Value) -> Result<EntityProxy> {
        match value {
            Value::String(path) => Ok(self.entity(path)),
            Value::Object(_) => Ok(EntityProxy::with_descriptor(
                self.clone(),
                Descriptor::from_value(value)?,
            )),
            other => Err(ClustoError::UnexpectedResponse(format!(
                "expected an entity path or descriptor, got {other}"
            ))),
        }
    }

    fn entities_from(&self, values: Vec<Value>) -> Result<Vec<EntityProxy>> {
        values.into_iter().map(|v| self.entity_from(v)).collect()
    }
}

impl fmt::Debug for ClustoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClustoClient({})", self.inner.url)
    }
}

fn encode_pair(key: &str, value: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .finish()
}
