// Common test utilities shared across acceptance tests
//
// ## Mock clusto service
//
// Each test starts its own in-process HTTP server on 127.0.0.1:0 and points a
// `ClustoClient` at it. Nothing is shared between tests:
//
// - Responses are registered per test with `MockClusto::route`
// - Every request is recorded (method, path, query, Authorization and
//   Content-Type headers, body)
// - Dropping the mock shuts the server down
//
// Routes are looked up by "METHOD /path?query" first and "METHOD /path"
// second, so a test only spells out the query when two requests to the same
// path need different answers. Unknown routes answer 404.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    Router,
};
use clusto::ClustoClient;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// One request as the mock saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl Recorded {
    /// Decoded query pairs, in order
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.query.as_deref().unwrap_or("").as_bytes())
            .into_owned()
            .collect()
    }

    pub fn query_value(&self, key: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

#[derive(Clone, Default)]
struct MockState {
    routes: Arc<Mutex<HashMap<String, (u16, String)>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

pub struct MockClusto {
    pub url: String,
    state: MockState,
    shutdown: Option<oneshot::Sender<()>>,
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let path = uri.path().to_string();
    let query = uri.query().map(str::to_string);

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        query: query.clone(),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let routes = state.routes.lock().unwrap();
    let exact = match &query {
        Some(q) => format!("{} {}?{}", method, path, q),
        None => format!("{} {}", method, path),
    };
    let fallback = format!("{} {}", method, path);

    match routes.get(&exact).or_else(|| routes.get(&fallback)) {
        Some((status, body)) => (StatusCode::from_u16(*status).unwrap(), body.clone()),
        None => (StatusCode::NOT_FOUND, format!("no route for {}", exact)),
    }
}

impl MockClusto {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            url: format!("http://{}", addr),
            state,
            shutdown: Some(shutdown_tx),
        }
    }

    /// Register a canned response for `target` ("/path" or "/path?query")
    pub fn route(&self, method: &str, target: &str, status: u16, body: impl Into<String>) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert(format!("{} {}", method, target), (status, body.into()));
    }

    /// Register a 200 JSON response for a GET
    pub fn get_json(&self, target: &str, value: serde_json::Value) {
        self.route("GET", target, 200, value.to_string());
    }

    pub fn client(&self) -> ClustoClient {
        ClustoClient::new(&self.url, None).unwrap()
    }

    pub fn client_with_auth(&self, auth: &str) -> ClustoClient {
        ClustoClient::new(&self.url, Some(auth.to_string())).unwrap()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Requests whose path is exactly `path`
    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no requests recorded")
    }
}

impl Drop for MockClusto {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
