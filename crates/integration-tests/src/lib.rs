//! Integration tests for the Campus Console login flow.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p campus-console-integration-tests
//! ```
//!
//! Each test starts a [`FakeAuthServer`] on an ephemeral local port that
//! answers the login route with a canned response, then drives a real
//! [`LoginPage`] against it. No external services are needed.

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use campus_console::{AuthClient, LoginPage, MemoryStore, SessionStore};
use campus_console_core::RedirectResolver;
use campus_console_core::redirect::REDIRECT_HEADER;
use serde_json::Value;
use tokio::task::JoinHandle;
use url::Url;

/// Route the fake server answers.
pub const LOGIN_ROUTE: &str = "/auth/login";

/// Body returned by the fake server.
#[derive(Debug, Clone)]
pub enum FakeBody {
    Json(Value),
    Text(String),
    Empty,
}

/// Canned response for every login request.
#[derive(Debug, Clone)]
pub struct FakeResponse {
    pub status: StatusCode,
    pub body: FakeBody,
    pub redirect_header: Option<String>,
}

impl FakeResponse {
    /// `200 OK` with a JSON body.
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self::json(StatusCode::OK, body)
    }

    #[must_use]
    pub const fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: FakeBody::Json(body),
            redirect_header: None,
        }
    }

    #[must_use]
    pub const fn empty(status: StatusCode) -> Self {
        Self {
            status,
            body: FakeBody::Empty,
            redirect_header: None,
        }
    }

    #[must_use]
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: FakeBody::Text(body.into()),
            redirect_header: None,
        }
    }

    /// Add an `x-redirect-to` header.
    #[must_use]
    pub fn with_redirect_header(mut self, path: impl Into<String>) -> Self {
        self.redirect_header = Some(path.into());
        self
    }
}

struct ServerState {
    response: FakeResponse,
    requests: Mutex<Vec<Value>>,
}

/// A local authentication server answering [`LOGIN_ROUTE`].
///
/// The server task is aborted on drop.
pub struct FakeAuthServer {
    login_url: Url,
    state: Arc<ServerState>,
    handle: JoinHandle<()>,
}

impl FakeAuthServer {
    /// Start a server that answers every login with `response`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(response: FakeResponse) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake auth server");
        let addr = listener.local_addr().expect("Failed to read local address");

        let state = Arc::new(ServerState {
            response,
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route(LOGIN_ROUTE, post(login))
            .with_state(Arc::clone(&state));

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let login_url = format!("http://{addr}{LOGIN_ROUTE}")
            .parse()
            .expect("Failed to build login URL");

        Self {
            login_url,
            state,
            handle,
        }
    }

    #[must_use]
    pub const fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// JSON bodies received so far.
    ///
    /// # Panics
    ///
    /// Panics if the request log is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<Value> {
        self.state
            .requests
            .lock()
            .expect("Request log poisoned")
            .clone()
    }

    /// A login page posting to this server over the given stores.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn login_page(&self, durable: &MemoryStore, tab: &MemoryStore) -> LoginPage {
        login_page(self.login_url.clone(), durable, tab)
    }
}

impl Drop for FakeAuthServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A login page posting to `login_url` with default dashboards.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn login_page(login_url: Url, durable: &MemoryStore, tab: &MemoryStore) -> LoginPage {
    LoginPage::new(
        AuthClient::new(login_url).expect("Failed to build auth client"),
        SessionStore::new(durable.clone(), tab.clone()),
        RedirectResolver::default(),
    )
}

/// A login URL on a local port nothing listens on.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub async fn unreachable_login_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind placeholder listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    drop(listener);
    format!("http://{addr}{LOGIN_ROUTE}")
        .parse()
        .expect("Failed to build login URL")
}

async fn login(State(state): State<Arc<ServerState>>, Json(body): Json<Value>) -> Response {
    if let Ok(mut requests) = state.requests.lock() {
        requests.push(body);
    }

    let response = &state.response;
    let mut headers = HeaderMap::new();
    if let Some(path) = &response.redirect_header {
        if let Ok(value) = HeaderValue::from_str(path) {
            headers.insert(REDIRECT_HEADER, value);
        }
    }

    match &response.body {
        FakeBody::Json(body) => (response.status, headers, Json(body.clone())).into_response(),
        FakeBody::Text(body) => (response.status, headers, body.clone()).into_response(),
        FakeBody::Empty => (response.status, headers).into_response(),
    }
}
