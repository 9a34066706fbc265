//! Integration tests for the Bridgia site API.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests (no external services)
//! cargo test -p bridgia-integration-tests
//!
//! # Including PostgreSQL-backed tests
//! SITE_DATABASE_URL=postgres://... cargo test -p bridgia-integration-tests -- --include-ignored
//! ```
//!
//! Each test starts its own server on an ephemeral port via [`TestApp::spawn`],
//! so tests are independent and can run in parallel.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;

use bridgia_site::config::SiteConfig;
use bridgia_site::db::{DynStore, MemoryStore};
use bridgia_site::routes;
use bridgia_site::services::notify::{DynNotifier, Notification, Notifier, NotifyError};
use bridgia_site::state::AppState;

/// Notifier that keeps every notification in memory.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Notifications received so far.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier lock poisoned").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("notifier lock poisoned")
            .push(notification.clone());
        Ok(())
    }
}

/// Notifier that always fails, as an unreachable webhook would.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Status(503))
    }
}

/// A running site server.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
}

impl TestApp {
    /// Start a server with an in-memory store, no rate limiting and the given
    /// notifier.
    pub async fn spawn(notifier: DynNotifier) -> Self {
        Self::spawn_with(SiteConfig::in_memory(), Arc::new(MemoryStore::new()), notifier).await
    }

    /// Start a server with explicit configuration and store.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn_with(config: SiteConfig, store: DynStore, notifier: DynNotifier) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        let app = routes::app(AppState::new(config, store, notifier));
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Test server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: Client::new(),
        }
    }

    /// Full URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST a JSON body to a procedure.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post(&self, procedure: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/api/{procedure}")))
            .json(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    /// Initialize the admin password and log in, returning the `Cookie` header
    /// value to send on admin requests.
    ///
    /// # Panics
    ///
    /// Panics if either step fails.
    pub async fn login_as_admin(&self, password: &str) -> String {
        let resp = self
            .post(
                "admin.initializePassword",
                &serde_json::json!({ "password": password }),
            )
            .await;
        assert!(resp.status().is_success(), "initializePassword failed");

        let resp = self
            .post("admin.login", &serde_json::json!({ "password": password }))
            .await;
        assert!(resp.status().is_success(), "login failed");

        let set_cookie = resp
            .headers()
            .get(reqwest::header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("login did not set a cookie");

        // "admin_token=authenticated; HttpOnly; ..." -> "admin_token=authenticated"
        set_cookie
            .split(';')
            .next()
            .unwrap_or_default()
            .to_owned()
    }
}
