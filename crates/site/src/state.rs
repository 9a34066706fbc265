//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::db::{DynStore, Store};
use crate::services::notify::{DynNotifier, Notifier};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the storage backend, the owner notifier
/// and configuration; nothing is process-global.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    store: DynStore,
    notifier: DynNotifier,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration
    /// * `store` - Storage backend for submissions and the admin credential
    /// * `notifier` - Owner notification adapter
    #[must_use]
    pub fn new(config: SiteConfig, store: DynStore, notifier: DynNotifier) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                notifier,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Get a reference to the owner notifier.
    #[must_use]
    pub fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }
}
