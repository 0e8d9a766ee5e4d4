//! Application context.
//!
//! One [`App`] is built at startup and handed to every controller. It owns
//! the session explicitly; nothing in the crate reaches for global state.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::http::{HttpClient, ReqwestTransport, Transport};
use crate::navigation::Navigator;
use crate::notifier::Notifier;
use crate::session::SessionStore;
use crate::storage::{FileStore, LocalStore};

#[derive(Clone)]
pub struct App {
    config: Arc<ClientConfig>,
    client: HttpClient,
    session: Arc<SessionStore>,
    notifier: Arc<Notifier>,
    navigator: Arc<dyn Navigator>,
    store: Arc<dyn LocalStore>,
}

impl App {
    /// Wire an app from its parts.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn LocalStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(transport.clone(), store.clone()));
        let client = HttpClient::new(transport, session.clone(), navigator.clone());
        Self {
            config: Arc::new(config),
            client,
            session,
            notifier: Arc::new(Notifier::new()),
            navigator,
            store,
        }
    }

    /// Production wiring: reqwest transport and a file store under the
    /// configured state directory.
    pub fn from_config(
        config: ClientConfig,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, reqwest::Error> {
        let transport = ReqwestTransport::builder(&config).build()?;
        let store = FileStore::new(&config.state_dir);
        tracing::debug!(
            base_url = %config.base_url,
            store = %store.path().display(),
            "app configured"
        );
        Ok(Self::new(config, Arc::new(transport), Arc::new(store), navigator))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn store(&self) -> &Arc<dyn LocalStore> {
        &self.store
    }
}
