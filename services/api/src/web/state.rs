//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::config::Config;
use newswatcher_core::gate::RequestGate;
use newswatcher_core::mutator::ResourceMutator;
use newswatcher_core::ports::CredentialStore;
use newswatcher_core::session::SessionManager;

/// The shared application state, created once at startup and passed to all
/// handlers. Everything here is read-only after construction; the only
/// mutable state a request touches lives behind the store port.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub sessions: Arc<SessionManager>,
    pub gate: RequestGate,
    pub mutator: ResourceMutator,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the engine components around a store and the loaded config.
    pub fn new(store: Arc<dyn CredentialStore>, config: Arc<Config>) -> Self {
        let sessions = Arc::new(SessionManager::new(
            config.token_secret.as_bytes().to_vec(),
            chrono::Duration::hours(config.token_ttl_hours),
        ));
        Self {
            gate: RequestGate::new(sessions.clone()),
            mutator: ResourceMutator::new(store.clone()),
            store,
            sessions,
            config,
        }
    }
}
