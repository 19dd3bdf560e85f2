/// Engine bundle
///
/// Wires every service over one store and one configuration. The boundary
/// layer (HTTP, RPC, CLI, whatever hosts the core) constructs one `Engine`
/// at startup and hands each request's verified identity to the service it
/// needs.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskcrew_engine::Engine;
/// use taskcrew_shared::config::{Config, Policy, TokenConfig};
/// use taskcrew_shared::store::MemoryStore;
///
/// let engine = Engine::new(
///     Arc::new(MemoryStore::new()),
///     Config::new(
///         Policy::default(),
///         TokenConfig::new("a-development-secret-of-32-bytes!"),
///     ),
/// );
/// ```
use std::sync::Arc;

use taskcrew_shared::config::Config;
use taskcrew_shared::store::Store;

use crate::analytics::Analytics;
use crate::directory::Directory;
use crate::lifecycle::Lifecycle;
use crate::reports::Reports;
use crate::roster::Roster;

/// All taskcrew services over one store
#[derive(Clone)]
pub struct Engine {
    /// Registration, approval, authentication
    pub directory: Directory,

    /// Groups and manager resolution
    pub roster: Roster,

    /// Task creation, transitions, visibility, comments
    pub lifecycle: Lifecycle,

    /// Workload and performance metrics
    pub analytics: Analytics,

    /// System-wide distributions
    pub reports: Reports,
}

impl Engine {
    /// Builds the full service set over the given store and configuration
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let roster = Roster::new(store.clone());

        Engine {
            directory: Directory::new(store.clone(), config.token.clone()),
            lifecycle: Lifecycle::new(store.clone(), roster.clone()),
            analytics: Analytics::new(store.clone(), roster.clone(), config.policy.clone()),
            reports: Reports::new(store, config.policy),
            roster,
        }
    }
}
