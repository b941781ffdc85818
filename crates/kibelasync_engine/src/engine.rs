//! The sync engine handle.

use crate::config::SyncConfig;
use crate::local::LocalStore;
use crate::remote::RemoteClient;
use crate::transport::GraphqlTransport;

/// Synchronizes documents between a remote store and a [`LocalStore`].
///
/// Pull and push are implemented in their own modules. The engine holds no
/// state between calls; every operation takes a
/// [`CallContext`](crate::CallContext) and runs to completion or to the
/// first error.
pub struct SyncEngine<T: GraphqlTransport, L: LocalStore> {
    pub(crate) config: SyncConfig,
    pub(crate) remote: RemoteClient<T>,
    pub(crate) local: L,
}

impl<T: GraphqlTransport, L: LocalStore> SyncEngine<T, L> {
    /// Creates a new sync engine.
    pub fn new(config: SyncConfig, transport: T, local: L) -> Self {
        Self {
            config,
            remote: RemoteClient::new(transport),
            local,
        }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Gets the remote client.
    pub fn remote(&self) -> &RemoteClient<T> {
        &self.remote
    }

    /// Gets the local store.
    pub fn local(&self) -> &L {
        &self.local
    }
}
