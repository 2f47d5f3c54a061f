//! The in-memory registry of allowed clients.
use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The client id prefixes the tracker accepts announces from.
///
/// The lookup happens on every announce when client whitelisting is enabled,
/// so the registry lives in memory. It is rebuilt from the database through
/// [`reset_with`](InMemoryClientWhitelist::reset_with) and kept in sync by
/// the [`manager`](crate::whitelist::manager).
#[derive(Debug, Default)]
pub struct InMemoryClientWhitelist {
    client_ids: RwLock<HashSet<String>>,
}

impl InMemoryClientWhitelist {
    /// Whether announces from this client are accepted.
    #[must_use]
    pub fn contains(&self, client_id: &str) -> bool {
        self.read().contains(client_id)
    }

    /// Starts accepting announces from the client.
    pub fn add(&self, client_id: &str) {
        self.write().insert(client_id.to_owned());
    }

    /// Stops accepting announces from the client.
    pub(crate) fn remove(&self, client_id: &str) {
        self.write().remove(client_id);
    }

    /// Replaces the whole registry with the given client ids.
    pub(crate) fn reset_with(&self, client_ids: Vec<String>) {
        *self.write() = client_ids.into_iter().collect();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashSet<String>> {
        self.client_ids.read().expect("the client whitelist lock should not be poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashSet<String>> {
        self.client_ids.write().expect("the client whitelist lock should not be poisoned")
    }
}
