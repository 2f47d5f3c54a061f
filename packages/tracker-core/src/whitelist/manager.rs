//! Client whitelist manager.
//!
//! This module provides the `ClientWhitelistManager` struct, which keeps the
//! in-memory client whitelist in sync with the persisted one.
use std::sync::Arc;

use super::repository::in_memory::InMemoryClientWhitelist;
use super::repository::persisted::DatabaseClientWhitelist;
use crate::databases;

/// Manages the whitelist of allowed clients.
pub struct ClientWhitelistManager {
    /// The in-memory list of allowed clients.
    in_memory_whitelist: Arc<InMemoryClientWhitelist>,

    /// The persisted list of allowed clients.
    database_whitelist: Arc<DatabaseClientWhitelist>,
}

impl ClientWhitelistManager {
    #[must_use]
    pub fn new(database_whitelist: Arc<DatabaseClientWhitelist>, in_memory_whitelist: Arc<InMemoryClientWhitelist>) -> Self {
        Self {
            in_memory_whitelist,
            database_whitelist,
        }
    }

    /// Adds a client to the whitelist.
    ///
    /// # Errors
    ///
    /// Returns a `databases::error::Error` if the operation fails in the
    /// database.
    pub fn add_client(&self, client_id: &str) -> Result<(), databases::error::Error> {
        self.database_whitelist.add(client_id)?;
        self.in_memory_whitelist.add(client_id);
        Ok(())
    }

    /// Removes a client from the whitelist.
    ///
    /// # Errors
    ///
    /// Returns a `databases::error::Error` if the operation fails in the
    /// database.
    pub fn remove_client(&self, client_id: &str) -> Result<(), databases::error::Error> {
        self.database_whitelist.remove(client_id)?;
        self.in_memory_whitelist.remove(client_id);
        Ok(())
    }

    /// Loads the whitelist from the database into memory, replacing the
    /// current in-memory whitelist.
    ///
    /// # Errors
    ///
    /// Returns a `databases::error::Error` if unable to load the whitelisted
    /// clients from the database.
    pub fn load_client_whitelist_from_database(&self) -> Result<(), databases::error::Error> {
        let whitelisted_clients = self.database_whitelist.load_from_database()?;

        self.in_memory_whitelist.reset_with(whitelisted_clients);

        Ok(())
    }
}
