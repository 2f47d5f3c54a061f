//! The repository that persists the client whitelist.
use std::sync::Arc;

use crate::databases::{self, Database};

/// The persisted list of allowed clients.
pub struct DatabaseClientWhitelist {
    /// A database driver implementation: [`Sqlite3`](crate::databases::driver::sqlite)
    /// or [`MySQL`](crate::databases::driver::mysql).
    database: Arc<Box<dyn Database>>,
}

impl DatabaseClientWhitelist {
    #[must_use]
    pub fn new(database: &Arc<Box<dyn Database>>) -> Self {
        Self {
            database: database.clone(),
        }
    }

    /// Adds a client to the whitelist if not already present.
    ///
    /// # Errors
    ///
    /// Returns a `databases::error::Error` if unable to add the client.
    pub(crate) fn add(&self, client_id: &str) -> Result<(), databases::error::Error> {
        let is_whitelisted = self.database.is_client_whitelisted(client_id)?;

        if is_whitelisted {
            return Ok(());
        }

        self.database.add_client_to_whitelist(client_id)?;

        Ok(())
    }

    /// Removes a client from the whitelist if it exists.
    ///
    /// # Errors
    ///
    /// Returns a `databases::error::Error` if unable to remove the client.
    pub(crate) fn remove(&self, client_id: &str) -> Result<(), databases::error::Error> {
        let is_whitelisted = self.database.is_client_whitelisted(client_id)?;

        if !is_whitelisted {
            return Ok(());
        }

        self.database.remove_client_from_whitelist(client_id)?;

        Ok(())
    }

    /// Loads the entire whitelist from the database.
    ///
    /// # Errors
    ///
    /// Returns a `databases::error::Error` if unable to load the whitelisted
    /// clients.
    pub(crate) fn load_from_database(&self) -> Result<Vec<String>, databases::error::Error> {
        self.database.load_client_whitelist()
    }
}
