//! User manager.
//!
//! This module provides the `UserManager` struct, which keeps the in-memory
//! registry of tracker users in sync with the persisted one.
use std::sync::Arc;

use super::repository::in_memory::InMemoryUserRepository;
use super::repository::persisted::DatabaseUserRepository;
use super::{Passkey, User};
use crate::databases;

/// Manages the tracker users of a private tracker.
pub struct UserManager {
    /// The in-memory registry of users.
    in_memory_user_repository: Arc<InMemoryUserRepository>,

    /// The persisted registry of users.
    database_user_repository: Arc<DatabaseUserRepository>,
}

impl UserManager {
    #[must_use]
    pub fn new(
        database_user_repository: Arc<DatabaseUserRepository>,
        in_memory_user_repository: Arc<InMemoryUserRepository>,
    ) -> Self {
        Self {
            in_memory_user_repository,
            database_user_repository,
        }
    }

    /// Adds a user to both the persisted and the in-memory registries.
    ///
    /// # Errors
    ///
    /// Returns a `databases::error::Error` if the operation fails in the
    /// database.
    pub fn add_user(&self, user: &User) -> Result<(), databases::error::Error> {
        self.database_user_repository.add(user)?;
        self.in_memory_user_repository.insert(user);
        Ok(())
    }

    /// Removes a user from both registries.
    ///
    /// # Errors
    ///
    /// Returns a `databases::error::Error` if the operation fails in the
    /// database.
    pub fn remove_user(&self, passkey: &Passkey) -> Result<(), databases::error::Error> {
        self.database_user_repository.remove(passkey)?;
        self.in_memory_user_repository.remove(passkey);
        Ok(())
    }

    /// Loads the users from the database into memory, replacing the current
    /// in-memory registry.
    ///
    /// # Errors
    ///
    /// Returns a `databases::error::Error` if unable to load the users from
    /// the database.
    pub fn load_users_from_database(&self) -> Result<(), databases::error::Error> {
        let users = self.database_user_repository.load_from_database()?;

        self.in_memory_user_repository.reset_with(users);

        Ok(())
    }
}
