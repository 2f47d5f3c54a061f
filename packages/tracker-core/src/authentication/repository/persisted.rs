//! The repository that persists users.
use std::sync::Arc;

use crate::authentication::{Passkey, User};
use crate::databases::{self, Database};

/// The persisted registry of tracker users.
pub struct DatabaseUserRepository {
    /// A database driver implementation: [`Sqlite3`](crate::databases::driver::sqlite)
    /// or [`MySQL`](crate::databases::driver::mysql).
    database: Arc<Box<dyn Database>>,
}

impl DatabaseUserRepository {
    #[must_use]
    pub fn new(database: &Arc<Box<dyn Database>>) -> Self {
        Self {
            database: database.clone(),
        }
    }

    /// Adds a user if its passkey is not already taken.
    ///
    /// # Errors
    ///
    /// Returns a `databases::error::Error` if unable to add the user.
    pub(crate) fn add(&self, user: &User) -> Result<(), databases::error::Error> {
        if self.database.get_user_from_users(&user.passkey)?.is_some() {
            return Ok(());
        }

        self.database.add_user_to_users(user)?;

        Ok(())
    }

    /// Removes the user owning the passkey, if it exists.
    ///
    /// # Errors
    ///
    /// Returns a `databases::error::Error` if unable to remove the user.
    pub(crate) fn remove(&self, passkey: &Passkey) -> Result<(), databases::error::Error> {
        if self.database.get_user_from_users(passkey)?.is_none() {
            return Ok(());
        }

        self.database.remove_user_from_users(passkey)?;

        Ok(())
    }

    /// Loads all the users from the database.
    ///
    /// # Errors
    ///
    /// Returns a `databases::error::Error` if unable to load the users.
    pub(crate) fn load_from_database(&self) -> Result<Vec<User>, databases::error::Error> {
        self.database.load_users()
    }
}

#[cfg(test)]
mod tests {

    mod the_persisted_user_repository {
        use crate::authentication::repository::persisted::DatabaseUserRepository;
        use crate::databases::setup::initialize_database;
        use crate::test_helpers::tests::{ephemeral_configuration, sample_user};

        fn initialize_database_user_repository() -> DatabaseUserRepository {
            let configuration = ephemeral_configuration();
            let database = initialize_database(&configuration);
            DatabaseUserRepository::new(&database)
        }

        #[test]
        fn it_should_add_and_load_users() {
            let repository = initialize_database_user_repository();

            let user = sample_user();

            repository.add(&user).unwrap();

            let users = repository.load_from_database().unwrap();

            assert_eq!(users.len(), 1);
            assert_eq!(users[0].passkey, user.passkey);
            assert_eq!(users[0].snatches, user.snatches);
        }

        #[test]
        fn it_should_ignore_adding_a_user_whose_passkey_is_already_registered() {
            let repository = initialize_database_user_repository();

            let user = sample_user();

            repository.add(&user).unwrap();
            repository.add(&user).unwrap();

            assert_eq!(repository.load_from_database().unwrap().len(), 1);
        }

        #[test]
        fn it_should_remove_a_user() {
            let repository = initialize_database_user_repository();

            let user = sample_user();

            repository.add(&user).unwrap();
            repository.remove(&user.passkey).unwrap();

            assert!(repository.load_from_database().unwrap().is_empty());
        }

        #[test]
        fn it_should_ignore_removing_an_unknown_user() {
            let repository = initialize_database_user_repository();

            let user = sample_user();

            repository.remove(&user.passkey).unwrap();

            assert!(repository.load_from_database().unwrap().is_empty());
        }
    }
}
