use std::collections::HashMap;
use std::sync::RwLock;

use crate::authentication::{Passkey, User};

/// In-memory implementation of the user repository.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    /// Tracker users indexed by passkey. Only for private trackers.
    users: RwLock<HashMap<Passkey, User>>,
}

impl InMemoryUserRepository {
    /// It adds (or replaces) a user.
    pub fn insert(&self, user: &User) {
        self.users
            .write()
            .expect("the users lock should not be poisoned")
            .insert(user.passkey.clone(), user.clone());
    }

    /// It removes the user owning the passkey.
    pub fn remove(&self, passkey: &Passkey) {
        self.users.write().expect("the users lock should not be poisoned").remove(passkey);
    }

    #[must_use]
    pub fn get(&self, passkey: &Passkey) -> Option<User> {
        self.users.read().expect("the users lock should not be poisoned").get(passkey).cloned()
    }

    /// Increments the snatch counter of the user owning the passkey. Returns
    /// `false` if no user owns it.
    pub fn increment_snatches(&self, passkey: &Passkey) -> bool {
        match self.users.write().expect("the users lock should not be poisoned").get_mut(passkey) {
            Some(user) => {
                user.snatches = user.snatches.wrapping_add(1);
                true
            }
            None => false,
        }
    }

    /// It resets the registry with a new list of users.
    pub fn reset_with(&self, users: Vec<User>) {
        let mut users_lock = self.users.write().expect("the users lock should not be poisoned");

        users_lock.clear();

        for user in users {
            users_lock.insert(user.passkey.clone(), user);
        }
    }
}

#[cfg(test)]
mod tests {

    mod the_in_memory_user_repository_should {
        use peertrack_primitives::peer::UserId;

        use crate::authentication::repository::in_memory::InMemoryUserRepository;
        use crate::authentication::{Passkey, User};

        fn sample_user() -> User {
            User {
                id: UserId(1),
                passkey: "YZSl4lMZupRuOpSRC3krIKR5BPB14nrJ".parse::<Passkey>().unwrap(),
                snatches: 0,
            }
        }

        #[test]
        fn insert_a_new_user() {
            let repository = InMemoryUserRepository::default();

            let user = sample_user();
            repository.insert(&user);

            assert_eq!(repository.get(&user.passkey), Some(user));
        }

        #[test]
        fn remove_a_user() {
            let repository = InMemoryUserRepository::default();

            let user = sample_user();
            repository.insert(&user);
            repository.remove(&user.passkey);

            assert!(repository.get(&user.passkey).is_none());
        }

        #[test]
        fn increment_the_snatches_of_a_user() {
            let repository = InMemoryUserRepository::default();

            let user = sample_user();
            repository.insert(&user);

            assert!(repository.increment_snatches(&user.passkey));
            assert_eq!(repository.get(&user.passkey).unwrap().snatches, 1);
        }

        #[test]
        fn not_increment_the_snatches_of_an_unknown_user() {
            let repository = InMemoryUserRepository::default();

            assert!(!repository.increment_snatches(&Passkey::random()));
        }

        #[test]
        fn reset_the_registry_with_a_new_list_of_users() {
            let repository = InMemoryUserRepository::default();

            let stale_user = sample_user();
            repository.insert(&stale_user);

            let fresh_user = User {
                id: UserId(2),
                passkey: Passkey::random(),
                snatches: 5,
            };

            repository.reset_with(vec![fresh_user.clone()]);

            assert!(repository.get(&stale_user.passkey).is_none());
            assert_eq!(repository.get(&fresh_user.passkey), Some(fresh_user));
        }
    }
}
