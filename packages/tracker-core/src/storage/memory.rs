//! The in-memory storage driver.
//!
//! This is the reference [`Pool`]/[`Connection`] implementation. It delegates
//! to the in-memory repositories, which isolate concurrent connections with
//! their own locks, so a `MemoryConnection` is a cheap handle that can be
//! created per announce and dropped when the announce finishes.
use std::panic::Location;
use std::sync::Arc;

use bittorrent_primitives::info_hash::InfoHash;
use peertrack_clock::clock::Time;
use peertrack_primitives::peer::Peer;

use super::{Connection, Pool};
use crate::authentication::repository::in_memory::InMemoryUserRepository;
use crate::authentication::{Passkey, User};
use crate::error::Error;
use crate::torrent::repository::in_memory::InMemoryTorrentRepository;
use crate::torrent::Torrent;
use crate::whitelist::repository::in_memory::InMemoryClientWhitelist;
use crate::CurrentClock;

/// The in-memory connection pool.
///
/// Cloning the inner repositories is cheap (they are shared behind `Arc`), so
/// the pool never runs out of connections.
pub struct MemoryPool {
    torrents: Arc<InMemoryTorrentRepository>,
    users: Arc<InMemoryUserRepository>,
    client_whitelist: Arc<InMemoryClientWhitelist>,
}

impl MemoryPool {
    #[must_use]
    pub fn new(
        torrents: &Arc<InMemoryTorrentRepository>,
        users: &Arc<InMemoryUserRepository>,
        client_whitelist: &Arc<InMemoryClientWhitelist>,
    ) -> Self {
        Self {
            torrents: torrents.clone(),
            users: users.clone(),
            client_whitelist: client_whitelist.clone(),
        }
    }
}

impl Pool for MemoryPool {
    fn get(&self) -> Result<Box<dyn Connection>, Error> {
        Ok(Box::new(MemoryConnection {
            torrents: self.torrents.clone(),
            users: self.users.clone(),
            client_whitelist: self.client_whitelist.clone(),
        }))
    }
}

/// A connection handed out by the [`MemoryPool`].
pub struct MemoryConnection {
    torrents: Arc<InMemoryTorrentRepository>,
    users: Arc<InMemoryUserRepository>,
    client_whitelist: Arc<InMemoryClientWhitelist>,
}

impl Connection for MemoryConnection {
    fn find_client(&self, client_id: &str) -> Result<(), Error> {
        if self.client_whitelist.contains(client_id) {
            Ok(())
        } else {
            Err(Error::ClientNotWhitelisted {
                client_id: client_id.to_string(),
                location: Location::caller(),
            })
        }
    }

    fn find_user(&self, passkey: &Passkey) -> Result<User, Error> {
        self.users.get(passkey).ok_or(Error::UserNotFound {
            passkey: passkey.to_string(),
            location: Location::caller(),
        })
    }

    fn find_torrent(&self, info_hash: &InfoHash) -> Result<Torrent, Error> {
        self.torrents.get(info_hash).ok_or(Error::TorrentNotFound {
            info_hash: *info_hash,
            location: Location::caller(),
        })
    }

    fn put_torrent(&self, torrent: &Torrent) -> Result<(), Error> {
        self.torrents.insert(torrent);
        Ok(())
    }

    fn touch_torrent(&self, info_hash: &InfoHash) -> Result<(), Error> {
        if self.torrents.touch(info_hash, CurrentClock::now()) {
            Ok(())
        } else {
            Err(Error::TorrentNotFound {
                info_hash: *info_hash,
                location: Location::caller(),
            })
        }
    }

    fn put_seeder(&self, info_hash: &InfoHash, peer: &Peer) -> Result<(), Error> {
        if self.torrents.put_seeder(info_hash, peer) {
            Ok(())
        } else {
            Err(Error::TorrentNotFound {
                info_hash: *info_hash,
                location: Location::caller(),
            })
        }
    }

    fn delete_seeder(&self, info_hash: &InfoHash, peer: &Peer) -> Result<(), Error> {
        if self.torrents.delete_seeder(info_hash, peer) {
            Ok(())
        } else {
            Err(Error::TorrentNotFound {
                info_hash: *info_hash,
                location: Location::caller(),
            })
        }
    }

    fn put_leecher(&self, info_hash: &InfoHash, peer: &Peer) -> Result<(), Error> {
        if self.torrents.put_leecher(info_hash, peer) {
            Ok(())
        } else {
            Err(Error::TorrentNotFound {
                info_hash: *info_hash,
                location: Location::caller(),
            })
        }
    }

    fn delete_leecher(&self, info_hash: &InfoHash, peer: &Peer) -> Result<(), Error> {
        if self.torrents.delete_leecher(info_hash, peer) {
            Ok(())
        } else {
            Err(Error::TorrentNotFound {
                info_hash: *info_hash,
                location: Location::caller(),
            })
        }
    }

    fn increment_torrent_snatches(&self, info_hash: &InfoHash) -> Result<(), Error> {
        if self.torrents.increment_snatches(info_hash) {
            Ok(())
        } else {
            Err(Error::TorrentNotFound {
                info_hash: *info_hash,
                location: Location::caller(),
            })
        }
    }

    fn increment_user_snatches(&self, passkey: &Passkey) -> Result<(), Error> {
        if self.users.increment_snatches(passkey) {
            Ok(())
        } else {
            Err(Error::UserNotFound {
                passkey: passkey.to_string(),
                location: Location::caller(),
            })
        }
    }

    fn purge_inactive_torrent(&self, info_hash: &InfoHash) -> Result<(), Error> {
        // The repository re-checks emptiness under its write lock.
        self.torrents.purge_if_peerless(info_hash);
        Ok(())
    }
}

#[cfg(test)]
mod tests {

    mod the_memory_storage_driver {
        use std::sync::Arc;

        use crate::authentication::repository::in_memory::InMemoryUserRepository;
        use crate::storage::memory::MemoryPool;
        use crate::torrent::repository::in_memory::InMemoryTorrentRepository;
        use crate::whitelist::repository::in_memory::InMemoryClientWhitelist;

        fn initialize_memory_pool() -> (MemoryPool, Arc<InMemoryTorrentRepository>, Arc<InMemoryUserRepository>, Arc<InMemoryClientWhitelist>)
        {
            let torrents = Arc::new(InMemoryTorrentRepository::default());
            let users = Arc::new(InMemoryUserRepository::default());
            let client_whitelist = Arc::new(InMemoryClientWhitelist::default());

            let pool = MemoryPool::new(&torrents, &users, &client_whitelist);

            (pool, torrents, users, client_whitelist)
        }

        mod handling_torrents {
            use crate::error::Error;
            use crate::storage::memory::tests::the_memory_storage_driver::initialize_memory_pool;
            use crate::storage::Pool;
            use crate::test_helpers::tests::sample_info_hash;
            use crate::torrent::Torrent;

            #[test]
            fn it_should_store_and_find_torrents() {
                let (pool, _torrents, _users, _whitelist) = initialize_memory_pool();
                let conn = pool.get().unwrap();

                conn.put_torrent(&Torrent::new(sample_info_hash())).unwrap();

                assert_eq!(conn.find_torrent(&sample_info_hash()).unwrap(), Torrent::new(sample_info_hash()));
            }

            #[test]
            fn it_should_return_a_distinguished_error_for_an_unknown_torrent() {
                let (pool, _torrents, _users, _whitelist) = initialize_memory_pool();
                let conn = pool.get().unwrap();

                let result = conn.find_torrent(&sample_info_hash());

                assert!(matches!(result.unwrap_err(), Error::TorrentNotFound { .. }));
            }

            #[test]
            fn connections_from_the_same_pool_should_share_the_store() {
                let (pool, _torrents, _users, _whitelist) = initialize_memory_pool();

                let conn_one = pool.get().unwrap();
                let conn_two = pool.get().unwrap();

                conn_one.put_torrent(&Torrent::new(sample_info_hash())).unwrap();

                assert!(conn_two.find_torrent(&sample_info_hash()).is_ok());
            }
        }

        mod handling_swarm_mutations {
            use peertrack_primitives::peer::fixture::PeerBuilder;

            use crate::storage::memory::tests::the_memory_storage_driver::initialize_memory_pool;
            use crate::storage::Pool;
            use crate::test_helpers::tests::sample_info_hash;
            use crate::torrent::Torrent;

            #[test]
            fn it_should_move_peers_between_the_pools_only_through_explicit_operations() {
                let (pool, _torrents, _users, _whitelist) = initialize_memory_pool();
                let conn = pool.get().unwrap();

                conn.put_torrent(&Torrent::new(sample_info_hash())).unwrap();

                let peer = PeerBuilder::leecher().build();

                conn.put_leecher(&sample_info_hash(), &peer).unwrap();
                conn.delete_leecher(&sample_info_hash(), &peer).unwrap();
                conn.put_seeder(&sample_info_hash(), &peer).unwrap();

                let torrent = conn.find_torrent(&sample_info_hash()).unwrap();

                assert!(torrent.in_seeder_pool(&peer));
                assert!(!torrent.in_leecher_pool(&peer));
            }

            #[test]
            fn it_should_not_purge_a_torrent_that_still_has_peers() {
                let (pool, _torrents, _users, _whitelist) = initialize_memory_pool();
                let conn = pool.get().unwrap();

                conn.put_torrent(&Torrent::new(sample_info_hash())).unwrap();
                conn.put_seeder(&sample_info_hash(), &PeerBuilder::seeder().build()).unwrap();

                conn.purge_inactive_torrent(&sample_info_hash()).unwrap();

                assert!(conn.find_torrent(&sample_info_hash()).is_ok());
            }

            #[test]
            fn it_should_purge_a_peerless_torrent() {
                let (pool, _torrents, _users, _whitelist) = initialize_memory_pool();
                let conn = pool.get().unwrap();

                conn.put_torrent(&Torrent::new(sample_info_hash())).unwrap();

                conn.purge_inactive_torrent(&sample_info_hash()).unwrap();

                assert!(conn.find_torrent(&sample_info_hash()).is_err());
            }
        }

        mod handling_users_and_clients {
            use crate::error::Error;
            use crate::storage::memory::tests::the_memory_storage_driver::initialize_memory_pool;
            use crate::storage::Pool;
            use crate::test_helpers::tests::sample_user;

            #[test]
            fn it_should_find_a_registered_user_by_passkey() {
                let (pool, _torrents, users, _whitelist) = initialize_memory_pool();
                let conn = pool.get().unwrap();

                let user = sample_user();
                users.insert(&user);

                assert_eq!(conn.find_user(&user.passkey).unwrap(), user);
            }

            #[test]
            fn it_should_increment_the_snatches_of_a_user() {
                let (pool, _torrents, users, _whitelist) = initialize_memory_pool();
                let conn = pool.get().unwrap();

                let user = sample_user();
                users.insert(&user);

                conn.increment_user_snatches(&user.passkey).unwrap();

                assert_eq!(users.get(&user.passkey).unwrap().snatches, user.snatches + 1);
            }

            #[test]
            fn it_should_reject_clients_that_are_not_whitelisted() {
                let (pool, _torrents, _users, whitelist) = initialize_memory_pool();
                let conn = pool.get().unwrap();

                whitelist.add("qB4250");

                assert!(conn.find_client("qB4250").is_ok());
                assert!(matches!(conn.find_client("UT2210").unwrap_err(), Error::ClientNotWhitelisted { .. }));
            }
        }
    }
}
