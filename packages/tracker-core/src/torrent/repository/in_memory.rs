//! The in-memory torrents repository.
//!
//! This is the canonical swarm store. Callers get their own [`Torrent`]
//! snapshots; the primitive mutations used by the storage driver operate on
//! the shared state under a read-write lock, so concurrent connections are
//! isolated at this level.
use std::collections::HashMap;
use std::sync::RwLock;

use bittorrent_primitives::info_hash::InfoHash;
use peertrack_primitives::peer::Peer;
use peertrack_primitives::{DurationSinceUnixEpoch, PersistentTorrents};

use crate::torrent::Torrent;

#[derive(Debug, Default)]
pub struct InMemoryTorrentRepository {
    torrents: RwLock<HashMap<InfoHash, Torrent>>,
}

impl InMemoryTorrentRepository {
    /// Returns a caller-owned snapshot of the torrent, or `None` if it does
    /// not exist.
    #[must_use]
    pub fn get(&self, info_hash: &InfoHash) -> Option<Torrent> {
        self.torrents.read().expect("the torrents lock should not be poisoned").get(info_hash).cloned()
    }

    /// Inserts (or replaces) a torrent entry.
    pub fn insert(&self, torrent: &Torrent) {
        self.torrents
            .write()
            .expect("the torrents lock should not be poisoned")
            .insert(torrent.info_hash, torrent.clone());
    }

    #[must_use]
    pub fn remove(&self, info_hash: &InfoHash) -> Option<Torrent> {
        self.torrents.write().expect("the torrents lock should not be poisoned").remove(info_hash)
    }

    /// Updates the last-activity marker of the torrent. Returns `false` if
    /// the torrent does not exist.
    pub fn touch(&self, info_hash: &InfoHash, now: DurationSinceUnixEpoch) -> bool {
        match self.torrents.write().expect("the torrents lock should not be poisoned").get_mut(info_hash) {
            Some(torrent) => {
                torrent.last_activity = now;
                true
            }
            None => false,
        }
    }

    /// Inserts or refreshes a peer record in the seeder pool. Returns `false`
    /// if the torrent does not exist.
    pub fn put_seeder(&self, info_hash: &InfoHash, peer: &Peer) -> bool {
        match self.torrents.write().expect("the torrents lock should not be poisoned").get_mut(info_hash) {
            Some(torrent) => {
                torrent.seeders.insert(peer.key(), *peer);
                true
            }
            None => false,
        }
    }

    /// Removes a peer record from the seeder pool. Returns `false` if the
    /// torrent does not exist. Removing an absent record is not an error.
    pub fn delete_seeder(&self, info_hash: &InfoHash, peer: &Peer) -> bool {
        match self.torrents.write().expect("the torrents lock should not be poisoned").get_mut(info_hash) {
            Some(torrent) => {
                torrent.seeders.remove(&peer.key());
                true
            }
            None => false,
        }
    }

    /// Inserts or refreshes a peer record in the leecher pool. Returns
    /// `false` if the torrent does not exist.
    pub fn put_leecher(&self, info_hash: &InfoHash, peer: &Peer) -> bool {
        match self.torrents.write().expect("the torrents lock should not be poisoned").get_mut(info_hash) {
            Some(torrent) => {
                torrent.leechers.insert(peer.key(), *peer);
                true
            }
            None => false,
        }
    }

    /// Removes a peer record from the leecher pool. Returns `false` if the
    /// torrent does not exist.
    pub fn delete_leecher(&self, info_hash: &InfoHash, peer: &Peer) -> bool {
        match self.torrents.write().expect("the torrents lock should not be poisoned").get_mut(info_hash) {
            Some(torrent) => {
                torrent.leechers.remove(&peer.key());
                true
            }
            None => false,
        }
    }

    /// Increments the snatch counter of the torrent. Returns `false` if the
    /// torrent does not exist.
    pub fn increment_snatches(&self, info_hash: &InfoHash) -> bool {
        match self.torrents.write().expect("the torrents lock should not be poisoned").get_mut(info_hash) {
            Some(torrent) => {
                torrent.snatches = torrent.snatches.wrapping_add(1);
                true
            }
            None => false,
        }
    }

    /// Removes the torrent only if its swarm is still empty.
    ///
    /// The emptiness check runs under the write lock so a concurrent announce
    /// cannot lose a freshly added peer to the purge.
    pub fn purge_if_peerless(&self, info_hash: &InfoHash) -> bool {
        let mut torrents = self.torrents.write().expect("the torrents lock should not be poisoned");

        match torrents.get(info_hash) {
            Some(torrent) if torrent.peer_count() == 0 => {
                torrents.remove(info_hash);
                true
            }
            _ => false,
        }
    }

    /// Imports persisted snatch counts, creating empty swarms for unknown
    /// torrents. Peers are never persisted, so existing pools are kept as
    /// they are.
    pub fn import_persistent(&self, persistent_torrents: &PersistentTorrents) {
        let mut torrents = self.torrents.write().expect("the torrents lock should not be poisoned");

        for (info_hash, snatches) in persistent_torrents {
            let torrent = torrents.entry(*info_hash).or_insert_with(|| Torrent::new(*info_hash));
            torrent.snatches = *snatches;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.torrents.read().expect("the torrents lock should not be poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
