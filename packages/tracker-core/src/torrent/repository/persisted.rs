//! The repository that stores persistent torrent data into the database.
use std::sync::Arc;

use bittorrent_primitives::info_hash::InfoHash;
use peertrack_primitives::PersistentTorrents;

use crate::databases::error::Error;
use crate::databases::Database;

/// Torrent repository implementation that persists torrent metrics in a
/// database.
///
/// Only a subset of the torrent data is persisted: the snatch count of each
/// torrent. Peers re-announce at intervals, so the swarm pools are
/// regenerated and never written to the database.
pub struct DatabasePersistentTorrentRepository {
    /// A shared reference to the database driver implementation.
    database: Arc<Box<dyn Database>>,
}

impl DatabasePersistentTorrentRepository {
    #[must_use]
    pub fn new(database: &Arc<Box<dyn Database>>) -> DatabasePersistentTorrentRepository {
        Self {
            database: database.clone(),
        }
    }

    /// Loads all persistent torrent metrics from the database.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the underlying database query fails.
    pub(crate) fn load_all(&self) -> Result<PersistentTorrents, Error> {
        self.database.load_persistent_torrents()
    }

    /// Saves the snatch count of the torrent identified by `info_hash`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the database operation fails.
    pub(crate) fn save(&self, info_hash: &InfoHash, snatches: u32) -> Result<(), Error> {
        self.database.save_persistent_torrent(info_hash, snatches)
    }
}
