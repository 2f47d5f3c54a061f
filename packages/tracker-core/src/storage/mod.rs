//! The swarm storage interface.
//!
//! Every announce works through a scoped [`Connection`] acquired from a
//! [`Pool`]. The connection is the unit of serialization for the storage
//! mutations of a single announce: the announce handler acquires it on entry
//! and it is released when the boxed handle is dropped, on every exit path.
//!
//! The interface mirrors the data the announce engine needs:
//!
//! - **Lookups**: clients (whitelist validation), users (private trackers)
//!   and torrents.
//! - **Swarm mutations**: inserting or refreshing peers in the seeder and
//!   leecher pools, deleting them, touching the torrent's last-activity
//!   marker and bumping snatch counters.
//! - **Purging**: removing a torrent whose swarm became empty. The driver is
//!   responsible for making the purge race-safe against concurrent announces.
//!
//! [`Connection::find_torrent`] hands out a caller-owned [`Torrent`]
//! snapshot; the announce handler mirrors every storage mutation into its
//! snapshot so that the response can be shaped without further lookups.
//!
//! The [`memory`] module contains the reference driver, which keeps all the
//! state in memory. Drivers backed by other storage engines only have to
//! honor the same contract; the core makes no claim that swarm updates of
//! different announces are serialized with respect to each other.
pub mod memory;

use bittorrent_primitives::info_hash::InfoHash;
use mockall::automock;
use peertrack_primitives::peer::Peer;

use crate::authentication::{Passkey, User};
use crate::error::Error;
use crate::torrent::Torrent;

/// A pool of storage connections.
pub trait Pool: Sync + Send {
    /// Acquires a connection. May block until one is available.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if no connection can be obtained.
    fn get(&self) -> Result<Box<dyn Connection>, Error>;
}

/// A scoped storage connection.
///
/// Dropping the boxed connection releases it. All operations may block on the
/// underlying storage engine.
#[automock]
pub trait Connection: Send {
    /// Validates that the client id is whitelisted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClientNotWhitelisted`] if it is not.
    fn find_client(&self, client_id: &str) -> Result<(), Error>;

    /// Resolves a user by its passkey.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] if no user owns the passkey.
    fn find_user(&self, passkey: &Passkey) -> Result<User, Error>;

    /// Returns a caller-owned snapshot of the torrent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TorrentNotFound`] if the torrent does not exist.
    fn find_torrent(&self, info_hash: &InfoHash) -> Result<Torrent, Error>;

    /// Stores a torrent, replacing any previous entry for the same infohash.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the torrent cannot be stored.
    fn put_torrent(&self, torrent: &Torrent) -> Result<(), Error>;

    /// Updates the last-activity marker of the torrent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TorrentNotFound`] if the torrent does not exist.
    fn touch_torrent(&self, info_hash: &InfoHash) -> Result<(), Error>;

    /// Inserts or refreshes a peer record in the seeder pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TorrentNotFound`] if the torrent does not exist.
    fn put_seeder(&self, info_hash: &InfoHash, peer: &Peer) -> Result<(), Error>;

    /// Removes a peer record from the seeder pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TorrentNotFound`] if the torrent does not exist.
    fn delete_seeder(&self, info_hash: &InfoHash, peer: &Peer) -> Result<(), Error>;

    /// Inserts or refreshes a peer record in the leecher pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TorrentNotFound`] if the torrent does not exist.
    fn put_leecher(&self, info_hash: &InfoHash, peer: &Peer) -> Result<(), Error>;

    /// Removes a peer record from the leecher pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TorrentNotFound`] if the torrent does not exist.
    fn delete_leecher(&self, info_hash: &InfoHash, peer: &Peer) -> Result<(), Error>;

    /// Increments the snatch counter of the torrent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TorrentNotFound`] if the torrent does not exist.
    fn increment_torrent_snatches(&self, info_hash: &InfoHash) -> Result<(), Error>;

    /// Increments the snatch counter of the user owning the passkey.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] if no user owns the passkey.
    fn increment_user_snatches(&self, passkey: &Passkey) -> Result<(), Error>;

    /// Removes the torrent if its swarm is still empty.
    ///
    /// The driver must re-check emptiness atomically so a concurrent announce
    /// cannot be lost to the purge.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the purge cannot be attempted.
    fn purge_inactive_torrent(&self, info_hash: &InfoHash) -> Result<(), Error>;
}
