//! The persistence module.
//!
//! Persistence is currently implemented using a single [`Database`] trait.
//!
//! There are two implementations of the trait (two drivers):
//!
//! - **`MySQL`**
//! - **`Sqlite`**
//!
//! > **NOTICE**: There are no database migrations at this time. If schema
//! > changes occur, either migration functionality will be implemented or a
//! > script will be provided to migrate to the new schema.
//!
//! The persistent objects handled by this module include:
//!
//! - **Torrent metrics**: the number of snatches (completed downloads) of
//!   each torrent.
//! - **Users**: the tracker users of a private tracker with their passkeys
//!   and snatch counters.
//! - **Client whitelist**: the list of allowed client id prefixes.
//!
//! # Torrent Metrics
//!
//! | Field       | Sample data                                | Description                                                   |
//! |-------------|--------------------------------------------|---------------------------------------------------------------|
//! | `id`        | 1                                          | Auto-increment id                                             |
//! | `info_hash` | `c1277613db1d28709b034a017ab2cae4be07ae10` | `BitTorrent` infohash V1                                      |
//! | `snatches`  | 20                                         | The number of completed downloads of the associated torrent.  |
//!
//! > **NOTICE**: The peer pools of a torrent are not persisted. Because peers
//! > re-announce at intervals, the swarm is regenerated shortly after a
//! > restart.
//!
//! # Users
//!
//! | Field      | Sample data                        | Description                                |
//! |------------|------------------------------------|--------------------------------------------|
//! | `id`       | 1                                  | Auto-increment id, the public user id      |
//! | `passkey`  | `IrweYtVuQPGbG9Jzx1DihcPmJGGpVy82` | Authentication token (32 chars)            |
//! | `snatches` | 3                                  | The number of downloads the user completed |
//!
//! # Client Whitelist
//!
//! | Field       | Sample data | Description                     |
//! |-------------|-------------|---------------------------------|
//! | `id`        | 1           | Auto-increment id               |
//! | `client_id` | `qB4250`    | Azureus-style client id prefix  |
pub mod driver;
pub mod error;
pub mod setup;

use bittorrent_primitives::info_hash::InfoHash;
use mockall::automock;
use peertrack_primitives::PersistentTorrents;

use self::error::Error;
use crate::authentication::{Passkey, User};

/// The persistence trait.
///
/// This trait defines all the methods required to interact with the database,
/// including creating and dropping schema tables, and CRUD operations for
/// torrent metrics, users and the client whitelist. Implementations of this
/// trait must ensure that operations are safe, consistent, and report errors
/// using the [`Error`] type.
#[automock]
pub trait Database: Sync + Send {
    /// Creates the necessary database tables.
    ///
    /// The SQL queries for table creation are hardcoded in the trait
    /// implementation.
    ///
    /// # Context: Schema
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the tables cannot be created.
    fn create_database_tables(&self) -> Result<(), Error>;

    /// Drops the database tables.
    ///
    /// # Context: Schema
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the tables cannot be dropped.
    fn drop_database_tables(&self) -> Result<(), Error>;

    // Torrent Metrics

    /// Loads torrent metrics data from the database.
    ///
    /// This function returns the persistent torrent metrics as a collection
    /// of tuples, where each tuple contains an [`InfoHash`] and the number of
    /// snatches.
    ///
    /// # Context: Torrent Metrics
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the metrics cannot be loaded.
    fn load_persistent_torrents(&self) -> Result<PersistentTorrents, Error>;

    /// Saves torrent metrics data into the database.
    ///
    /// # Context: Torrent Metrics
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the metrics cannot be saved.
    fn save_persistent_torrent(&self, info_hash: &InfoHash, snatches: u32) -> Result<(), Error>;

    // Users

    /// Loads all the users from the database.
    ///
    /// # Context: Users
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the users cannot be loaded.
    fn load_users(&self) -> Result<Vec<User>, Error>;

    /// Retrieves the user owning a passkey from the database.
    ///
    /// Returns `Some(User)` if a user owning the provided [`Passkey`] exists,
    /// or `None` otherwise.
    ///
    /// # Context: Users
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the user cannot be queried.
    fn get_user_from_users(&self, passkey: &Passkey) -> Result<Option<User>, Error>;

    /// Adds a user to the database.
    ///
    /// # Context: Users
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the user cannot be saved.
    fn add_user_to_users(&self, user: &User) -> Result<usize, Error>;

    /// Removes the user owning a passkey from the database.
    ///
    /// # Context: Users
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the user cannot be removed.
    fn remove_user_from_users(&self, passkey: &Passkey) -> Result<usize, Error>;

    // Client whitelist

    /// Loads the whitelisted clients from the database.
    ///
    /// # Context: Client Whitelist
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the whitelist cannot be loaded.
    fn load_client_whitelist(&self) -> Result<Vec<String>, Error>;

    /// Retrieves a whitelisted client from the database.
    ///
    /// Returns `Some(client_id)` if the client is in the whitelist, or `None`
    /// otherwise.
    ///
    /// # Context: Client Whitelist
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the whitelist cannot be queried.
    fn get_client_from_whitelist(&self, client_id: &str) -> Result<Option<String>, Error>;

    /// Adds a client to the whitelist.
    ///
    /// # Context: Client Whitelist
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the client cannot be added to the whitelist.
    fn add_client_to_whitelist(&self, client_id: &str) -> Result<usize, Error>;

    /// Checks whether a client is whitelisted.
    ///
    /// This default implementation returns `true` if the client id is
    /// included in the whitelist, or `false` otherwise.
    ///
    /// # Context: Client Whitelist
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the whitelist cannot be queried.
    fn is_client_whitelisted(&self, client_id: &str) -> Result<bool, Error> {
        Ok(self.get_client_from_whitelist(client_id)?.is_some())
    }

    /// Removes a client from the whitelist.
    ///
    /// # Context: Client Whitelist
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the client cannot be removed from the
    /// whitelist.
    fn remove_client_from_whitelist(&self, client_id: &str) -> Result<usize, Error>;
}
