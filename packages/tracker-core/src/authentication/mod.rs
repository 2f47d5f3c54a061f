//! Tracker user authentication.
//!
//! When the tracker runs in private mode every announce must carry a
//! [`Passkey`]. The passkey identifies a [`User`], whose snatch counter is
//! maintained by the announce engine. Users are provisioned by an external
//! system (for example the website of a private tracker); the announce core
//! only resolves and updates them, it never creates them.
//!
//! Passkeys are stored in this struct:
//!
//! ```rust,no_run
//! use bittorrent_announce_core::authentication::Passkey;
//! use peertrack_primitives::peer::UserId;
//!
//! pub struct User {
//!     /// The identifier referenced by the peers the user announces.
//!     pub id: UserId,
//!
//!     /// Random 32-char string. For example: `YZSl4lMZupRuOpSRC3krIKR5BPB14nrJ`
//!     pub passkey: Passkey,
//!
//!     /// The number of downloads this user has completed.
//!     pub snatches: u32,
//! }
//! ```
pub mod manager;
pub mod passkey;
pub mod repository;

use peertrack_primitives::peer::UserId;
use serde::{Deserialize, Serialize};

pub type Passkey = passkey::Passkey;
pub type ParsePasskeyError = passkey::ParsePasskeyError;

/// Passkey length.
///
/// For more information see the [`Passkey`] documentation.
pub const PASSKEY_LENGTH: usize = 32;

/// A tracker user (private trackers only).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// The identifier referenced by the peers the user announces.
    pub id: UserId,

    /// The token the user authenticates with.
    pub passkey: Passkey,

    /// The number of downloads this user has completed.
    pub snatches: u32,
}
