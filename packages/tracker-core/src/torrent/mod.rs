//! Swarm data structures.
//!
//! This module defines the primary data structures used to store and manage
//! swarm data within the tracker. In `BitTorrent` terminology, a "swarm" is
//! the collection of peers that are sharing or downloading a given torrent.
//!
//! A torrent [`Entry`](crate::torrent::Torrent) keeps two pools:
//!
//! - **Seeders**: the active peers that already have the whole torrent.
//! - **Leechers**: the active peers that still have bytes left to download.
//!
//! Each pool is an unordered mapping from [`PeerKey`] to [`Peer`], so a
//! dual-stacked client occupies up to two slots per pool, one per address
//! family. A key is present in at most one of the two pools at any time; the
//! announce handler maintains that invariant.
//!
//! Besides the pools, the entry carries the number of snatches (completed
//! downloads recorded since the torrent was created) and the last-activity
//! marker touched on every announce.
//!
//! We can represent the data stored in memory for one torrent with this JSON
//! object:
//!
//! ```json
//! {
//!     "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0": {
//!         "snatches": 2,
//!         "seeders": {
//!             "-qB00000000000000001 (v4)": "126.0.0.1:8081"
//!         },
//!         "leechers": {
//!             "-qB00000000000000002 (v4)": "126.0.0.2:8082"
//!         }
//!     }
//! }
//! ```
//!
//! That JSON object does not exist, it's only a representation of the swarm
//! data.
pub mod manager;
pub mod repository;

use std::collections::HashMap;

use bittorrent_primitives::info_hash::InfoHash;
use peertrack_primitives::peer::{Peer, PeerKey};
use peertrack_primitives::DurationSinceUnixEpoch;

/// The canonical in-memory pool representation: an unordered mapping from
/// [`PeerKey`] to [`Peer`]. Iteration order is not specified.
pub type PeerMap = HashMap<PeerKey, Peer>;

/// All the data the tracker stores for one torrent.
#[derive(Debug, Clone, PartialEq)]
pub struct Torrent {
    /// The torrent identifier.
    pub info_hash: InfoHash,

    /// The number of completed downloads recorded for this torrent.
    pub snatches: u32,

    /// The active peers that have the whole torrent.
    pub seeders: PeerMap,

    /// The active peers that still have bytes left to download.
    pub leechers: PeerMap,

    /// The last time an announce touched this torrent.
    pub last_activity: DurationSinceUnixEpoch,
}

impl Torrent {
    /// Creates a torrent with empty pools, as done on the first announce of an
    /// unknown infohash when the tracker is open.
    #[must_use]
    pub fn new(info_hash: InfoHash) -> Self {
        Self {
            info_hash,
            snatches: 0,
            seeders: PeerMap::default(),
            leechers: PeerMap::default(),
            last_activity: DurationSinceUnixEpoch::ZERO,
        }
    }

    /// Whether this peer record is currently in the seeder pool.
    #[must_use]
    pub fn in_seeder_pool(&self, peer: &Peer) -> bool {
        self.seeders.contains_key(&peer.key())
    }

    /// Whether this peer record is currently in the leecher pool.
    #[must_use]
    pub fn in_leecher_pool(&self, peer: &Peer) -> bool {
        self.leechers.contains_key(&peer.key())
    }

    /// The total number of peer records in both pools.
    #[must_use]
    pub fn peer_count(&self) -> usize {
        self.seeders.len() + self.leechers.len()
    }
}
