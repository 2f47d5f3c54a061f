//! Primitive types for the Peertrack `BitTorrent` tracker.
//!
//! This crate contains the basic data structures shared by the tracker
//! crates: peers, swarm keys and announce events. These structures are used
//! by the core announce engine and by the delivery layers built on top of it.
use std::collections::BTreeMap;
use std::time::Duration;

use bittorrent_primitives::info_hash::InfoHash;

pub mod announce_event;
pub mod peer;

/// Duration since the Unix Epoch.
pub type DurationSinceUnixEpoch = Duration;

/// Persisted torrent metrics: infohash to number of snatches (completed
/// downloads).
pub type PersistentTorrents = BTreeMap<InfoHash, u32>;

/// The IP version used by a peer: IPv4 or IPv6.
///
/// Dual-stacked peers announce on both versions and are tracked as two
/// separate records, one per version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum IPVersion {
    IPv4,
    IPv6,
}
