//! The core `bittorrent-announce-core` crate contains the announce-handling
//! engine of the tracker, independent of the delivery layer.
//!
//! It contains the announce orchestration and its dependencies. It's a domain
//! layer which does not specify how the end user should connect to the
//! tracker.
//!
//! Typically this crate is intended to be used by higher components like:
//!
//! - A UDP tracker
//! - A HTTP tracker
//!
//! ```text
//!   Delivery layer  |  Domain layer
//! ----------------------------------
//!     HTTP tracker  |
//!      UDP tracker  |-> Announce core
//! ```
//!
//! # Table of contents
//!
//! - [Announce handler](#announce-handler)
//! - [Storage](#storage)
//! - [Accounting](#accounting)
//! - [Authentication](#authentication)
//! - [Whitelist](#whitelist)
//! - [Databases](#databases)
//! - [Statistics](#statistics)
//!
//! # Announce handler
//!
//! The [`AnnounceHandler`](crate::announce_handler::AnnounceHandler) is the
//! single entry point of the crate. It ingests a decoded
//! [`Announce`](crate::announce::Announce) request, mutates the swarm of the
//! referenced torrent, records accounting when the tracker is private and
//! writes the response through a [`Writer`](crate::announce::Writer).
//!
//! A `BitTorrent` swarm is a network of peers that are all trying to download
//! the same torrent. When a peer wants to find other peers it announces
//! itself to the swarm via the tracker. The tracker adds the peer to the
//! swarm and responds with a subset of the other peers, never including the
//! announcer itself.
//!
//! Dual-stacked peers are tracked as two records, one per address family,
//! sharing the same peer id. Both records are updated within one announce.
//!
//! # Storage
//!
//! Swarm state is reached through a scoped
//! [`Connection`](crate::storage::Connection) acquired from a
//! [`Pool`](crate::storage::Pool) and released on every exit path. The
//! reference driver keeps all state in memory; drivers backed by other
//! engines only have to honor the same contract.
//!
//! # Accounting
//!
//! When the tracker runs in private mode, every successful announce produces
//! an [`AnnounceDelta`](crate::announce::AnnounceDelta) which is handed to the
//! accounting [`Backend`](crate::accounting::Backend).
//!
//! # Authentication
//!
//! Private trackers resolve a [`User`](crate::authentication::User) by its
//! passkey on every announce. Users are provisioned externally; the announce
//! core never creates them.
//!
//! # Whitelist
//!
//! When client whitelisting is enabled, the azureus-style client id embedded
//! in the announcing peer id must be whitelisted for the announce to be
//! accepted.
//!
//! # Databases
//!
//! The [`databases`] module persists the data that must survive restarts:
//! per-torrent snatch counts, users and the client whitelist. There are
//! `SQLite3` and `MySQL` drivers.
//!
//! # Statistics
//!
//! The core emits fire-and-forget [`statistics`] events (new torrent, new
//! seed, snatch, ...). A failed or absent statistics sink never fails an
//! announce.
pub mod accounting;
pub mod announce;
pub mod announce_handler;
pub mod authentication;
pub mod databases;
pub mod error;
pub mod peer_selection;
pub mod statistics;
pub mod storage;
pub mod torrent;
pub mod whitelist;

pub mod test_helpers;

use peertrack_clock::clock;

/// This code needs to be copied into each crate.
/// Working version, for production.
#[cfg(not(test))]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Stopped;
