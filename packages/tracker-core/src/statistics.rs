//! Structs to collect and keep swarm metrics.
//!
//! The announce engine emits an event every time a swarm changes in a way
//! worth counting:
//!
//! - A torrent is created or purged.
//! - A peer joins a pool or leaves it.
//! - A download is completed.
//!
//! The data is collected by using an `event-sender -> event listener` model.
//!
//! The engine uses an [`EventSender`] instance to send an event. The
//! [`Keeper`] listens to new events and uses the [`Repo`] to upgrade and
//! store metrics. Sending an event never blocks nor fails an announce: the
//! sink is a best-effort observer and events may be reordered with respect to
//! each other across announces.
//!
//! See the [`Event`] enum to check which events are available.
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::{automock, predicate::str};
use peertrack_primitives::IPVersion;
use tokio::sync::mpsc::error::SendError;
use tokio::sync::{mpsc, RwLock, RwLockReadGuard};
use tracing::debug;

const CHANNEL_BUFFER_SIZE: usize = 65_535;

/// A swarm statistics event.
///
/// Peer-level events carry the IP version of the peer record that triggered
/// them, so dual-stacked peers are counted once per address family.
#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    /// A torrent was created by the first announce for its infohash.
    NewTorrent,
    /// A peerless torrent was purged.
    DeletedTorrent,
    /// A new peer joined the seeder pool of a torrent.
    NewSeed { ip_version: IPVersion },
    /// A new peer joined the leecher pool of a torrent.
    NewLeech { ip_version: IPVersion },
    /// A peer left the seeder pool of a torrent.
    DeletedSeed { ip_version: IPVersion },
    /// A peer left the leecher pool of a torrent.
    DeletedLeech { ip_version: IPVersion },
    /// A leecher finished its download and became a seeder.
    Completed { ip_version: IPVersion },
}

/// Metrics collected by the tracker.
///
/// Peer-level counters are collected for each IP version used by the peers.
#[derive(Debug, PartialEq, Default)]
pub struct Metrics {
    /// Total number of torrents created by announces.
    pub torrents_added: u64,
    /// Total number of peerless torrents purged.
    pub torrents_deleted: u64,
    /// Total number of peers that joined a seeder pool from an IPv4 address.
    pub seeders_added_ipv4: u64,
    /// Total number of peers that joined a seeder pool from an IPv6 address.
    pub seeders_added_ipv6: u64,
    /// Total number of peers that joined a leecher pool from an IPv4 address.
    pub leechers_added_ipv4: u64,
    /// Total number of peers that joined a leecher pool from an IPv6 address.
    pub leechers_added_ipv6: u64,
    /// Total number of peers that left a seeder pool from an IPv4 address.
    pub seeders_deleted_ipv4: u64,
    /// Total number of peers that left a seeder pool from an IPv6 address.
    pub seeders_deleted_ipv6: u64,
    /// Total number of peers that left a leecher pool from an IPv4 address.
    pub leechers_deleted_ipv4: u64,
    /// Total number of peers that left a leecher pool from an IPv6 address.
    pub leechers_deleted_ipv6: u64,
    /// Total number of downloads completed from an IPv4 address.
    pub downloads_completed_ipv4: u64,
    /// Total number of downloads completed from an IPv6 address.
    pub downloads_completed_ipv6: u64,
}

/// The service responsible for keeping tracker metrics (listening to
/// statistics events and handling them).
///
/// It actively listens to new statistics events. When it receives a new event
/// it accordingly increases the counters.
pub struct Keeper {
    pub repository: Repo,
}

impl Default for Keeper {
    fn default() -> Self {
        Self::new()
    }
}

impl Keeper {
    #[must_use]
    pub fn new() -> Self {
        Self { repository: Repo::new() }
    }

    #[must_use]
    pub fn new_active_instance() -> (Box<dyn EventSender>, Repo) {
        let mut stats_tracker = Self::new();

        let stats_event_sender = stats_tracker.run_event_listener();

        (stats_event_sender, stats_tracker.repository)
    }

    pub fn run_event_listener(&mut self) -> Box<dyn EventSender> {
        let (sender, receiver) = mpsc::channel::<Event>(CHANNEL_BUFFER_SIZE);

        let stats_repository = self.repository.clone();

        tokio::spawn(async move { event_listener(receiver, stats_repository).await });

        Box::new(Sender { sender })
    }
}

async fn event_listener(mut receiver: mpsc::Receiver<Event>, stats_repository: Repo) {
    while let Some(event) = receiver.recv().await {
        event_handler(event, &stats_repository).await;
    }
}

async fn event_handler(event: Event, stats_repository: &Repo) {
    match event {
        Event::NewTorrent => {
            stats_repository.increase_torrents_added().await;
        }
        Event::DeletedTorrent => {
            stats_repository.increase_torrents_deleted().await;
        }
        Event::NewSeed { ip_version } => {
            stats_repository.increase_seeders_added(ip_version).await;
        }
        Event::NewLeech { ip_version } => {
            stats_repository.increase_leechers_added(ip_version).await;
        }
        Event::DeletedSeed { ip_version } => {
            stats_repository.increase_seeders_deleted(ip_version).await;
        }
        Event::DeletedLeech { ip_version } => {
            stats_repository.increase_leechers_deleted(ip_version).await;
        }
        Event::Completed { ip_version } => {
            stats_repository.increase_downloads_completed(ip_version).await;
        }
    }

    debug!("stats: {:?}", stats_repository.get_stats().await);
}

/// A trait to allow sending statistics events.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait EventSender: Sync + Send {
    async fn send_event(&self, event: Event) -> Option<Result<(), SendError<Event>>>;
}

/// An [`EventSender`] implementation.
///
/// It uses a channel sender to send the statistic events. The channel is
/// created by a [`Keeper`].
pub struct Sender {
    sender: mpsc::Sender<Event>,
}

#[async_trait]
impl EventSender for Sender {
    async fn send_event(&self, event: Event) -> Option<Result<(), SendError<Event>>> {
        Some(self.sender.send(event).await)
    }
}

/// A repository for the tracker metrics.
#[derive(Clone)]
pub struct Repo {
    pub stats: Arc<RwLock<Metrics>>,
}

impl Default for Repo {
    fn default() -> Self {
        Self::new()
    }
}

impl Repo {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(Metrics::default())),
        }
    }

    pub async fn get_stats(&self) -> RwLockReadGuard<'_, Metrics> {
        self.stats.read().await
    }

    pub async fn increase_torrents_added(&self) {
        let mut stats_lock = self.stats.write().await;
        stats_lock.torrents_added += 1;
        drop(stats_lock);
    }

    pub async fn increase_torrents_deleted(&self) {
        let mut stats_lock = self.stats.write().await;
        stats_lock.torrents_deleted += 1;
        drop(stats_lock);
    }

    pub async fn increase_seeders_added(&self, ip_version: IPVersion) {
        let mut stats_lock = self.stats.write().await;
        match ip_version {
            IPVersion::IPv4 => stats_lock.seeders_added_ipv4 += 1,
            IPVersion::IPv6 => stats_lock.seeders_added_ipv6 += 1,
        }
        drop(stats_lock);
    }

    pub async fn increase_leechers_added(&self, ip_version: IPVersion) {
        let mut stats_lock = self.stats.write().await;
        match ip_version {
            IPVersion::IPv4 => stats_lock.leechers_added_ipv4 += 1,
            IPVersion::IPv6 => stats_lock.leechers_added_ipv6 += 1,
        }
        drop(stats_lock);
    }

    pub async fn increase_seeders_deleted(&self, ip_version: IPVersion) {
        let mut stats_lock = self.stats.write().await;
        match ip_version {
            IPVersion::IPv4 => stats_lock.seeders_deleted_ipv4 += 1,
            IPVersion::IPv6 => stats_lock.seeders_deleted_ipv6 += 1,
        }
        drop(stats_lock);
    }

    pub async fn increase_leechers_deleted(&self, ip_version: IPVersion) {
        let mut stats_lock = self.stats.write().await;
        match ip_version {
            IPVersion::IPv4 => stats_lock.leechers_deleted_ipv4 += 1,
            IPVersion::IPv6 => stats_lock.leechers_deleted_ipv6 += 1,
        }
        drop(stats_lock);
    }

    pub async fn increase_downloads_completed(&self, ip_version: IPVersion) {
        let mut stats_lock = self.stats.write().await;
        match ip_version {
            IPVersion::IPv4 => stats_lock.downloads_completed_ipv4 += 1,
            IPVersion::IPv6 => stats_lock.downloads_completed_ipv6 += 1,
        }
        drop(stats_lock);
    }
}
