//! Announce handler.
//!
//! Handling `announce` requests is the most important task for a `BitTorrent`
//! tracker.
//!
//! A `BitTorrent` swarm is a network of peers that are all trying to download
//! the same torrent. When a peer wants to find other peers it announces
//! itself to the swarm via the tracker. The peer sends its data to the
//! tracker so that the tracker can add it to the swarm. The tracker responds
//! to the peer with the list of other peers in the swarm so that the peer can
//! contact them to start downloading pieces of the file from them.
//!
//! The handler is transport-independent: a decoded [`Announce`] comes in, the
//! response goes out through the transport's [`Writer`]. One announce is
//! handled like this:
//!
//! 1. Acquire a storage [`Connection`]; it is released on every exit path.
//! 2. Validate the client id against the whitelist, when enabled.
//! 3. Resolve the user by its passkey, when the tracker is private.
//! 4. Resolve the torrent. An unknown torrent is created on the fly when the
//!    tracker is open and rejected when it is private.
//! 5. Derive up to two peer records from the announce, one per address
//!    family, and run the swarm update for each of them.
//! 6. Run the event state machine for each of them. The swarm updates of
//!    both families complete before any event handling runs, so the event
//!    machine observes the updated pools.
//! 7. Record the announce delta (private) or purge the torrent if its swarm
//!    became empty (open, when enabled).
//! 8. Shape the response and hand it to the writer.
//!
//! The swarm itself is a small state machine per (torrent, peer record):
//! `started` and regular announces insert or refresh the peer in the pool
//! implied by the number of bytes it has left; `stopped` and `paused` remove
//! it; `completed` moves it from the leechers to the seeders and counts a
//! snatch. A leecher announcing zero bytes left without any event is moved
//! silently, without touching the snatch counters, to stay compatible with
//! clients that skip the `completed` event.
//!
//! Dual-stacked peers are two records sharing one peer id. A successful
//! completion is counted at most once across both records: when one family
//! finishes while the other already seeds, the counters are left alone. A
//! `completed` from a peer outside the leecher pool still moves the counters
//! before the announce is rejected.
use std::cmp::min;
use std::panic::Location;
use std::sync::Arc;

use peertrack_configuration::{Core, TORRENT_PEERS_LIMIT};
use peertrack_primitives::announce_event::AnnounceEvent;
use peertrack_primitives::peer::{Peer, PeerKey};
use peertrack_primitives::IPVersion;

use crate::accounting::Backend;
use crate::announce::{Announce, AnnounceDelta, AnnounceResponse, Writer};
use crate::authentication::User;
use crate::error::Error;
use crate::peer_selection;
use crate::statistics;
use crate::storage::{Connection, Pool};
use crate::torrent::repository::persisted::DatabasePersistentTorrentRepository;
use crate::torrent::Torrent;

/// Handles `announce` requests from `BitTorrent` clients.
pub struct AnnounceHandler {
    /// The tracker configuration.
    config: Core,

    /// The swarm storage pool.
    pool: Arc<dyn Pool>,

    /// Repository for persistent torrent data (database).
    db_torrent_repository: Arc<DatabasePersistentTorrentRepository>,

    /// The accounting sink, used when the tracker is private.
    backend: Arc<dyn Backend>,

    /// The statistics event sender, when statistics are enabled.
    stats_event_sender: Arc<Option<Box<dyn statistics::EventSender>>>,
}

impl AnnounceHandler {
    /// Creates a new `AnnounceHandler`.
    #[must_use]
    pub fn new(
        config: &Core,
        pool: &Arc<dyn Pool>,
        db_torrent_repository: &Arc<DatabasePersistentTorrentRepository>,
        backend: &Arc<dyn Backend>,
        stats_event_sender: &Arc<Option<Box<dyn statistics::EventSender>>>,
    ) -> Self {
        Self {
            config: config.clone(),
            pool: pool.clone(),
            db_torrent_repository: db_torrent_repository.clone(),
            backend: backend.clone(),
            stats_event_sender: stats_event_sender.clone(),
        }
    }

    /// Processes an announce request from a peer.
    ///
    /// BEP 03: [The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html).
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the announce is rejected (unknown client,
    /// user or torrent, or an illogical event sequence) or when storage,
    /// accounting or the writer fail. Mutations already applied are not
    /// rolled back.
    pub async fn handle_announce<W: Writer>(&self, ann: &Announce, writer: &mut W) -> Result<(), Error> {
        tracing::debug!("announce for {} from client {}", ann.info_hash, ann.client_id());

        let conn = self.pool.get()?;

        if self.config.client_whitelist_enabled {
            conn.find_client(&ann.client_id())?;
        }

        let mut user = if self.config.private {
            let passkey = ann.passkey.as_ref().ok_or(Error::MissingPasskey {
                location: Location::caller(),
            })?;
            Some(conn.find_user(passkey)?)
        } else {
            None
        };

        let mut torrent = match conn.find_torrent(&ann.info_hash) {
            Ok(torrent) => torrent,
            Err(Error::TorrentNotFound { .. }) if !self.config.private => {
                let torrent = Torrent::new(ann.info_hash);
                conn.put_torrent(&torrent)?;
                self.send_stats_event(statistics::Event::NewTorrent).await;
                torrent
            }
            Err(err) => return Err(err),
        };

        let (announcer, peer_v4, peer_v6) = ann.derive_peers(user.as_ref());

        let mut created_v4 = false;
        let mut created_v6 = false;
        let mut snatched_v4 = false;
        let mut snatched_v6 = false;

        if let Some(peer) = &peer_v4 {
            created_v4 = self.update_swarm(&*conn, ann, peer, &mut torrent).await?;
        }
        if let Some(peer) = &peer_v6 {
            created_v6 = self.update_swarm(&*conn, ann, peer, &mut torrent).await?;
        }

        if let Some(peer) = &peer_v4 {
            snatched_v4 = self.handle_event(&*conn, ann, peer, user.as_mut(), &mut torrent).await?;
        }
        if let Some(peer) = &peer_v6 {
            snatched_v6 = self.handle_event(&*conn, ann, peer, user.as_mut(), &mut torrent).await?;
        }

        let created = created_v4 || created_v6;
        let snatched = snatched_v4 || snatched_v6;

        if snatched && self.config.tracker_policy.persistent_snatch_stats {
            drop(self.db_torrent_repository.save(&ann.info_hash, torrent.snatches));
        }

        if let Some(user) = &user {
            let delta = AnnounceDelta::new(ann, &announcer, user, created, snatched);
            self.backend.record_announce(&delta).map_err(|source| Error::Accounting { source })?;
        } else if self.config.tracker_policy.remove_peerless_torrents && torrent.peer_count() == 0 {
            // The driver re-checks emptiness, so a concurrent announce cannot
            // be lost to the purge.
            drop(conn.purge_inactive_torrent(&ann.info_hash));
            self.send_stats_event(statistics::Event::DeletedTorrent).await;
        }

        let response = self.build_announce_response(ann, &announcer, &torrent);

        writer.write_announce(&response).map_err(|err| Error::ResponseWrite {
            message: err.to_string(),
            location: Location::caller(),
        })
    }

    /// Handles the changes to a torrent's swarm given an announce.
    ///
    /// Returns whether the peer record was added to the swarm.
    async fn update_swarm(&self, conn: &dyn Connection, ann: &Announce, peer: &Peer, torrent: &mut Torrent) -> Result<bool, Error> {
        drop(conn.touch_torrent(&torrent.info_hash));

        if torrent.in_seeder_pool(peer) {
            conn.put_seeder(&torrent.info_hash, peer)?;
            torrent.seeders.insert(peer.key(), *peer);
            return Ok(false);
        }

        if torrent.in_leecher_pool(peer) {
            conn.put_leecher(&torrent.info_hash, peer)?;
            torrent.leechers.insert(peer.key(), *peer);
            return Ok(false);
        }

        // A peer cannot stop or complete a download on a swarm it never
        // joined.
        if !matches!(ann.event, AnnounceEvent::None | AnnounceEvent::Started) {
            return Err(Error::BadRequest {
                location: Location::caller(),
            });
        }

        if ann.left.0.get() == 0 {
            conn.put_seeder(&torrent.info_hash, peer)?;
            torrent.seeders.insert(peer.key(), *peer);
            self.send_stats_event(statistics::Event::NewSeed {
                ip_version: peer.ip_version(),
            })
            .await;
        } else {
            conn.put_leecher(&torrent.info_hash, peer)?;
            torrent.leechers.insert(peer.key(), *peer);
            self.send_stats_event(statistics::Event::NewLeech {
                ip_version: peer.ip_version(),
            })
            .await;
        }

        Ok(true)
    }

    /// Checks whether the announce has an event and, if it does, properly
    /// handles that event.
    ///
    /// Returns whether the event completed a download that had not been
    /// counted yet.
    async fn handle_event(
        &self,
        conn: &dyn Connection,
        ann: &Announce,
        peer: &Peer,
        user: Option<&mut User>,
        torrent: &mut Torrent,
    ) -> Result<bool, Error> {
        match ann.event {
            AnnounceEvent::Stopped | AnnounceEvent::Paused => {
                // update_swarm refreshed the peer, so any peer that was in
                // the swarm is found in one of these pools.
                if torrent.in_seeder_pool(peer) {
                    conn.delete_seeder(&torrent.info_hash, peer)?;
                    torrent.seeders.remove(&peer.key());
                    self.send_stats_event(statistics::Event::DeletedSeed {
                        ip_version: peer.ip_version(),
                    })
                    .await;
                } else if torrent.in_leecher_pool(peer) {
                    conn.delete_leecher(&torrent.info_hash, peer)?;
                    torrent.leechers.remove(&peer.key());
                    self.send_stats_event(statistics::Event::DeletedLeech {
                        ip_version: peer.ip_version(),
                    })
                    .await;
                }

                Ok(false)
            }

            AnnounceEvent::Completed => {
                // If one of the dual-stacked records is already a seeder, the
                // download has already been counted.
                let v4_seeding = torrent.seeders.contains_key(&PeerKey::new(peer.id, IPVersion::IPv4));
                let v6_seeding = torrent.seeders.contains_key(&PeerKey::new(peer.id, IPVersion::IPv6));
                let snatched = !(v4_seeding || v6_seeding);

                let in_leecher_pool = torrent.in_leecher_pool(peer);

                // A "completed" from outside the leecher pool still moves the
                // counters, even though the announce is rejected below.
                if snatched || !in_leecher_pool {
                    conn.increment_torrent_snatches(&torrent.info_hash)?;
                    torrent.snatches += 1;

                    if ann.config.private {
                        if let Some(passkey) = &ann.passkey {
                            conn.increment_user_snatches(passkey)?;
                        }
                        if let Some(user) = user {
                            user.snatches += 1;
                        }
                    }
                }

                if in_leecher_pool {
                    self.leecher_finished(conn, torrent, peer).await?;
                } else {
                    return Err(Error::BadRequest {
                        location: Location::caller(),
                    });
                }

                Ok(snatched)
            }

            _ if torrent.in_leecher_pool(peer) && ann.left.0.get() == 0 => {
                // A leecher completed but the event was never received.
                self.leecher_finished(conn, torrent, peer).await?;
                Ok(false)
            }

            _ => Ok(false),
        }
    }

    /// Moves a peer record from the leecher pool to the seeder pool.
    ///
    /// The record is deleted first and inserted afterwards, so it is never in
    /// both pools at the storage layer. If the delete fails, no insertion is
    /// attempted.
    async fn leecher_finished(&self, conn: &dyn Connection, torrent: &mut Torrent, peer: &Peer) -> Result<(), Error> {
        conn.delete_leecher(&torrent.info_hash, peer)?;
        torrent.leechers.remove(&peer.key());

        conn.put_seeder(&torrent.info_hash, peer)?;
        torrent.seeders.insert(peer.key(), *peer);

        self.send_stats_event(statistics::Event::Completed {
            ip_version: peer.ip_version(),
        })
        .await;

        Ok(())
    }

    /// Assembles the response for a handled announce.
    fn build_announce_response(&self, ann: &Announce, announcer: &Peer, torrent: &Torrent) -> AnnounceResponse {
        let mut response = AnnounceResponse {
            complete: u32::try_from(torrent.seeders.len()).unwrap_or(u32::MAX),
            incomplete: u32::try_from(torrent.leechers.len()).unwrap_or(u32::MAX),
            interval: ann.config.announce_policy.interval,
            min_interval: ann.config.announce_policy.interval_min,
            compact: ann.compact,
            ipv4_peers: Vec::new(),
            ipv6_peers: Vec::new(),
        };

        if ann.num_want > 0 && !ann.event.removes_peer() {
            let wanted = min(ann.num_want as usize, TORRENT_PEERS_LIMIT);
            let (ipv4_peers, ipv6_peers) = peer_selection::get_peers(ann, announcer, torrent, wanted);
            response.ipv4_peers = ipv4_peers;
            response.ipv6_peers = ipv6_peers;
        }

        response
    }

    /// Fire-and-forget statistics emission. Never blocks nor fails the
    /// announce.
    async fn send_stats_event(&self, event: statistics::Event) {
        if let Some(event_sender) = self.stats_event_sender.as_deref() {
            drop(event_sender.send_event(event).await);
        }
    }
}
