//! The announce request, response and accounting data structures.
//!
//! An [`Announce`] is the decoded form of a client announce request, produced
//! by a transport adapter (HTTP or UDP). The announce engine consumes it and
//! hands an [`AnnounceResponse`] to the transport's [`Writer`].
//!
//! A client may be dual-stacked and provide both an IPv4 and an IPv6 address
//! in one announce. In that case the engine derives two peer records, one per
//! address family, and updates both within the same announce.
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use aquatic_udp_protocol::{NumberOfBytes, PeerId};
use bittorrent_primitives::info_hash::InfoHash;
use peertrack_clock::clock::Time;
use peertrack_configuration::Core;
use peertrack_primitives::announce_event::AnnounceEvent;
use peertrack_primitives::peer::Peer;

use crate::authentication::{Passkey, User};
use crate::CurrentClock;

/// A decoded announce request.
#[derive(Debug, Clone)]
pub struct Announce {
    /// The torrent the client is announcing on.
    pub info_hash: InfoHash,

    /// The id the client chose for itself.
    pub peer_id: PeerId,

    /// The authentication token, required when the tracker is private.
    pub passkey: Option<Passkey>,

    /// The IPv4 address the client is reachable on, if any.
    pub ipv4: Option<Ipv4Addr>,

    /// The IPv6 address the client is reachable on, if any.
    pub ipv6: Option<Ipv6Addr>,

    /// The port the client is listening on, shared by both address families.
    pub port: u16,

    /// The total amount of bytes the client uploaded so far.
    pub uploaded: NumberOfBytes,

    /// The total amount of bytes the client downloaded so far.
    pub downloaded: NumberOfBytes,

    /// The number of bytes the client still has to download. Zero means the
    /// client is seeding.
    pub left: NumberOfBytes,

    /// The announced event.
    pub event: AnnounceEvent,

    /// How many peers the client wants in the response.
    pub num_want: u32,

    /// Whether the client asked for a compact response.
    pub compact: bool,

    /// The tracker configuration snapshot taken when the request was decoded.
    pub config: Core,
}

impl Announce {
    #[must_use]
    pub fn has_ipv4(&self) -> bool {
        self.ipv4.is_some()
    }

    #[must_use]
    pub fn has_ipv6(&self) -> bool {
        self.ipv6.is_some()
    }

    /// The azureus-style client id embedded in the peer id.
    ///
    /// Azureus-style ids wrap the client code in dashes (`-qB4250-...`);
    /// Shadow-style ids start with the client code directly. Either way the
    /// code plus version is six chars.
    #[must_use]
    pub fn client_id(&self) -> String {
        let bytes = self.peer_id.0;

        if bytes[0] == b'-' {
            String::from_utf8_lossy(&bytes[1..7]).into_owned()
        } else {
            String::from_utf8_lossy(&bytes[..6]).into_owned()
        }
    }

    /// Derives the peer records of this announce.
    ///
    /// Returns the announcer peer, used only for equivalence checks when
    /// selecting the returned peers, plus one record per address family
    /// present in the request.
    #[must_use]
    pub fn derive_peers(&self, user: Option<&User>) -> (Peer, Option<Peer>, Option<Peer>) {
        let peer_v4 = self.ipv4.map(|ip| self.new_peer(user, IpAddr::V4(ip)));
        let peer_v6 = self.ipv6.map(|ip| self.new_peer(user, IpAddr::V6(ip)));

        let announcer = peer_v4
            .or(peer_v6)
            .unwrap_or_else(|| self.new_peer(user, IpAddr::V4(Ipv4Addr::UNSPECIFIED)));

        (announcer, peer_v4, peer_v6)
    }

    fn new_peer(&self, user: Option<&User>, ip: IpAddr) -> Peer {
        Peer {
            id: self.peer_id,
            addr: SocketAddr::new(ip, self.port),
            user_id: user.map(|user| user.id),
            uploaded: self.uploaded,
            downloaded: self.downloaded,
            left: self.left,
            updated: CurrentClock::now(),
        }
    }
}

/// The response to an announce request, ready to be encoded by a transport.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnounceResponse {
    /// The number of seeders in the swarm.
    pub complete: u32,

    /// The number of leechers in the swarm.
    pub incomplete: u32,

    /// Seconds the client should wait between regular announces.
    pub interval: u32,

    /// Minimum announce interval in seconds.
    pub min_interval: u32,

    /// Whether the client asked for a compact response.
    pub compact: bool,

    /// The IPv4 peers selected for the client.
    pub ipv4_peers: Vec<Peer>,

    /// The IPv6 peers selected for the client.
    pub ipv6_peers: Vec<Peer>,
}

/// A sink for announce responses.
///
/// Transport adapters implement it to encode the response over HTTP or UDP.
pub trait Writer {
    /// Writes the response of a successfully handled announce.
    ///
    /// # Errors
    ///
    /// Returns an `std::io::Error` if the response cannot be written.
    fn write_announce(&mut self, response: &AnnounceResponse) -> std::io::Result<()>;
}

/// The accounting record derived from one announce (private trackers only).
#[derive(Debug, Clone)]
pub struct AnnounceDelta {
    /// The announcer peer.
    pub peer: Peer,

    /// The torrent the announce was for.
    pub info_hash: InfoHash,

    /// The user that announced.
    pub user: User,

    /// Whether this announce added the peer to the swarm.
    pub created: bool,

    /// Whether this announce completed a download.
    pub snatched: bool,

    /// The total amount of bytes the client reported as uploaded.
    pub uploaded: NumberOfBytes,

    /// The total amount of bytes the client reported as downloaded.
    pub downloaded: NumberOfBytes,
}

impl AnnounceDelta {
    #[must_use]
    pub fn new(ann: &Announce, peer: &Peer, user: &User, created: bool, snatched: bool) -> Self {
        Self {
            peer: *peer,
            info_hash: ann.info_hash,
            user: user.clone(),
            created,
            snatched,
            uploaded: ann.uploaded,
            downloaded: ann.downloaded,
        }
    }
}
