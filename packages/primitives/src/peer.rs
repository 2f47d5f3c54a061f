//! Peer structs used by the core tracker.
//!
//! A peer is one participant of a swarm, on one address family. Dual-stacked
//! clients are stored as two records sharing the same peer id, one keyed for
//! IPv4 and one for IPv6. The [`PeerKey`] is the compound key that identifies
//! a record inside a swarm pool.
//!
//! A sample peer:
//!
//! ```rust,no_run
//! use aquatic_udp_protocol::{NumberOfBytes, PeerId};
//! use peertrack_primitives::peer;
//! use peertrack_primitives::DurationSinceUnixEpoch;
//! use std::net::SocketAddr;
//! use std::net::IpAddr;
//! use std::net::Ipv4Addr;
//!
//! peer::Peer {
//!     id: PeerId(*b"-qB00000000000000000"),
//!     addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 8080),
//!     user_id: None,
//!     uploaded: NumberOfBytes::new(0),
//!     downloaded: NumberOfBytes::new(0),
//!     left: NumberOfBytes::new(0),
//!     updated: DurationSinceUnixEpoch::new(1_669_397_478_934, 0),
//! };
//! ```
use std::net::{IpAddr, SocketAddr};
use std::ops::{Deref, DerefMut};
use std::panic::Location;

use aquatic_udp_protocol::{NumberOfBytes, PeerId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zerocopy::FromBytes as _;

use crate::{DurationSinceUnixEpoch, IPVersion};

/// One peer record, bound to a single address family.
#[derive(Debug, Clone, Serialize, Copy, PartialEq, Eq, Hash)]
pub struct Peer {
    /// ID used by the downloader peer.
    #[serde(serialize_with = "ser_peer_id")]
    pub id: PeerId,
    /// The IP and port this peer is listening on.
    pub addr: SocketAddr,
    /// The user that owns this peer, when the tracker runs in private mode.
    pub user_id: Option<UserId>,
    /// The total amount of bytes uploaded by this peer so far.
    #[serde(serialize_with = "ser_number_of_bytes")]
    pub uploaded: NumberOfBytes,
    /// The total amount of bytes downloaded by this peer so far.
    #[serde(serialize_with = "ser_number_of_bytes")]
    pub downloaded: NumberOfBytes,
    /// The number of bytes this peer still has to download.
    #[serde(serialize_with = "ser_number_of_bytes")]
    pub left: NumberOfBytes,
    /// The last time the tracker received an announce request from this peer.
    #[serde(serialize_with = "ser_unix_time_value")]
    pub updated: DurationSinceUnixEpoch,
}

impl Peer {
    /// The address-family-qualified key of this record inside a swarm pool.
    #[must_use]
    pub fn key(&self) -> PeerKey {
        PeerKey::new(self.id, self.ip_version())
    }

    /// The IP version this record is bound to.
    #[must_use]
    pub fn ip_version(&self) -> IPVersion {
        if self.addr.is_ipv4() {
            return IPVersion::IPv4;
        }
        IPVersion::IPv6
    }

    #[must_use]
    pub fn has_ipv4(&self) -> bool {
        self.addr.is_ipv4()
    }

    #[must_use]
    pub fn has_ipv6(&self) -> bool {
        self.addr.is_ipv6()
    }

    /// A peer with nothing left to download is a seeder.
    #[must_use]
    pub fn is_seeder(&self) -> bool {
        self.left.0.get() <= 0
    }

    pub fn change_ip(&mut self, new_ip: &IpAddr) {
        self.addr = SocketAddr::new(*new_ip, self.addr.port());
    }
}

impl Ord for Peer {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for Peer {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Compound key identifying one peer record within a torrent: the peer id
/// plus the address family of the record.
///
/// Two records with the same peer id but different IP versions belong to the
/// same dual-stacked client and are tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerKey {
    pub id: PeerId,
    pub ip_version: IPVersion,
}

impl PeerKey {
    #[must_use]
    pub fn new(id: PeerId, ip_version: IPVersion) -> Self {
        Self { id, ip_version }
    }
}

/// Identifier of the tracker user that owns a peer (private trackers only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Serializes a `DurationSinceUnixEpoch` as a Unix timestamp in milliseconds.
///
/// # Errors
///
/// Will return `serde::Serializer::Error` if unable to serialize the `unix_time_value`.
pub fn ser_unix_time_value<S: serde::Serializer>(unix_time_value: &DurationSinceUnixEpoch, ser: S) -> Result<S::Ok, S::Error> {
    #[allow(clippy::cast_possible_truncation)]
    ser.serialize_u64(unix_time_value.as_millis() as u64)
}

/// Serializes a `NumberOfBytes` as an i64.
///
/// # Errors
///
/// It will return an error if the internal serializer was to fail.
pub fn ser_number_of_bytes<S: serde::Serializer>(number_of_bytes: &NumberOfBytes, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_i64(number_of_bytes.0.get())
}

/// Serializes a `PeerId` as a [`peer::Id`](crate::peer::Id).
///
/// # Errors
///
/// It will return an error if the internal serializer was to fail.
pub fn ser_peer_id<S: serde::Serializer>(peer_id: &PeerId, ser: S) -> Result<S::Ok, S::Error> {
    let id = Id { data: *peer_id };
    ser.serialize_some(&id)
}

pub const PEER_ID_BYTES_LEN: usize = 20;

/// Error returned when trying to convert an invalid peer id from another type.
///
/// Usually because the source format does not contain 20 bytes.
#[derive(Error, Debug)]
pub enum IdConversionError {
    #[error("not enough bytes for peer id: {message} {location}")]
    NotEnoughBytes {
        location: &'static Location<'static>,
        message: String,
    },
    #[error("too many bytes for peer id: {message} {location}")]
    TooManyBytes {
        location: &'static Location<'static>,
        message: String,
    },
}

/// A wrapper around a [`PeerId`] with conversion and rendering helpers.
pub struct Id {
    data: PeerId,
}

impl From<PeerId> for Id {
    fn from(id: PeerId) -> Self {
        Self { data: id }
    }
}

impl From<[u8; 20]> for Id {
    fn from(bytes: [u8; 20]) -> Self {
        let data = PeerId(bytes);
        Self { data }
    }
}

impl TryFrom<Vec<u8>> for Id {
    type Error = IdConversionError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        if bytes.len() < PEER_ID_BYTES_LEN {
            return Err(IdConversionError::NotEnoughBytes {
                location: Location::caller(),
                message: format! {"got {} bytes, expected {}", bytes.len(), PEER_ID_BYTES_LEN},
            });
        }
        if bytes.len() > PEER_ID_BYTES_LEN {
            return Err(IdConversionError::TooManyBytes {
                location: Location::caller(),
                message: format! {"got {} bytes, expected {}", bytes.len(), PEER_ID_BYTES_LEN},
            });
        }

        let data = PeerId::read_from(&bytes).expect("it should have the correct amount of bytes");
        Ok(Self { data })
    }
}

impl Deref for Id {
    type Target = PeerId;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl DerefMut for Id {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_hex_string() {
            Some(hex) => write!(f, "{hex}"),
            None => write!(f, ""),
        }
    }
}

impl Id {
    /// Converts to hex string.
    ///
    /// For the `PeerId` `-qB00000000000000000` it returns
    /// `0x2d71423030303030303030303030303030303030`.
    ///
    /// Returns `None` if some of the bytes are invalid UTF8 values.
    ///
    /// # Panics
    ///
    /// It will panic if `binascii::bin2hex` fails from a too-small output buffer.
    #[must_use]
    pub fn to_hex_string(&self) -> Option<String> {
        let buff_size = self.0.len() * 2;
        let mut tmp: Vec<u8> = vec![0; buff_size];

        binascii::bin2hex(&self.0, &mut tmp).unwrap();

        match std::str::from_utf8(&tmp) {
            Ok(hex) => Some(format!("0x{hex}")),
            Err(_) => None,
        }
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        #[derive(Serialize)]
        struct PeerIdInfo {
            id: Option<String>,
        }

        let obj = PeerIdInfo { id: self.to_hex_string() };
        obj.serialize(serializer)
    }
}

pub mod fixture {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

    use aquatic_udp_protocol::NumberOfBytes;

    use super::{Peer, PeerId, UserId};
    use crate::DurationSinceUnixEpoch;

    /// Builder of sample peers for tests.
    #[derive(PartialEq, Debug)]
    pub struct PeerBuilder {
        peer: Peer,
    }

    #[allow(clippy::derivable_impls)]
    impl Default for PeerBuilder {
        fn default() -> Self {
            Self { peer: Peer::default() }
        }
    }

    impl PeerBuilder {
        /// A peer that already has the whole torrent.
        #[must_use]
        pub fn seeder() -> Self {
            Self::default()
                .with_id(&PeerId(*b"-qB00000000000000001"))
                .with_no_bytes_pending_to_download()
        }

        /// A peer that still has bytes pending to download.
        #[must_use]
        pub fn leecher() -> Self {
            Self::default()
                .with_id(&PeerId(*b"-qB00000000000000002"))
                .with_bytes_pending_to_download(10)
        }

        #[must_use]
        pub fn with_id(mut self, id: &PeerId) -> Self {
            self.peer.id = *id;
            self
        }

        #[must_use]
        pub fn with_addr(mut self, addr: &SocketAddr) -> Self {
            self.peer.addr = *addr;
            self
        }

        #[must_use]
        pub fn with_ipv4(self, ip: &Ipv4Addr, port: u16) -> Self {
            let addr = SocketAddr::new(IpAddr::V4(*ip), port);
            self.with_addr(&addr)
        }

        #[must_use]
        pub fn with_ipv6(self, ip: &Ipv6Addr, port: u16) -> Self {
            let addr = SocketAddr::new(IpAddr::V6(*ip), port);
            self.with_addr(&addr)
        }

        #[must_use]
        pub fn with_user_id(mut self, user_id: UserId) -> Self {
            self.peer.user_id = Some(user_id);
            self
        }

        #[must_use]
        pub fn with_bytes_pending_to_download(mut self, left: i64) -> Self {
            self.peer.left = NumberOfBytes::new(left);
            self
        }

        #[must_use]
        pub fn with_no_bytes_pending_to_download(mut self) -> Self {
            self.peer.left = NumberOfBytes::new(0);
            self
        }

        #[must_use]
        pub fn build(self) -> Peer {
            self.peer
        }
    }

    impl Default for Peer {
        fn default() -> Self {
            Self {
                id: PeerId(*b"-qB00000000000000000"),
                addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080),
                user_id: None,
                uploaded: NumberOfBytes::new(0),
                downloaded: NumberOfBytes::new(0),
                left: NumberOfBytes::new(0),
                updated: DurationSinceUnixEpoch::new(1_669_397_478_934, 0),
            }
        }
    }
}

#[cfg(test)]
mod tests {

    mod torrent_peer {
        use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

        use crate::peer::fixture::PeerBuilder;
        use crate::peer::PeerKey;
        use crate::IPVersion;

        #[test]
        fn it_should_be_keyed_by_peer_id_and_ip_version() {
            let peer = PeerBuilder::seeder()
                .with_ipv4(&Ipv4Addr::new(126, 0, 0, 1), 8080)
                .build();

            assert_eq!(peer.key(), PeerKey::new(peer.id, IPVersion::IPv4));
        }

        #[test]
        fn dual_stacked_records_should_have_distinct_keys() {
            let peer_v4 = PeerBuilder::seeder()
                .with_ipv4(&Ipv4Addr::new(126, 0, 0, 1), 8080)
                .build();
            let peer_v6 = PeerBuilder::seeder()
                .with_ipv6(&Ipv6Addr::LOCALHOST, 8080)
                .build();

            assert_eq!(peer_v4.id, peer_v6.id);
            assert_ne!(peer_v4.key(), peer_v6.key());
        }

        #[test]
        fn it_should_report_its_address_family() {
            let peer_v4 = PeerBuilder::leecher()
                .with_ipv4(&Ipv4Addr::new(126, 0, 0, 1), 8080)
                .build();

            assert!(peer_v4.has_ipv4());
            assert!(!peer_v4.has_ipv6());
            assert_eq!(peer_v4.ip_version(), IPVersion::IPv4);
        }

        #[test]
        fn it_should_be_a_seeder_when_it_has_no_bytes_left_to_download() {
            assert!(PeerBuilder::seeder().build().is_seeder());
            assert!(!PeerBuilder::leecher().build().is_seeder());
        }

        #[test]
        fn it_should_allow_changing_the_ip_keeping_the_port() {
            let mut peer = PeerBuilder::seeder()
                .with_ipv4(&Ipv4Addr::new(126, 0, 0, 1), 8080)
                .build();

            peer.change_ip(&IpAddr::V4(Ipv4Addr::new(126, 0, 0, 2)));

            assert_eq!(peer.addr, SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 2)), 8080));
        }
    }

    mod torrent_peer_id {
        use aquatic_udp_protocol::PeerId;

        use crate::peer;

        #[test]
        #[should_panic = "NotEnoughBytes"]
        fn should_fail_trying_to_convert_from_a_byte_vector_with_less_than_20_bytes() {
            let _ = peer::Id::try_from([0; 19].to_vec()).unwrap();
        }

        #[test]
        #[should_panic = "TooManyBytes"]
        fn should_fail_trying_to_convert_from_a_byte_vector_with_more_than_20_bytes() {
            let _ = peer::Id::try_from([0; 21].to_vec()).unwrap();
        }

        #[test]
        fn should_be_converted_to_hex_string() {
            let id = peer::Id::from(PeerId(*b"-qB00000000000000000"));
            assert_eq!(id.to_hex_string().unwrap(), "0x2d71423030303030303030303030303030303030");
        }

        #[test]
        fn should_be_converted_into_string_type_using_the_hex_string_format() {
            let id = peer::Id::from(PeerId(*b"-qB00000000000000000"));
            assert_eq!(id.to_string(), "0x2d71423030303030303030303030303030303030");
        }
    }
}
