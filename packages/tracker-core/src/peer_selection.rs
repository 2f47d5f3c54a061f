//! Peer selection.
//!
//! Builds the IPv4 and IPv6 peer lists returned to an announcing client:
//!
//! - The announcer itself (and, on private trackers, any other peer of the
//!   same user) is never returned.
//! - Seeding announcers only get leechers; leeching announcers get seeders
//!   first and leechers with whatever budget remains.
//! - A candidate goes into the IPv6 list only when both the announcer and the
//!   candidate have an IPv6 address; otherwise its IPv4 address is used, if
//!   it has one.
//! - With the preferred-subnet policy enabled, the pools are walked twice:
//!   first taking only peers inside the announcer's preferred subnets, then
//!   the complement, sharing one budget.
//!
//! The iteration order of the pools is not specified, so two equally
//! preferred candidates may be returned in any order.
use std::net::IpAddr;

use peertrack_configuration::PreferredSubnets;
use peertrack_primitives::peer::Peer;

use crate::announce::Announce;
use crate::torrent::{PeerMap, Torrent};

/// Returns the IPv4 and IPv6 peer lists for the announcer, sized according to
/// the `wanted` budget.
#[must_use]
pub fn get_peers(ann: &Announce, announcer: &Peer, torrent: &Torrent, wanted: usize) -> (Vec<Peer>, Vec<Peer>) {
    let (ipv4s, ipv6s) = (Vec::new(), Vec::new());

    if ann.left.0.get() == 0 {
        // If they're seeding, give them only leechers.
        return append_peers(ipv4s, ipv6s, ann, announcer, &torrent.leechers, wanted);
    }

    // If they're leeching, prioritize giving them seeders.
    let (ipv4s, ipv6s) = append_peers(ipv4s, ipv6s, ann, announcer, &torrent.seeders, wanted);
    let remaining = wanted.saturating_sub(ipv4s.len() + ipv6s.len());
    append_peers(ipv4s, ipv6s, ann, announcer, &torrent.leechers, remaining)
}

/// Implements the logic of adding peers to the IPv4 or IPv6 lists.
fn append_peers(
    mut ipv4s: Vec<Peer>,
    mut ipv6s: Vec<Peer>,
    ann: &Announce,
    announcer: &Peer,
    peers: &PeerMap,
    wanted: usize,
) -> (Vec<Peer>, Vec<Peer>) {
    if let Some(preferred_subnets) = &ann.config.preferred_subnets {
        return append_subnet_peers(ipv4s, ipv6s, ann, announcer, peers, wanted, preferred_subnets);
    }

    let mut count = 0;

    for peer in peers.values() {
        if count >= wanted {
            break;
        } else if peers_equivalent(peer, announcer) {
            continue;
        }

        if ann.has_ipv6() && peer.has_ipv6() {
            ipv6s.push(*peer);
            count += 1;
        } else if peer.has_ipv4() {
            ipv4s.push(*peer);
            count += 1;
        }
    }

    (ipv4s, ipv6s)
}

/// An alternative version of [`append_peers`] used when the preferred-subnet
/// policy is enabled.
#[allow(clippy::too_many_arguments)]
fn append_subnet_peers(
    mut ipv4s: Vec<Peer>,
    mut ipv6s: Vec<Peer>,
    ann: &Announce,
    announcer: &Peer,
    peers: &PeerMap,
    wanted: usize,
    preferred_subnets: &PreferredSubnets,
) -> (Vec<Peer>, Vec<Peer>) {
    // Iterate over the peers twice: first add only peers in the same subnet
    // and if we still need more peers grab ones that haven't already been
    // added.
    let mut count = 0;

    for check_in_subnet in [true, false] {
        for peer in peers.values() {
            if count >= wanted {
                break;
            }

            let in_subnet_v4 = match (ann.ipv4, peer_ipv4(peer)) {
                (Some(subnet_ip), Some(peer_ip)) => ipv4_prefix_matches(subnet_ip, peer_ip, preferred_subnets.ipv4_prefix),
                _ => false,
            };
            let in_subnet_v6 = match (ann.ipv6, peer_ipv6(peer)) {
                (Some(subnet_ip), Some(peer_ip)) => ipv6_prefix_matches(subnet_ip, peer_ip, preferred_subnets.ipv6_prefix),
                _ => false,
            };

            if peers_equivalent(peer, announcer) || check_in_subnet != (in_subnet_v4 || in_subnet_v6) {
                continue;
            }

            if ann.has_ipv6() && peer.has_ipv6() {
                ipv6s.push(*peer);
                count += 1;
            } else if peer.has_ipv4() {
                ipv4s.push(*peer);
                count += 1;
            }
        }
    }

    (ipv4s, ipv6s)
}

/// Checks if two peers represent the same entity.
///
/// They do when they share the peer id or, on private trackers, when both
/// belong to the same user.
#[must_use]
pub fn peers_equivalent(a: &Peer, b: &Peer) -> bool {
    a.id == b.id || (a.user_id.is_some() && a.user_id == b.user_id)
}

fn peer_ipv4(peer: &Peer) -> Option<std::net::Ipv4Addr> {
    match peer.addr.ip() {
        IpAddr::V4(ip) => Some(ip),
        IpAddr::V6(_) => None,
    }
}

fn peer_ipv6(peer: &Peer) -> Option<std::net::Ipv6Addr> {
    match peer.addr.ip() {
        IpAddr::V4(_) => None,
        IpAddr::V6(ip) => Some(ip),
    }
}

fn ipv4_prefix_matches(a: std::net::Ipv4Addr, b: std::net::Ipv4Addr, prefix: u8) -> bool {
    if prefix == 0 {
        return true;
    }

    let shift = 32 - u32::from(prefix.min(32));
    (u32::from(a) ^ u32::from(b)) >> shift == 0
}

fn ipv6_prefix_matches(a: std::net::Ipv6Addr, b: std::net::Ipv6Addr, prefix: u8) -> bool {
    if prefix == 0 {
        return true;
    }

    let shift = 128 - u32::from(prefix.min(128));
    (u128::from(a) ^ u128::from(b)) >> shift == 0
}
