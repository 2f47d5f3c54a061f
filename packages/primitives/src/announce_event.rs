//! Announce events. Described on the
//! [BEP 3. The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html)
use serde::{Deserialize, Serialize};

/// The event announced by a peer.
///
/// `Paused` is not a standard `BitTorrent` event but some clients send it; the
/// tracker treats it as a synonym of `Stopped` at the swarm level.
#[derive(Hash, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnnounceEvent {
    /// One of the announcements done at regular intervals.
    None,
    /// The peer has started downloading the torrent.
    Started,
    /// The peer has ceased downloading the torrent.
    Stopped,
    /// The peer has paused downloading the torrent.
    Paused,
    /// The peer has completed downloading the torrent.
    Completed,
}

impl AnnounceEvent {
    /// Parses the `event` query parameter of an announce request.
    ///
    /// The empty string and any unrecognized value map to [`AnnounceEvent::None`].
    #[inline]
    #[must_use]
    pub fn from_query_value(raw: &str) -> Self {
        match raw {
            "started" => Self::Started,
            "stopped" => Self::Stopped,
            "paused" => Self::Paused,
            "completed" => Self::Completed,
            _ => Self::None,
        }
    }

    /// Whether this event removes the announcing peer from the swarm.
    #[inline]
    #[must_use]
    pub fn removes_peer(&self) -> bool {
        matches!(self, Self::Stopped | Self::Paused)
    }
}

#[cfg(test)]
mod tests {
    use super::AnnounceEvent;

    #[test]
    fn it_should_be_parsed_from_the_announce_query_values() {
        assert_eq!(AnnounceEvent::from_query_value("started"), AnnounceEvent::Started);
        assert_eq!(AnnounceEvent::from_query_value("stopped"), AnnounceEvent::Stopped);
        assert_eq!(AnnounceEvent::from_query_value("paused"), AnnounceEvent::Paused);
        assert_eq!(AnnounceEvent::from_query_value("completed"), AnnounceEvent::Completed);
    }

    #[test]
    fn it_should_map_the_empty_string_to_the_none_event() {
        assert_eq!(AnnounceEvent::from_query_value(""), AnnounceEvent::None);
    }

    #[test]
    fn it_should_map_unknown_values_to_the_none_event() {
        assert_eq!(AnnounceEvent::from_query_value("snatched"), AnnounceEvent::None);
        assert_eq!(AnnounceEvent::from_query_value("STARTED"), AnnounceEvent::None);
    }

    #[test]
    fn it_should_know_which_events_remove_the_peer_from_the_swarm() {
        assert!(AnnounceEvent::Stopped.removes_peer());
        assert!(AnnounceEvent::Paused.removes_peer());

        assert!(!AnnounceEvent::None.removes_peer());
        assert!(!AnnounceEvent::Started.removes_peer());
        assert!(!AnnounceEvent::Completed.removes_peer());
    }
}
