//! Configuration data structures for the tracker.
//!
//! The tracker behavior is controlled by the [`Core`] settings. A sample
//! configuration in TOML:
//!
//! ```toml
//! [core]
//! client_whitelist_enabled = false
//! private = false
//! tracker_usage_statistics = true
//!
//! [core.announce_policy]
//! interval = 1800
//! interval_min = 900
//!
//! [core.database]
//! driver = "Sqlite3"
//! path = "./storage/tracker/database/sqlite3.db"
//!
//! [core.tracker_policy]
//! max_peer_timeout = 900
//! persistent_snatch_stats = false
//! remove_peerless_torrents = true
//! ```
use serde::{Deserialize, Serialize};

/// The maximum number of returned peers for a torrent, regardless of how many
/// the client asked for.
///
/// Guard against buffer overflows and very slow lookups.
pub const TORRENT_PEERS_LIMIT: usize = 74;

/// Core tracker configuration.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Core {
    /// Announce policy configuration.
    #[serde(default = "Core::default_announce_policy")]
    pub announce_policy: AnnouncePolicy,

    /// When `true` the client id embedded in the announcing peer id must be
    /// whitelisted for the announce to be accepted.
    #[serde(default = "Core::default_client_whitelist_enabled")]
    pub client_whitelist_enabled: bool,

    /// Database configuration.
    #[serde(default = "Core::default_database")]
    pub database: Database,

    /// When `true` clients require a passkey to use the tracker and announce
    /// deltas are recorded for accounting.
    #[serde(default = "Core::default_private")]
    pub private: bool,

    /// When set, peers sharing the announcer's subnet prefix are preferred
    /// when building the returned peer lists.
    #[serde(default = "Core::default_preferred_subnets")]
    pub preferred_subnets: Option<PreferredSubnets>,

    /// Tracker policy configuration.
    #[serde(default = "Core::default_tracker_policy")]
    pub tracker_policy: TrackerPolicy,

    /// Whether the tracker should collect statistics about tracker usage.
    #[serde(default = "Core::default_tracker_usage_statistics")]
    pub tracker_usage_statistics: bool,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            announce_policy: Self::default_announce_policy(),
            client_whitelist_enabled: Self::default_client_whitelist_enabled(),
            database: Self::default_database(),
            private: Self::default_private(),
            preferred_subnets: Self::default_preferred_subnets(),
            tracker_policy: Self::default_tracker_policy(),
            tracker_usage_statistics: Self::default_tracker_usage_statistics(),
        }
    }
}

impl Core {
    fn default_announce_policy() -> AnnouncePolicy {
        AnnouncePolicy::default()
    }

    fn default_client_whitelist_enabled() -> bool {
        false
    }

    fn default_database() -> Database {
        Database::default()
    }

    fn default_private() -> bool {
        false
    }

    fn default_preferred_subnets() -> Option<PreferredSubnets> {
        None
    }

    fn default_tracker_policy() -> TrackerPolicy {
        TrackerPolicy::default()
    }

    fn default_tracker_usage_statistics() -> bool {
        true
    }
}

/// The announce intervals returned to clients.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub struct AnnouncePolicy {
    /// Interval in seconds that the client should wait between sending
    /// regular announce requests to the tracker.
    ///
    /// It's a **recommended** wait time between announcements.
    #[serde(default = "AnnouncePolicy::default_interval")]
    pub interval: u32,

    /// Minimum announce interval. Clients must not reannounce more frequently
    /// than this.
    #[serde(default = "AnnouncePolicy::default_interval_min")]
    pub interval_min: u32,
}

impl Default for AnnouncePolicy {
    fn default() -> Self {
        Self {
            interval: Self::default_interval(),
            interval_min: Self::default_interval_min(),
        }
    }
}

impl AnnouncePolicy {
    fn default_interval() -> u32 {
        1800
    }

    fn default_interval_min() -> u32 {
        900
    }
}

/// Swarm management policies.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub struct TrackerPolicy {
    /// Maximum time in seconds that a peer can be inactive before an external
    /// cleanup job may consider it stale.
    #[serde(default = "TrackerPolicy::default_max_peer_timeout")]
    pub max_peer_timeout: u32,

    /// If enabled the tracker will persist the number of snatches (completed
    /// downloads) for each torrent.
    #[serde(default = "TrackerPolicy::default_persistent_snatch_stats")]
    pub persistent_snatch_stats: bool,

    /// If enabled, a torrent whose swarm becomes empty after an announce is
    /// purged from the store. Only applies when the tracker is not private.
    #[serde(default = "TrackerPolicy::default_remove_peerless_torrents")]
    pub remove_peerless_torrents: bool,
}

impl Default for TrackerPolicy {
    fn default() -> Self {
        Self {
            max_peer_timeout: Self::default_max_peer_timeout(),
            persistent_snatch_stats: Self::default_persistent_snatch_stats(),
            remove_peerless_torrents: Self::default_remove_peerless_torrents(),
        }
    }
}

impl TrackerPolicy {
    fn default_max_peer_timeout() -> u32 {
        900
    }

    fn default_persistent_snatch_stats() -> bool {
        false
    }

    fn default_remove_peerless_torrents() -> bool {
        false
    }
}

/// Prefix lengths used by the subnet-preferred peer selection policy.
///
/// A prefix of `0` makes every address match, so the preference degenerates
/// into the plain selection.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub struct PreferredSubnets {
    /// Prefix bits (out of 32) shared with the announcer's IPv4 address.
    #[serde(default = "PreferredSubnets::default_ipv4_prefix")]
    pub ipv4_prefix: u8,

    /// Prefix bits (out of 128) shared with the announcer's IPv6 address.
    #[serde(default = "PreferredSubnets::default_ipv6_prefix")]
    pub ipv6_prefix: u8,
}

impl Default for PreferredSubnets {
    fn default() -> Self {
        Self {
            ipv4_prefix: Self::default_ipv4_prefix(),
            ipv6_prefix: Self::default_ipv6_prefix(),
        }
    }
}

impl PreferredSubnets {
    fn default_ipv4_prefix() -> u8 {
        24
    }

    fn default_ipv6_prefix() -> u8 {
        64
    }
}

/// Database configuration.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Database {
    /// The database management system used by the tracker.
    #[serde(default = "Database::default_driver")]
    pub driver: Driver,

    /// The path (or connection URL) of the database.
    #[serde(default = "Database::default_path")]
    pub path: String,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            driver: Self::default_driver(),
            path: Self::default_path(),
        }
    }
}

impl Database {
    fn default_driver() -> Driver {
        Driver::Sqlite3
    }

    fn default_path() -> String {
        String::from("./storage/tracker/database/sqlite3.db")
    }
}

/// The database management system used by the tracker.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy)]
pub enum Driver {
    /// The Sqlite3 database driver.
    Sqlite3,
    /// The `MySQL` database driver.
    MySQL,
}

#[cfg(test)]
mod tests {

    mod the_core_configuration {
        use crate::{Core, Driver};

        #[test]
        fn it_should_have_sensible_defaults() {
            let core = Core::default();

            assert!(!core.private);
            assert!(!core.client_whitelist_enabled);
            assert!(core.preferred_subnets.is_none());
            assert!(!core.tracker_policy.remove_peerless_torrents);
            assert_eq!(core.database.driver, Driver::Sqlite3);
        }

        #[test]
        fn it_should_be_loadable_from_an_empty_toml_table_using_the_defaults() {
            let core: Core = toml::from_str("").expect("an empty configuration should be valid");

            assert_eq!(core, Core::default());
        }

        #[test]
        fn it_should_be_loadable_from_toml() {
            let toml = r#"
                private = true
                client_whitelist_enabled = true

                [announce_policy]
                interval = 120
                interval_min = 60

                [preferred_subnets]
                ipv4_prefix = 16
                ipv6_prefix = 48
            "#;

            let core: Core = toml::from_str(toml).expect("the configuration should be valid");

            assert!(core.private);
            assert!(core.client_whitelist_enabled);
            assert_eq!(core.announce_policy.interval, 120);
            assert_eq!(core.announce_policy.interval_min, 60);
            assert_eq!(core.preferred_subnets.unwrap().ipv4_prefix, 16);
        }
    }
}
