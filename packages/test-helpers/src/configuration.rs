//! Ephemeral tracker configurations for tests.
use std::path::PathBuf;

use peertrack_configuration::{Core, PreferredSubnets};
use rand::distr::Alphanumeric;
use rand::Rng;

/// Returns the path of a temporary sqlite database file with a random name.
///
/// The file itself is created lazily by the sqlite driver.
#[must_use]
pub fn ephemeral_sqlite_database() -> PathBuf {
    let random_name: String = rand::rng().sample_iter(&Alphanumeric).take(16).map(char::from).collect();

    std::env::temp_dir().join(format!("peertrack_{random_name}.db"))
}

/// An ephemeral configuration for a public (open) tracker.
///
/// # Panics
///
/// Will panic if the temporary database file path is not a valid UTF-8 string.
#[must_use]
pub fn ephemeral() -> Core {
    let mut core = Core::default();

    let temp_file = ephemeral_sqlite_database();
    temp_file.to_str().unwrap().clone_into(&mut core.database.path);

    core
}

/// An ephemeral configuration for a private tracker.
#[must_use]
pub fn ephemeral_private() -> Core {
    let mut core = ephemeral();
    core.private = true;
    core
}

/// An ephemeral configuration for a tracker that only accepts whitelisted
/// clients.
#[must_use]
pub fn ephemeral_with_client_whitelist() -> Core {
    let mut core = ephemeral();
    core.client_whitelist_enabled = true;
    core
}

/// An ephemeral configuration for an open tracker that purges torrents whose
/// swarm becomes empty.
#[must_use]
pub fn ephemeral_with_peerless_torrent_removal() -> Core {
    let mut core = ephemeral();
    core.tracker_policy.remove_peerless_torrents = true;
    core
}

/// An ephemeral configuration for a tracker with the subnet-preferred peer
/// selection policy enabled.
#[must_use]
pub fn ephemeral_with_preferred_subnets(ipv4_prefix: u8, ipv6_prefix: u8) -> Core {
    let mut core = ephemeral();
    core.preferred_subnets = Some(PreferredSubnets { ipv4_prefix, ipv6_prefix });
    core
}

#[cfg(test)]
mod tests {
    use super::{ephemeral, ephemeral_private, ephemeral_sqlite_database};

    #[test]
    fn it_should_use_a_different_database_file_for_each_configuration() {
        assert_ne!(ephemeral().database.path, ephemeral().database.path);
    }

    #[test]
    fn it_should_generate_random_database_paths() {
        assert_ne!(ephemeral_sqlite_database(), ephemeral_sqlite_database());
    }

    #[test]
    fn it_should_build_a_private_tracker_configuration() {
        assert!(ephemeral_private().private);
    }
}
