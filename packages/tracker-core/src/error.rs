//! Core announce errors.
//!
//! This module defines the error type returned by the announce engine.
//!
//! The variants fall into the kinds the delivery layers care about: lookup
//! failures (a required client, user or torrent was not found), bad requests
//! (the client sent an illogical announce sequence), and storage or
//! accounting failures. Each variant includes contextual information such as
//! the source code location to facilitate debugging.
use std::panic::Location;

use bittorrent_primitives::info_hash::InfoHash;

use crate::accounting;
use crate::databases;

/// The error returned when an announce cannot be handled.
///
/// The first error aborts the announce; mutations already applied are not
/// rolled back and the storage connection is still released.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// The storage pool could not provide a connection.
    #[error("could not get a connection from the storage pool, {location}")]
    ConnectionUnavailable { location: &'static Location<'static> },

    /// The announcing client is not in the client whitelist.
    ///
    /// Only returned when the tracker runs with client whitelisting enabled.
    #[error("the client {client_id} is not whitelisted, {location}")]
    ClientNotWhitelisted {
        client_id: String,
        location: &'static Location<'static>,
    },

    /// The announce did not carry a passkey while the tracker is private.
    #[error("the announce request is missing a passkey, {location}")]
    MissingPasskey { location: &'static Location<'static> },

    /// No user matches the passkey sent by the client.
    #[error("no user with passkey {passkey} was found, {location}")]
    UserNotFound {
        passkey: String,
        location: &'static Location<'static>,
    },

    /// The torrent does not exist.
    ///
    /// In open mode the announce handler converts this error into the
    /// creation of a fresh torrent; in private mode it is surfaced verbatim.
    #[error("the torrent {info_hash} does not exist, {location}")]
    TorrentNotFound {
        info_hash: InfoHash,
        location: &'static Location<'static>,
    },

    /// The client sent an illogical announce sequence, like stopping a swarm
    /// it never joined or completing a download it never started.
    #[error("the announce sequence is not valid for the peer, {location}")]
    BadRequest { location: &'static Location<'static> },

    /// A persistence operation failed.
    #[error("persistence error: {source}")]
    Database { source: databases::error::Error },

    /// The accounting backend rejected the announce delta.
    #[error("announce accounting failed: {source}")]
    Accounting { source: accounting::Error },

    /// The response writer failed. The swarm mutations and counters are
    /// already committed when this happens; there is no compensating
    /// rollback.
    #[error("failed to write the announce response: {message}, {location}")]
    ResponseWrite {
        message: String,
        location: &'static Location<'static>,
    },
}

impl From<databases::error::Error> for Error {
    fn from(source: databases::error::Error) -> Self {
        Self::Database { source }
    }
}

#[cfg(test)]
mod tests {

    mod the_core_error {
        use std::panic::Location;

        use crate::error::Error;
        use crate::test_helpers::tests::sample_info_hash;

        #[test]
        fn it_should_display_the_missing_torrent() {
            let err = Error::TorrentNotFound {
                info_hash: sample_info_hash(),
                location: Location::caller(),
            };

            let err_msg = format!("{err}");

            assert!(
                err_msg.contains(&format!("the torrent {} does not exist", sample_info_hash())),
                "Error message did not contain expected text: {err_msg}"
            );
        }

        #[test]
        fn it_should_display_the_rejected_client() {
            let err = Error::ClientNotWhitelisted {
                client_id: "qB4250".to_string(),
                location: Location::caller(),
            };

            let err_msg = format!("{err}");

            assert!(
                err_msg.contains("the client qB4250 is not whitelisted"),
                "Error message did not contain expected text: {err_msg}"
            );
        }
    }
}
