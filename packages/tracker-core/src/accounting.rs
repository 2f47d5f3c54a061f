//! The accounting sink for private trackers.
//!
//! When the tracker runs in private mode, every successful announce produces
//! an [`AnnounceDelta`](crate::announce::AnnounceDelta) that must be recorded
//! so the tracker owner can account upload, download and snatches per user.
//! The [`Backend`] trait is the seam where that accounting system plugs in;
//! the announce engine only submits deltas and propagates failures.
use std::panic::Location;

use mockall::automock;

use crate::announce::AnnounceDelta;

/// An error reported by an accounting backend.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// The backend could not record the announce delta.
    #[error("failed to record the announce delta, {location}")]
    RecordFailed { location: &'static Location<'static> },
}

/// A sink that records announce deltas.
///
/// Implementations usually persist the deltas into the database of the
/// private tracker's website.
#[automock]
pub trait Backend: Sync + Send {
    /// Records the delta produced by one announce.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the delta cannot be recorded. The announce
    /// engine aborts the announce when this happens, but the swarm mutations
    /// are already committed.
    fn record_announce(&self, delta: &AnnounceDelta) -> Result<(), Error>;
}

/// A backend that discards every delta.
///
/// Useful for open trackers and for tests that do not care about accounting.
pub struct NoopBackend;

impl Backend for NoopBackend {
    fn record_announce(&self, _delta: &AnnounceDelta) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {

    mod the_noop_backend {
        use crate::accounting::{Backend, NoopBackend};
        use crate::test_helpers::tests::sample_announce_delta;

        #[test]
        fn it_should_accept_any_delta() {
            let backend = NoopBackend;

            assert!(backend.record_announce(&sample_announce_delta()).is_ok());
        }
    }
}
