//! Some generic test helpers functions.

#[cfg(test)]
pub(crate) mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};
    use std::sync::{Arc, Mutex};

    use aquatic_udp_protocol::{NumberOfBytes, PeerId};
    use bittorrent_primitives::info_hash::InfoHash;
    use peertrack_configuration::{Core, PreferredSubnets};
    use peertrack_primitives::announce_event::AnnounceEvent;
    use peertrack_primitives::peer::UserId;
    use peertrack_test_helpers::configuration;

    use crate::accounting::{self, Backend};
    use crate::announce::{Announce, AnnounceDelta, AnnounceResponse, Writer};
    use crate::announce_handler::AnnounceHandler;
    use crate::authentication::repository::in_memory::InMemoryUserRepository;
    use crate::authentication::{Passkey, User};
    use crate::databases::setup::initialize_database;
    use crate::statistics;
    use crate::storage::memory::MemoryPool;
    use crate::storage::Pool;
    use crate::torrent::repository::in_memory::InMemoryTorrentRepository;
    use crate::torrent::repository::persisted::DatabasePersistentTorrentRepository;
    use crate::torrent::Torrent;
    use crate::whitelist::repository::in_memory::InMemoryClientWhitelist;

    /// # Panics
    ///
    /// Will panic if the string representation of the info hash is not a valid info hash.
    #[must_use]
    pub fn sample_info_hash() -> InfoHash {
        "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0"
            .parse::<InfoHash>()
            .expect("String should be a valid info hash")
    }

    /// # Panics
    ///
    /// Will panic if the string representation of the info hash is not a valid info hash.
    #[must_use]
    pub fn sample_info_hash_two() -> InfoHash {
        "99c82bb73505a3c0b453f9fa0e881d6e5a32a0c1"
            .parse::<InfoHash>()
            .expect("String should be a valid info hash")
    }

    /// A sample user of a private tracker.
    #[must_use]
    pub fn sample_user() -> User {
        User {
            id: UserId(1),
            passkey: "YZSl4lMZupRuOpSRC3krIKR5BPB14nrJ".parse::<Passkey>().unwrap(),
            snatches: 0,
        }
    }

    /// A sample announce whose values are not relevant for the test.
    #[must_use]
    pub fn sample_announce() -> Announce {
        AnnounceBuilder::default().build()
    }

    /// A sample accounting record whose values are not relevant for the test.
    #[must_use]
    pub fn sample_announce_delta() -> AnnounceDelta {
        let announce = sample_announce();
        let user = sample_user();
        let (announcer, _peer_v4, _peer_v6) = announce.derive_peers(Some(&user));

        AnnounceDelta::new(&announce, &announcer, &user, true, false)
    }

    #[must_use]
    pub fn ephemeral_configuration() -> Core {
        configuration::ephemeral()
    }

    #[must_use]
    pub fn initialize_in_memory_repositories() -> (
        Arc<InMemoryTorrentRepository>,
        Arc<InMemoryUserRepository>,
        Arc<InMemoryClientWhitelist>,
    ) {
        (
            Arc::new(InMemoryTorrentRepository::default()),
            Arc::new(InMemoryUserRepository::default()),
            Arc::new(InMemoryClientWhitelist::default()),
        )
    }

    /// Builder of announce requests for tests.
    pub struct AnnounceBuilder {
        announce: Announce,
    }

    impl Default for AnnounceBuilder {
        fn default() -> Self {
            Self {
                announce: Announce {
                    info_hash: sample_info_hash(),
                    peer_id: PeerId(*b"-qB00000000000000000"),
                    passkey: None,
                    ipv4: Some(Ipv4Addr::new(126, 0, 0, 1)),
                    ipv6: None,
                    port: 8080,
                    uploaded: NumberOfBytes::new(0),
                    downloaded: NumberOfBytes::new(0),
                    left: NumberOfBytes::new(0),
                    event: AnnounceEvent::None,
                    num_want: 50,
                    compact: false,
                    config: Core::default(),
                },
            }
        }
    }

    impl AnnounceBuilder {
        /// An announce carrying the given configuration snapshot.
        #[must_use]
        pub fn for_config(config: &Core) -> Self {
            let mut builder = Self::default();
            builder.announce.config = config.clone();
            builder
        }

        #[must_use]
        pub fn with_peer_id(mut self, peer_id: &PeerId) -> Self {
            self.announce.peer_id = *peer_id;
            self
        }

        #[must_use]
        pub fn with_passkey(mut self, passkey: &Passkey) -> Self {
            self.announce.passkey = Some(passkey.clone());
            self
        }

        #[must_use]
        pub fn with_ipv4(mut self, ipv4: &Ipv4Addr) -> Self {
            self.announce.ipv4 = Some(*ipv4);
            self
        }

        #[must_use]
        pub fn with_ipv6(mut self, ipv6: &Ipv6Addr) -> Self {
            self.announce.ipv6 = Some(*ipv6);
            self
        }

        #[must_use]
        pub fn without_addresses(mut self) -> Self {
            self.announce.ipv4 = None;
            self.announce.ipv6 = None;
            self
        }

        #[must_use]
        pub fn with_left(mut self, left: i64) -> Self {
            self.announce.left = NumberOfBytes::new(left);
            self
        }

        #[must_use]
        pub fn seeding(self) -> Self {
            self.with_left(0)
        }

        #[must_use]
        pub fn leeching(self) -> Self {
            self.with_left(500)
        }

        #[must_use]
        pub fn with_event(mut self, event: AnnounceEvent) -> Self {
            self.announce.event = event;
            self
        }

        #[must_use]
        pub fn with_num_want(mut self, num_want: u32) -> Self {
            self.announce.num_want = num_want;
            self
        }

        #[must_use]
        pub fn with_preferred_subnets(mut self, ipv4_prefix: u8, ipv6_prefix: u8) -> Self {
            self.announce.config.preferred_subnets = Some(PreferredSubnets { ipv4_prefix, ipv6_prefix });
            self
        }

        #[must_use]
        pub fn build(self) -> Announce {
            self.announce
        }
    }

    /// A writer that keeps the responses handed to it.
    #[derive(Default)]
    pub struct CapturingWriter {
        pub responses: Vec<AnnounceResponse>,
    }

    impl CapturingWriter {
        /// # Panics
        ///
        /// Will panic if no response has been written yet.
        #[must_use]
        pub fn last_response(&self) -> AnnounceResponse {
            self.responses.last().expect("a response should have been written").clone()
        }
    }

    impl Writer for CapturingWriter {
        fn write_announce(&mut self, response: &AnnounceResponse) -> std::io::Result<()> {
            self.responses.push(response.clone());
            Ok(())
        }
    }

    /// An accounting backend that keeps the deltas submitted to it.
    #[derive(Default)]
    pub struct CapturingBackend {
        deltas: Mutex<Vec<AnnounceDelta>>,
    }

    impl CapturingBackend {
        /// # Panics
        ///
        /// Will panic if the deltas lock is poisoned.
        #[must_use]
        pub fn recorded_deltas(&self) -> Vec<AnnounceDelta> {
            self.deltas.lock().expect("the deltas lock should not be poisoned").clone()
        }
    }

    impl Backend for CapturingBackend {
        fn record_announce(&self, delta: &AnnounceDelta) -> Result<(), accounting::Error> {
            self.deltas
                .lock()
                .expect("the deltas lock should not be poisoned")
                .push(delta.clone());
            Ok(())
        }
    }

    /// All the services an announce handler test needs, wired together over
    /// the in-memory storage driver and an ephemeral database.
    pub struct Container {
        pub config: Core,
        pub announce_handler: Arc<AnnounceHandler>,
        pub torrents: Arc<InMemoryTorrentRepository>,
        pub users: Arc<InMemoryUserRepository>,
        pub client_whitelist: Arc<InMemoryClientWhitelist>,
        pub backend: Arc<CapturingBackend>,
    }

    impl Container {
        #[must_use]
        pub fn initialize(config: &Core) -> Self {
            Self::initialize_with_stats_sender(config, Arc::new(None))
        }

        #[must_use]
        pub fn initialize_with_stats_sender(
            config: &Core,
            stats_event_sender: Arc<Option<Box<dyn statistics::EventSender>>>,
        ) -> Self {
            let (torrents, users, client_whitelist) = initialize_in_memory_repositories();

            let pool: Arc<dyn Pool> = Arc::new(MemoryPool::new(&torrents, &users, &client_whitelist));

            let database = initialize_database(config);
            let db_torrent_repository = Arc::new(DatabasePersistentTorrentRepository::new(&database));

            let backend = Arc::new(CapturingBackend::default());
            let backend_sink: Arc<dyn Backend> = backend.clone();

            let announce_handler = Arc::new(AnnounceHandler::new(
                config,
                &pool,
                &db_torrent_repository,
                &backend_sink,
                &stats_event_sender,
            ));

            Self {
                config: config.clone(),
                announce_handler,
                torrents,
                users,
                client_whitelist,
                backend,
            }
        }

        #[must_use]
        pub fn initialize_open() -> Self {
            Self::initialize(&configuration::ephemeral())
        }

        #[must_use]
        pub fn initialize_open_with_peerless_torrent_removal() -> Self {
            Self::initialize(&configuration::ephemeral_with_peerless_torrent_removal())
        }

        #[must_use]
        pub fn initialize_private() -> Self {
            Self::initialize(&configuration::ephemeral_private())
        }

        #[must_use]
        pub fn initialize_with_client_whitelist() -> Self {
            Self::initialize(&configuration::ephemeral_with_client_whitelist())
        }

        /// Inserts the sample torrent with empty pools into the swarm store.
        pub fn insert_empty_torrent(&self) {
            self.torrents.insert(&Torrent::new(sample_info_hash()));
        }
    }
}
