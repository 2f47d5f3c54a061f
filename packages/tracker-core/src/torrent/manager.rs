use std::sync::Arc;

use super::repository::in_memory::InMemoryTorrentRepository;
use super::repository::persisted::DatabasePersistentTorrentRepository;
use crate::databases;

pub struct TorrentsManager {
    /// The in-memory torrents repository.
    in_memory_torrent_repository: Arc<InMemoryTorrentRepository>,

    /// The persistent torrents repository.
    db_torrent_repository: Arc<DatabasePersistentTorrentRepository>,
}

impl TorrentsManager {
    #[must_use]
    pub fn new(
        in_memory_torrent_repository: &Arc<InMemoryTorrentRepository>,
        db_torrent_repository: &Arc<DatabasePersistentTorrentRepository>,
    ) -> Self {
        Self {
            in_memory_torrent_repository: in_memory_torrent_repository.clone(),
            db_torrent_repository: db_torrent_repository.clone(),
        }
    }

    /// It loads the torrents from the database into memory. It only loads the
    /// torrent entry list with the number of snatches for each torrent. Peer
    /// data is not persisted.
    ///
    /// # Errors
    ///
    /// Will return a `databases::error::Error` if unable to load the
    /// persisted torrents from the database.
    pub fn load_torrents_from_database(&self) -> Result<(), databases::error::Error> {
        let persistent_torrents = self.db_torrent_repository.load_all()?;

        self.in_memory_torrent_repository.import_persistent(&persistent_torrents);

        tracing::debug!("loaded {} persisted torrents into memory", persistent_torrents.len());

        Ok(())
    }
}

#[cfg(test)]
mod tests {

    use std::sync::Arc;

    use super::{DatabasePersistentTorrentRepository, TorrentsManager};
    use crate::databases::setup::initialize_database;
    use crate::test_helpers::tests::{ephemeral_configuration, sample_info_hash};
    use crate::torrent::repository::in_memory::InMemoryTorrentRepository;

    struct TorrentsManagerDeps {
        in_memory_torrent_repository: Arc<InMemoryTorrentRepository>,
        database_persistent_torrent_repository: Arc<DatabasePersistentTorrentRepository>,
    }

    fn initialize_torrents_manager() -> (Arc<TorrentsManager>, Arc<TorrentsManagerDeps>) {
        let config = ephemeral_configuration();

        let in_memory_torrent_repository = Arc::new(InMemoryTorrentRepository::default());
        let database = initialize_database(&config);
        let database_persistent_torrent_repository = Arc::new(DatabasePersistentTorrentRepository::new(&database));

        let torrents_manager = Arc::new(TorrentsManager::new(
            &in_memory_torrent_repository,
            &database_persistent_torrent_repository,
        ));

        (
            torrents_manager,
            Arc::new(TorrentsManagerDeps {
                in_memory_torrent_repository,
                database_persistent_torrent_repository,
            }),
        )
    }

    #[test]
    fn it_should_load_the_number_of_snatches_for_all_torrents_from_the_database() {
        let (torrents_manager, services) = initialize_torrents_manager();

        let infohash = sample_info_hash();

        services.database_persistent_torrent_repository.save(&infohash, 1).unwrap();

        torrents_manager.load_torrents_from_database().unwrap();

        assert_eq!(
            services.in_memory_torrent_repository.get(&infohash).unwrap().snatches,
            1
        );
    }
}
