//! The `SQLite3` database driver.
use std::panic::Location;
use std::str::FromStr;

use bittorrent_primitives::info_hash::InfoHash;
use peertrack_primitives::peer::UserId;
use peertrack_primitives::PersistentTorrents;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use super::{Database, Driver, Error};
use crate::authentication::{Passkey, User};

const DRIVER: Driver = Driver::Sqlite3;

pub struct Sqlite {
    pool: Pool<SqliteConnectionManager>,
}

impl Sqlite {
    /// It instantiates a new `SQLite3` database driver.
    ///
    /// # Errors
    ///
    /// Will return an [`Error`] if `db_path` is not able to create a `SQLite`
    /// database.
    pub fn new(db_path: &str) -> Result<Self, Error> {
        let manager = SqliteConnectionManager::file(db_path);
        let pool = r2d2::Pool::builder().build(manager).map_err(|e| (e, DRIVER))?;

        Ok(Self { pool })
    }
}

impl Database for Sqlite {
    /// Refer to [`Database::create_database_tables`].
    fn create_database_tables(&self) -> Result<(), Error> {
        let create_torrents_table = "
        CREATE TABLE IF NOT EXISTS torrents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            info_hash TEXT NOT NULL UNIQUE,
            snatches INTEGER DEFAULT 0 NOT NULL
        );"
        .to_string();

        let create_users_table = "
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            passkey TEXT NOT NULL UNIQUE,
            snatches INTEGER DEFAULT 0 NOT NULL
        );"
        .to_string();

        let create_client_whitelist_table = "
        CREATE TABLE IF NOT EXISTS client_whitelist (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            client_id TEXT NOT NULL UNIQUE
        );"
        .to_string();

        let conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        conn.execute(&create_torrents_table, [])?;
        conn.execute(&create_users_table, [])?;
        conn.execute(&create_client_whitelist_table, [])?;

        Ok(())
    }

    /// Refer to [`Database::drop_database_tables`].
    fn drop_database_tables(&self) -> Result<(), Error> {
        let drop_torrents_table = "
        DROP TABLE torrents;"
            .to_string();

        let drop_users_table = "
        DROP TABLE users;"
            .to_string();

        let drop_client_whitelist_table = "
        DROP TABLE client_whitelist;"
            .to_string();

        let conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        conn.execute(&drop_torrents_table, [])
            .and_then(|_| conn.execute(&drop_users_table, []))
            .and_then(|_| conn.execute(&drop_client_whitelist_table, []))?;

        Ok(())
    }

    /// Refer to [`Database::load_persistent_torrents`].
    fn load_persistent_torrents(&self) -> Result<PersistentTorrents, Error> {
        let conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        let mut stmt = conn.prepare("SELECT info_hash, snatches FROM torrents")?;

        let torrent_iter = stmt.query_map([], |row| {
            let info_hash_string: String = row.get(0)?;
            let info_hash = InfoHash::from_str(&info_hash_string).unwrap();
            let snatches: u32 = row.get(1)?;
            Ok((info_hash, snatches))
        })?;

        Ok(torrent_iter.filter_map(std::result::Result::ok).collect())
    }

    /// Refer to [`Database::save_persistent_torrent`].
    fn save_persistent_torrent(&self, info_hash: &InfoHash, snatches: u32) -> Result<(), Error> {
        let conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        let insert = conn.execute(
            "INSERT INTO torrents (info_hash, snatches) VALUES (?1, ?2) ON CONFLICT(info_hash) DO UPDATE SET snatches = ?2",
            [info_hash.to_string(), snatches.to_string()],
        )?;

        if insert == 0 {
            Err(Error::InsertFailed {
                location: Location::caller(),
                driver: DRIVER,
            })
        } else {
            Ok(())
        }
    }

    /// Refer to [`Database::load_users`].
    fn load_users(&self) -> Result<Vec<User>, Error> {
        let conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        let mut stmt = conn.prepare("SELECT id, passkey, snatches FROM users")?;

        let users_iter = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let passkey: String = row.get(1)?;
            let snatches: u32 = row.get(2)?;

            Ok(User {
                id: UserId(id.unsigned_abs()),
                passkey: passkey.parse::<Passkey>().unwrap(),
                snatches,
            })
        })?;

        Ok(users_iter.filter_map(std::result::Result::ok).collect())
    }

    /// Refer to [`Database::get_user_from_users`].
    fn get_user_from_users(&self, passkey: &Passkey) -> Result<Option<User>, Error> {
        let conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        let mut stmt = conn.prepare("SELECT id, passkey, snatches FROM users WHERE passkey = ?")?;

        let mut rows = stmt.query([passkey.to_string()])?;

        let row = rows.next()?;

        Ok(row.map(|row| {
            let id: i64 = row.get_unwrap(0);
            let passkey: String = row.get_unwrap(1);
            let snatches: u32 = row.get_unwrap(2);

            User {
                id: UserId(id.unsigned_abs()),
                passkey: passkey.parse::<Passkey>().unwrap(),
                snatches,
            }
        }))
    }

    /// Refer to [`Database::add_user_to_users`].
    fn add_user_to_users(&self, user: &User) -> Result<usize, Error> {
        let conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        let insert = conn.execute(
            "INSERT INTO users (passkey, snatches) VALUES (?1, ?2)",
            [user.passkey.to_string(), user.snatches.to_string()],
        )?;

        if insert == 0 {
            Err(Error::InsertFailed {
                location: Location::caller(),
                driver: DRIVER,
            })
        } else {
            Ok(insert)
        }
    }

    /// Refer to [`Database::remove_user_from_users`].
    fn remove_user_from_users(&self, passkey: &Passkey) -> Result<usize, Error> {
        let conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        let deleted = conn.execute("DELETE FROM users WHERE passkey = ?", [passkey.to_string()])?;

        if deleted == 1 {
            // should only remove a single record.
            Ok(deleted)
        } else {
            Err(Error::DeleteFailed {
                location: Location::caller(),
                error_code: deleted,
                driver: DRIVER,
            })
        }
    }

    /// Refer to [`Database::load_client_whitelist`].
    fn load_client_whitelist(&self) -> Result<Vec<String>, Error> {
        let conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        let mut stmt = conn.prepare("SELECT client_id FROM client_whitelist")?;

        let client_id_iter = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let client_ids: Vec<String> = client_id_iter.filter_map(std::result::Result::ok).collect();

        Ok(client_ids)
    }

    /// Refer to [`Database::get_client_from_whitelist`].
    fn get_client_from_whitelist(&self, client_id: &str) -> Result<Option<String>, Error> {
        let conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        let mut stmt = conn.prepare("SELECT client_id FROM client_whitelist WHERE client_id = ?")?;

        let mut rows = stmt.query([client_id])?;

        let row = rows.next()?;

        Ok(row.map(|row| row.get_unwrap::<_, String>(0)))
    }

    /// Refer to [`Database::add_client_to_whitelist`].
    fn add_client_to_whitelist(&self, client_id: &str) -> Result<usize, Error> {
        let conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        let insert = conn.execute("INSERT INTO client_whitelist (client_id) VALUES (?)", [client_id])?;

        if insert == 0 {
            Err(Error::InsertFailed {
                location: Location::caller(),
                driver: DRIVER,
            })
        } else {
            Ok(insert)
        }
    }

    /// Refer to [`Database::remove_client_from_whitelist`].
    fn remove_client_from_whitelist(&self, client_id: &str) -> Result<usize, Error> {
        let conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        let deleted = conn.execute("DELETE FROM client_whitelist WHERE client_id = ?", [client_id])?;

        if deleted == 1 {
            // should only remove a single record.
            Ok(deleted)
        } else {
            Err(Error::DeleteFailed {
                location: Location::caller(),
                error_code: deleted,
                driver: DRIVER,
            })
        }
    }
}

#[cfg(test)]
mod tests {

    mod the_sqlite_driver {
        use peertrack_test_helpers::configuration::ephemeral_sqlite_database;

        use crate::databases::driver::sqlite::Sqlite;
        use crate::databases::Database;

        fn initialize_driver_and_database() -> Sqlite {
            let temp_file = ephemeral_sqlite_database();
            let driver = Sqlite::new(temp_file.to_str().unwrap()).unwrap();
            driver.create_database_tables().unwrap();
            driver
        }

        mod handling_the_schema {
            use crate::databases::driver::sqlite::tests::the_sqlite_driver::initialize_driver_and_database;
            use crate::databases::Database;

            #[test]
            fn it_should_create_and_drop_the_tables() {
                let driver = initialize_driver_and_database();

                driver.drop_database_tables().unwrap();
                driver.create_database_tables().unwrap();
            }
        }

        mod handling_torrent_persistence {
            use crate::databases::driver::sqlite::tests::the_sqlite_driver::initialize_driver_and_database;
            use crate::databases::Database;
            use crate::test_helpers::tests::sample_info_hash;

            #[test]
            fn it_should_save_and_load_persistent_torrents() {
                let driver = initialize_driver_and_database();

                let infohash = sample_info_hash();

                let number_of_snatches = 1;

                driver.save_persistent_torrent(&infohash, number_of_snatches).unwrap();

                let torrents = driver.load_persistent_torrents().unwrap();

                assert_eq!(torrents.len(), 1);
                assert_eq!(torrents.get(&infohash), Some(number_of_snatches).as_ref());
            }
        }

        mod handling_users {
            use crate::databases::driver::sqlite::tests::the_sqlite_driver::initialize_driver_and_database;
            use crate::databases::Database;
            use crate::test_helpers::tests::sample_user;

            #[test]
            fn it_should_save_and_load_users() {
                let driver = initialize_driver_and_database();

                let user = sample_user();
                driver.add_user_to_users(&user).unwrap();

                let stored_user = driver.get_user_from_users(&user.passkey).unwrap().unwrap();

                assert_eq!(stored_user.passkey, user.passkey);
                assert_eq!(stored_user.snatches, user.snatches);
            }

            #[test]
            fn it_should_remove_a_user() {
                let driver = initialize_driver_and_database();

                let user = sample_user();
                driver.add_user_to_users(&user).unwrap();

                driver.remove_user_from_users(&user.passkey).unwrap();

                assert!(driver.get_user_from_users(&user.passkey).unwrap().is_none());
            }

            #[test]
            fn it_should_fail_trying_to_add_the_same_passkey_twice() {
                let driver = initialize_driver_and_database();

                let user = sample_user();

                driver.add_user_to_users(&user).unwrap();
                let result = driver.add_user_to_users(&user);

                assert!(result.is_err());
            }
        }

        mod handling_the_client_whitelist {
            use crate::databases::driver::sqlite::tests::the_sqlite_driver::initialize_driver_and_database;
            use crate::databases::Database;

            #[test]
            fn it_should_add_and_get_whitelisted_clients() {
                let driver = initialize_driver_and_database();

                driver.add_client_to_whitelist("qB4250").unwrap();

                let stored_client = driver.get_client_from_whitelist("qB4250").unwrap().unwrap();

                assert_eq!(stored_client, "qB4250");
            }

            #[test]
            fn it_should_tell_whether_a_client_is_whitelisted() {
                let driver = initialize_driver_and_database();

                driver.add_client_to_whitelist("qB4250").unwrap();

                assert!(driver.is_client_whitelisted("qB4250").unwrap());
                assert!(!driver.is_client_whitelisted("UT2210").unwrap());
            }

            #[test]
            fn it_should_remove_a_whitelisted_client() {
                let driver = initialize_driver_and_database();

                driver.add_client_to_whitelist("qB4250").unwrap();
                driver.remove_client_from_whitelist("qB4250").unwrap();

                assert!(driver.get_client_from_whitelist("qB4250").unwrap().is_none());
            }
        }
    }
}
