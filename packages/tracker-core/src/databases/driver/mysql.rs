//! The `MySQL` database driver.
use std::panic::Location;
use std::str::FromStr;

use bittorrent_primitives::info_hash::InfoHash;
use peertrack_primitives::peer::UserId;
use peertrack_primitives::PersistentTorrents;
use r2d2::Pool;
use r2d2_mysql::mysql::prelude::Queryable;
use r2d2_mysql::mysql::{params, Opts, OptsBuilder};
use r2d2_mysql::MySqlConnectionManager;

use super::{Database, Driver, Error};
use crate::authentication::{Passkey, User, PASSKEY_LENGTH};

const DRIVER: Driver = Driver::MySQL;

pub struct Mysql {
    pool: Pool<MySqlConnectionManager>,
}

impl Mysql {
    /// It instantiates a new `MySQL` database driver.
    ///
    /// # Errors
    ///
    /// Will return an [`Error`] if `db_path` is not a valid `MySQL`
    /// connection URL.
    pub fn new(db_path: &str) -> Result<Self, Error> {
        let opts = Opts::from_url(db_path)?;
        let builder = OptsBuilder::from_opts(opts);
        let manager = MySqlConnectionManager::new(builder);
        let pool = r2d2::Pool::builder().build(manager).map_err(|e| (e, DRIVER))?;

        Ok(Self { pool })
    }
}

impl Database for Mysql {
    /// Refer to [`Database::create_database_tables`].
    fn create_database_tables(&self) -> Result<(), Error> {
        let create_torrents_table = "
        CREATE TABLE IF NOT EXISTS torrents (
            id integer PRIMARY KEY AUTO_INCREMENT,
            info_hash VARCHAR(40) NOT NULL UNIQUE,
            snatches INTEGER DEFAULT 0 NOT NULL
        );"
        .to_string();

        let create_users_table = format!(
            "
        CREATE TABLE IF NOT EXISTS users (
          id INT NOT NULL AUTO_INCREMENT,
          passkey VARCHAR({}) NOT NULL,
          snatches INTEGER DEFAULT 0 NOT NULL,
          PRIMARY KEY (id),
          UNIQUE (passkey)
        );",
            i8::try_from(PASSKEY_LENGTH).expect("passkey length should fit within a i8!")
        );

        let create_client_whitelist_table = "
        CREATE TABLE IF NOT EXISTS client_whitelist (
            id integer PRIMARY KEY AUTO_INCREMENT,
            client_id VARCHAR(8) NOT NULL UNIQUE
        );"
        .to_string();

        let mut conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        conn.query_drop(&create_torrents_table)
            .expect("Could not create torrents table.");
        conn.query_drop(&create_users_table).expect("Could not create users table.");
        conn.query_drop(&create_client_whitelist_table)
            .expect("Could not create client_whitelist table.");

        Ok(())
    }

    /// Refer to [`Database::drop_database_tables`].
    fn drop_database_tables(&self) -> Result<(), Error> {
        let drop_torrents_table = "
        DROP TABLE `torrents`;"
            .to_string();

        let drop_users_table = "
        DROP TABLE `users`;"
            .to_string();

        let drop_client_whitelist_table = "
        DROP TABLE `client_whitelist`;"
            .to_string();

        let mut conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        conn.query_drop(&drop_torrents_table).expect("Could not drop `torrents` table.");
        conn.query_drop(&drop_users_table).expect("Could not drop `users` table.");
        conn.query_drop(&drop_client_whitelist_table)
            .expect("Could not drop `client_whitelist` table.");

        Ok(())
    }

    /// Refer to [`Database::load_persistent_torrents`].
    fn load_persistent_torrents(&self) -> Result<PersistentTorrents, Error> {
        let mut conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        let torrents = conn.query_map(
            "SELECT info_hash, snatches FROM torrents",
            |(info_hash_string, snatches): (String, u32)| {
                let info_hash = InfoHash::from_str(&info_hash_string).unwrap();
                (info_hash, snatches)
            },
        )?;

        Ok(torrents.iter().copied().collect())
    }

    /// Refer to [`Database::save_persistent_torrent`].
    fn save_persistent_torrent(&self, info_hash: &InfoHash, snatches: u32) -> Result<(), Error> {
        let mut conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        conn.exec_drop(
            "INSERT INTO torrents (info_hash, snatches) VALUES (:info_hash_str, :snatches) ON DUPLICATE KEY UPDATE snatches = VALUES(snatches)",
            params! {
                "info_hash_str" => info_hash.to_string(),
                "snatches" => snatches,
            },
        )?;

        Ok(())
    }

    /// Refer to [`Database::load_users`].
    fn load_users(&self) -> Result<Vec<User>, Error> {
        let mut conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        let users = conn.query_map(
            "SELECT id, passkey, snatches FROM users",
            |(id, passkey, snatches): (u64, String, u32)| User {
                id: UserId(id),
                passkey: passkey.parse::<Passkey>().unwrap(),
                snatches,
            },
        )?;

        Ok(users)
    }

    /// Refer to [`Database::get_user_from_users`].
    fn get_user_from_users(&self, passkey: &Passkey) -> Result<Option<User>, Error> {
        let mut conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        let select = conn.exec_first::<(u64, String, u32), _, _>(
            "SELECT id, passkey, snatches FROM users WHERE passkey = :passkey",
            params! { "passkey" => passkey.to_string() },
        )?;

        Ok(select.map(|(id, passkey, snatches)| User {
            id: UserId(id),
            passkey: passkey.parse::<Passkey>().unwrap(),
            snatches,
        }))
    }

    /// Refer to [`Database::add_user_to_users`].
    fn add_user_to_users(&self, user: &User) -> Result<usize, Error> {
        let mut conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        conn.exec_drop(
            "INSERT INTO users (passkey, snatches) VALUES (:passkey, :snatches)",
            params! {
                "passkey" => user.passkey.to_string(),
                "snatches" => user.snatches,
            },
        )?;

        Ok(1)
    }

    /// Refer to [`Database::remove_user_from_users`].
    fn remove_user_from_users(&self, passkey: &Passkey) -> Result<usize, Error> {
        let mut conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        conn.exec_drop(
            "DELETE FROM users WHERE passkey = :passkey",
            params! { "passkey" => passkey.to_string() },
        )?;

        let deleted = usize::try_from(conn.affected_rows()).expect("the number of deleted rows should fit within a usize");

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
        let mut conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        let client_ids = conn.query_map("SELECT client_id FROM client_whitelist", |client_id: String| client_id)?;

        Ok(client_ids)
    }

    /// Refer to [`Database::get_client_from_whitelist`].
    fn get_client_from_whitelist(&self, client_id: &str) -> Result<Option<String>, Error> {
        let mut conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        let select = conn.exec_first::<String, _, _>(
            "SELECT client_id FROM client_whitelist WHERE client_id = :client_id",
            params! { "client_id" => client_id },
        )?;

        Ok(select)
    }

    /// Refer to [`Database::add_client_to_whitelist`].
    fn add_client_to_whitelist(&self, client_id: &str) -> Result<usize, Error> {
        let mut conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        conn.exec_drop(
            "INSERT INTO client_whitelist (client_id) VALUES (:client_id)",
            params! { "client_id" => client_id },
        )?;

        Ok(1)
    }

    /// Refer to [`Database::remove_client_from_whitelist`].
    fn remove_client_from_whitelist(&self, client_id: &str) -> Result<usize, Error> {
        let mut conn = self.pool.get().map_err(|e| (e, DRIVER))?;

        conn.exec_drop(
            "DELETE FROM client_whitelist WHERE client_id = :client_id",
            params! { "client_id" => client_id },
        )?;

        let deleted = usize::try_from(conn.affected_rows()).expect("the number of deleted rows should fit within a usize");

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
