//! Database errors.
//!
//! This module defines the [`Error`] enum used to represent errors that occur
//! during database operations. These errors encapsulate issues such as
//! missing query results, malformed queries, connection failures, and
//! connection pool creation errors. Each error variant includes contextual
//! information such as the associated database driver and, when applicable,
//! the underlying driver error.
//!
//! External errors from database libraries (e.g., `rusqlite`, `mysql`) are
//! converted into this error type using the provided `From` implementations.
use std::panic::Location;
use std::sync::Arc;

use r2d2_mysql::mysql::UrlError;

use super::driver::Driver;

/// A shareable reference to the underlying error of a database failure.
pub type DynError = Arc<dyn std::error::Error + Send + Sync>;

/// Database error type that encapsulates various failures encountered during
/// database operations.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    /// Indicates that a query unexpectedly returned no rows.
    #[error("The {driver} query unexpectedly returned nothing: {cause}")]
    QueryReturnedNoRows { cause: DynError, driver: Driver },

    /// Indicates that the query was malformed.
    #[error("The {driver} query was malformed: {cause}")]
    InvalidQuery { cause: DynError, driver: Driver },

    /// Indicates a failure to insert a record into the database.
    #[error("Unable to insert record into {driver} database, {location}")]
    InsertFailed {
        location: &'static Location<'static>,
        driver: Driver,
    },

    /// Indicates a failure to delete a record from the database.
    ///
    /// This error includes an error code that may be returned by the database
    /// driver.
    #[error("Failed to remove record from {driver} database, error-code: {error_code}, {location}")]
    DeleteFailed {
        location: &'static Location<'static>,
        error_code: usize,
        driver: Driver,
    },

    /// Indicates a failure to connect to the database.
    #[error("Failed to connect to {driver} database: {cause}")]
    ConnectionError { cause: DynError, driver: Driver },

    /// Indicates a failure to create a connection pool.
    #[error("Failed to create r2d2 {driver} connection pool: {cause}")]
    ConnectionPool { cause: DynError, driver: Driver },
}

impl From<r2d2_sqlite::rusqlite::Error> for Error {
    #[track_caller]
    fn from(err: r2d2_sqlite::rusqlite::Error) -> Self {
        match err {
            r2d2_sqlite::rusqlite::Error::QueryReturnedNoRows => Error::QueryReturnedNoRows {
                cause: Arc::new(err) as DynError,
                driver: Driver::Sqlite3,
            },
            _ => Error::InvalidQuery {
                cause: Arc::new(err) as DynError,
                driver: Driver::Sqlite3,
            },
        }
    }
}

impl From<r2d2_mysql::mysql::Error> for Error {
    #[track_caller]
    fn from(err: r2d2_mysql::mysql::Error) -> Self {
        Error::InvalidQuery {
            cause: Arc::new(err) as DynError,
            driver: Driver::MySQL,
        }
    }
}

impl From<UrlError> for Error {
    #[track_caller]
    fn from(err: UrlError) -> Self {
        Self::ConnectionError {
            cause: Arc::new(err) as DynError,
            driver: Driver::MySQL,
        }
    }
}

impl From<(r2d2::Error, Driver)> for Error {
    #[track_caller]
    fn from(e: (r2d2::Error, Driver)) -> Self {
        let (err, driver) = e;
        Self::ConnectionPool {
            cause: Arc::new(err) as DynError,
            driver,
        }
    }
}
