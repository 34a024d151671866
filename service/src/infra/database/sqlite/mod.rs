//! SQLite [`Database`] implementation.

pub mod client;
pub mod connection;
mod impls;
mod schema;

use std::{path::PathBuf, str::FromStr as _, time::Duration};

use derive_more::{Deref, Display, Error as StdError, From};
use smart_default::SmartDefault;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use self::{
    client::{NonTx, Tx},
    connection::Connection,
};

/// SQLite [`Database`] client.
#[derive(Clone, Debug, Deref)]
pub struct Sqlite<T = NonTx>(T);

/// Configuration of a [`Sqlite`] client.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Path to the database file.
    ///
    /// Created if it doesn't exist.
    #[default(PathBuf::from("users.db"))]
    pub path: PathBuf,

    /// Maximum number of simultaneously open connections.
    #[default(4)]
    pub max_connections: u32,

    /// Duration to wait for a locked database before failing.
    #[default(Duration::from_secs(5))]
    pub busy_timeout: Duration,
}

impl Sqlite {
    /// Creates a new [`Sqlite`] client with the provided [`Config`].
    ///
    /// Connections are opened lazily, on the first use.
    #[must_use]
    pub fn new(conf: &Config) -> Self {
        let opts = SqliteConnectOptions::new()
            .filename(&conf.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(conf.busy_timeout);
        let pool = SqlitePoolOptions::new()
            .max_connections(conf.max_connections)
            .connect_lazy_with(opts);
        Self(NonTx::from_pool(pool))
    }

    /// Creates a new [`Sqlite`] client backed by a private in-memory
    /// database.
    ///
    /// The database lives as long as its single connection, so the connection
    /// is never closed by the pool.
    ///
    /// # Errors
    ///
    /// If failed to parse the in-memory connection options.
    pub fn in_memory() -> Result<Self, Traced<database::Error>> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_lazy_with(opts);
        Ok(Self(NonTx::from_pool(pool)))
    }
}

/// SQLite database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// [`Connection`] error.
    #[display("`Connection` error: {_0}")]
    Connection(connection::Error),
}

impl Error {
    /// Checks if the error is a violation of a `UNIQUE` constraint.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Connection(e) => e
                .as_database_error()
                .is_some_and(|e| e.is_unique_violation()),
        }
    }
}
