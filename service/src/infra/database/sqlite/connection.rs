//! [`Connection`] definitions.

use std::future::Future;

use sqlx::sqlite::SqliteArguments;
use tracerr::Traced;

use crate::infra::database;

pub use sqlx::{sqlite::SqliteRow as Row, Error, SqlitePool as Pool};

/// Prepared SQLite statement with its bound arguments.
pub type Query<'q> = sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>;

/// Transaction started in a [`Pool`] connection.
pub type Tx = sqlx::Transaction<'static, sqlx::Sqlite>;

/// Generic database connection.
pub trait Connection {
    /// Executes the provided [`Query`] and returns the resulting rows.
    ///
    /// # Errors
    ///
    /// If failed to execute the [`Query`].
    fn query<'q>(
        &self,
        query: Query<'q>,
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>> + Send;

    /// Executes the provided [`Query`] and returns the exactly one resulting
    /// row.
    ///
    /// # Errors
    ///
    /// If failed to execute the [`Query`], or it returned no rows.
    fn query_one<'q>(
        &self,
        query: Query<'q>,
    ) -> impl Future<Output = Result<Row, Traced<database::Error>>> + Send;

    /// Executes the provided [`Query`] and returns the optional resulting row.
    ///
    /// # Errors
    ///
    /// If failed to execute the [`Query`].
    fn query_opt<'q>(
        &self,
        query: Query<'q>,
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>> + Send;

    /// Executes the provided [`Query`] and returns the number of affected
    /// rows.
    ///
    /// # Errors
    ///
    /// If failed to execute the [`Query`].
    fn exec<'q>(
        &self,
        query: Query<'q>,
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>> + Send;

    /// Executes the provided batch of `;`-separated statements without
    /// arguments.
    ///
    /// # Errors
    ///
    /// If failed to execute the batch.
    fn batch_exec(
        &self,
        sql: &str,
    ) -> impl Future<Output = Result<(), Traced<database::Error>>> + Send;
}
