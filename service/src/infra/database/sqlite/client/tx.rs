//! [`Tx`] client definitions.

use std::{fmt, sync::Arc};

use sqlx::{Executor as _, SqliteConnection};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracerr::Traced;

use crate::infra::database::{
    self,
    sqlite::{
        self,
        connection::{self, Query, Row},
        Connection,
    },
};

use super::NonTx;

/// Transactional SQLite database client.
///
/// The transaction is started lazily, on the first executed statement, so
/// a [`Tx`] which executed nothing never holds a connection.
#[derive(Clone)]
pub struct Tx {
    /// [`connection::Pool`] to start the [`connection::Tx`] in.
    pool: connection::Pool,

    /// Lazily started [`connection::Tx`].
    tx: Arc<Mutex<Option<Started>>>,
}

/// Started [`connection::Tx`], executing statements via the boxed
/// [`sqlx::Executor`] futures only.
struct Started(connection::Tx);

impl Started {
    /// Returns the connection the transaction runs on.
    fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.0
    }
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tx")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl Tx {
    /// Creates a new [`Tx`] client from the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            pool: client.pool,
            tx: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the underlying [`connection::Tx`] of this [`Tx`] client,
    /// starting it if it's not started yet.
    async fn connection(
        &self,
    ) -> Result<MappedMutexGuard<'_, Started>, Traced<database::Error>> {
        let mut guard = self.tx.lock().await;
        let tx = match guard.take() {
            Some(tx) => tx,
            None => Started(
                self.pool
                    .begin()
                    .await
                    .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
                    .map_err(tracerr::map_from)?,
            ),
        };
        Ok(MutexGuard::map(guard, |slot| slot.insert(tx)))
    }

    /// Commits this [`Tx`] client.
    ///
    /// Next time this [`Tx`] client is used, it starts a new transaction.
    ///
    /// # Errors
    ///
    /// If failed to commit transaction of this [`Tx`] client.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Some(Started(tx)) = self.tx.lock().await.take() else {
            // Nothing was executed, so nothing to commit.
            return Ok(());
        };
        tx.commit()
            .await
            .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
            .map_err(tracerr::map_from)
    }
}

impl Connection for Tx {
    async fn query<'q>(
        &self,
        query: Query<'q>,
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        let mut tx = self.connection().await.map_err(tracerr::wrap!())?;
        let conn = tx.conn();
        conn.fetch_all(query)
            .await
            .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
            .map_err(tracerr::map_from)
    }

    async fn query_one<'q>(
        &self,
        query: Query<'q>,
    ) -> Result<Row, Traced<database::Error>> {
        let mut tx = self.connection().await.map_err(tracerr::wrap!())?;
        let conn = tx.conn();
        conn.fetch_one(query)
            .await
            .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
            .map_err(tracerr::map_from)
    }

    async fn query_opt<'q>(
        &self,
        query: Query<'q>,
    ) -> Result<Option<Row>, Traced<database::Error>> {
        let mut tx = self.connection().await.map_err(tracerr::wrap!())?;
        let conn = tx.conn();
        conn.fetch_optional(query)
            .await
            .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
            .map_err(tracerr::map_from)
    }

    async fn exec<'q>(
        &self,
        query: Query<'q>,
    ) -> Result<u64, Traced<database::Error>> {
        let mut tx = self.connection().await.map_err(tracerr::wrap!())?;
        let conn = tx.conn();
        conn.execute(query)
            .await
            .map(|res| res.rows_affected())
            .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
            .map_err(tracerr::map_from)
    }

    async fn batch_exec(&self, sql: &str) -> Result<(), Traced<database::Error>> {
        let mut tx = self.connection().await.map_err(tracerr::wrap!())?;
        let conn = tx.conn();
        conn.execute(sqlx::raw_sql(sql))
            .await
            .map(drop)
            .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
            .map_err(tracerr::map_from)
    }
}
