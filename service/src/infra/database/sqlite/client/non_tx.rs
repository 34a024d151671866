//! [`NonTx`] client definitions.

use tracerr::Traced;

use crate::infra::database::{
    self,
    sqlite::{
        self,
        connection::{self, Query, Row},
        Connection,
    },
};

/// Non-transactional SQLite database client.
///
/// Every statement acquires a [`connection::Pool`] connection of its own and
/// returns it right after completion.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to execute statements on.
    pub(crate) pool: connection::Pool,
}

impl NonTx {
    /// Creates a new [`NonTx`] client from the provided [`connection::Pool`].
    #[must_use]
    pub(crate) const fn from_pool(pool: connection::Pool) -> Self {
        Self { pool }
    }
}

impl Connection for NonTx {
    async fn query<'q>(
        &self,
        query: Query<'q>,
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        query
            .fetch_all(&self.pool)
            .await
            .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
            .map_err(tracerr::map_from)
    }

    async fn query_one<'q>(
        &self,
        query: Query<'q>,
    ) -> Result<Row, Traced<database::Error>> {
        query
            .fetch_one(&self.pool)
            .await
            .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
            .map_err(tracerr::map_from)
    }

    async fn query_opt<'q>(
        &self,
        query: Query<'q>,
    ) -> Result<Option<Row>, Traced<database::Error>> {
        query
            .fetch_optional(&self.pool)
            .await
            .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
            .map_err(tracerr::map_from)
    }

    async fn exec<'q>(
        &self,
        query: Query<'q>,
    ) -> Result<u64, Traced<database::Error>> {
        query
            .execute(&self.pool)
            .await
            .map(|res| res.rows_affected())
            .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
            .map_err(tracerr::map_from)
    }

    async fn batch_exec(&self, sql: &str) -> Result<(), Traced<database::Error>> {
        sqlx::raw_sql(sql)
            .execute(&self.pool)
            .await
            .map(drop)
            .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
            .map_err(tracerr::map_from)
    }
}
