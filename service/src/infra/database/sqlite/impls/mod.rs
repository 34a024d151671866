//! [`Database`] implementations.

#![allow(
    clippy::items_after_statements,
    reason = "`const SQL` after statements"
)]

mod listing;
mod user;

use common::operations::{Commit, Transact};
use tracerr::Traced;

use crate::infra::{database, Database};

use super::{NonTx, Sqlite, Tx};

impl Database<Transact> for Sqlite<NonTx> {
    type Ok = Sqlite<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Sqlite(Tx::from_non_tx(self.0.clone())))
    }
}

impl Database<Transact> for Sqlite<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Sqlite<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.commit().await.map_err(tracerr::wrap!())
    }
}
