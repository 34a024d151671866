//! [`Command`] for deleting a [`User`].

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{user::Role, Listing};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`User`] on behalf of an [`Role::Admin`].
///
/// [`Listing`]s of the deleted [`User`] are left untouched.
#[derive(Clone, Copy, Debug)]
pub struct DeleteUser {
    /// ID of the [`User`] requesting the deletion.
    pub requester: user::Id,

    /// ID of the [`User`] to be deleted.
    pub target: user::Id,
}

impl<Db> Command<DeleteUser> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Delete<By<User, user::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteUser { requester, target } = cmd;

        if requester == target {
            return Err(tracerr::new!(E::SelfDeletion));
        }

        let requester = self
            .database()
            .execute(Select(By::new(requester)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::UserNotExists(requester))
            .map_err(tracerr::wrap!())?;
        if !requester.is_admin() {
            return Err(tracerr::new!(E::NotAdmin(requester.id)));
        }

        let target = self
            .database()
            .execute(Select(By::new(target)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::UserNotExists(target))
            .map_err(tracerr::wrap!())?;
        if target.is_admin() {
            return Err(tracerr::new!(E::ProtectedRole(target.id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Delete(By::new(target.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)
    }
}

/// Error of [`DeleteUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Requesting [`User`] is not an [`Role::Admin`].
    #[display("`User(id: {_0})` is not an admin")]
    #[from(ignore)]
    NotAdmin(#[error(not(source))] user::Id),

    /// Target [`User`] is an [`Role::Admin`], so cannot be deleted.
    #[display("`User(id: {_0})` is an admin and cannot be deleted")]
    #[from(ignore)]
    ProtectedRole(#[error(not(source))] user::Id),

    /// Requesting [`User`] is the target one.
    #[display("`User` cannot delete itself")]
    SelfDeletion,

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
