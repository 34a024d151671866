//! [`Command`] for deleting a [`Listing`].

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Role;
use crate::{
    domain::{listing, user, Listing, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Listing`] on behalf of its seller or an
/// [`Role::Admin`].
///
/// [`Listing`] is deleted regardless of its [`listing::Status`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteListing {
    /// ID of the [`User`] requesting the deletion.
    pub requester: user::Id,

    /// ID of the [`Listing`] to be deleted.
    pub listing_id: listing::Id,
}

impl<Db> Command<DeleteListing> for Service<Db>
where
    Db: Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Delete<By<Listing, listing::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteListing {
            requester,
            listing_id,
        } = cmd;

        let listing = self
            .database()
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;

        let requester = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(requester)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::UserNotExists(requester))
            .map_err(tracerr::wrap!())?;
        if !listing.is_deletable_by(&requester) {
            return Err(tracerr::new!(E::Forbidden(requester.id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Delete(By::new(listing.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)
    }
}

/// Error of [`DeleteListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Requesting [`User`] is neither the seller nor an [`Role::Admin`].
    #[display("`User(id: {_0})` is not allowed to delete the `Listing`")]
    #[from(ignore)]
    Forbidden(#[error(not(source))] user::Id),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
