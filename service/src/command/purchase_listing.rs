//! [`Command`] for purchasing a [`Listing`].

use common::operations::{By, Commit, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{listing, user, Listing},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for purchasing a [`Listing`] by a buyer.
///
/// The availability check and the update are not atomic: concurrent purchases
/// of the same [`Listing`] by different buyers resolve as the last one wins.
#[derive(Clone, Debug)]
pub struct PurchaseListing {
    /// [`user::Login`] of the purchasing [`User`].
    pub buyer_login: user::Login,

    /// ID of the [`Listing`] to be purchased.
    pub listing_id: listing::Id,
}

impl<Db> Command<PurchaseListing> for Service<Db>
where
    Db: Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Update<Listing>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: PurchaseListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let PurchaseListing {
            buyer_login,
            listing_id,
        } = cmd;

        let mut listing = self
            .database()
            .execute(Select(By::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;

        match listing.buyer_login() {
            None => {}
            Some(buyer) if *buyer == buyer_login => {
                return Err(tracerr::new!(E::AlreadyOwnedByBuyer(listing_id)));
            }
            Some(_) => {
                return Err(tracerr::new!(E::AlreadyPurchased(listing_id)));
            }
        }

        listing.status = listing::Status::Purchased {
            buyer: buyer_login,
            purchased_at: Some(listing::PurchaseDateTime::now()),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Update(listing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(listing)
    }
}

/// Error of [`PurchaseListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] is already purchased by the same buyer.
    #[display("`Listing(id: {_0})` is already owned by the buyer")]
    #[from(ignore)]
    AlreadyOwnedByBuyer(#[error(not(source))] listing::Id),

    /// [`Listing`] is already purchased by another buyer.
    #[display("`Listing(id: {_0})` is already purchased")]
    #[from(ignore)]
    AlreadyPurchased(#[error(not(source))] listing::Id),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{
            fixture::{create_listing, Users},
            purchase_listing::ExecutionError,
            PurchaseListing,
        },
        domain::listing,
        query, read, Command as _, Query as _, Service,
    };

    #[tokio::test]
    async fn purchases_listing() {
        let svc = Service::in_memory().await;
        let Users { seller, buyer, .. } = Users::create(&svc).await;
        let car = create_listing(&svc, &seller, 100.0).await;

        let purchased = svc
            .execute(PurchaseListing {
                buyer_login: buyer.login.clone(),
                listing_id: car.id,
            })
            .await
            .unwrap();

        assert_eq!(purchased.buyer_login(), Some(&buyer.login));
        assert!(matches!(
            purchased.status,
            listing::Status::Purchased {
                purchased_at: Some(_),
                ..
            },
        ));
        assert_eq!(purchased.seller_login, seller.login);
        let stored = svc
            .execute(query::listing::ById::by(car.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, purchased);

        let for_sale = svc
            .execute(query::listings::Search::by(
                read::listing::search::Filter::default(),
            ))
            .await
            .unwrap();
        assert!(for_sale.is_empty());
    }

    #[tokio::test]
    async fn rejects_repeated_purchase() {
        let svc = Service::in_memory().await;
        let Users { seller, buyer, .. } = Users::create(&svc).await;
        let car = create_listing(&svc, &seller, 100.0).await;
        let cmd = PurchaseListing {
            buyer_login: buyer.login.clone(),
            listing_id: car.id,
        };
        let purchased = svc.execute(cmd.clone()).await.unwrap();

        let err = svc.execute(cmd).await.unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::AlreadyOwnedByBuyer(id) if *id == car.id),
            "unexpected error: {err}",
        );
        let stored = svc
            .execute(query::listing::ById::by(car.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, purchased);
    }

    #[tokio::test]
    async fn rejects_purchase_by_another_buyer() {
        let svc = Service::in_memory().await;
        let Users {
            seller,
            buyer,
            other_buyer,
            ..
        } = Users::create(&svc).await;
        let car = create_listing(&svc, &seller, 100.0).await;
        _ = svc
            .execute(PurchaseListing {
                buyer_login: buyer.login.clone(),
                listing_id: car.id,
            })
            .await
            .unwrap();

        let err = svc
            .execute(PurchaseListing {
                buyer_login: other_buyer.login.clone(),
                listing_id: car.id,
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::AlreadyPurchased(id) if *id == car.id),
            "unexpected error: {err}",
        );
        let stored = svc
            .execute(query::listing::ById::by(car.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.buyer_login(), Some(&buyer.login));
    }

    #[tokio::test]
    async fn rejects_missing_listing() {
        let svc = Service::in_memory().await;
        let Users { buyer, .. } = Users::create(&svc).await;

        let err = svc
            .execute(PurchaseListing {
                buyer_login: buyer.login.clone(),
                listing_id: listing::Id::from(7),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::ListingNotExists(_)),
            "unexpected error: {err}",
        );
    }
}
