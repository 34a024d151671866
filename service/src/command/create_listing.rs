//! [`Command`] for creating a new [`Listing`].

use common::operations::{Commit, Insert, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{listing::Status, User};
use crate::{
    domain::{listing, user, Listing},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for putting a car up for sale.
///
/// The created [`Listing`] is [`Status::ForSale`].
#[derive(Clone, Debug)]
pub struct CreateListing {
    /// [`listing::Make`] of the car.
    pub make: listing::Make,

    /// [`listing::Model`] of the car.
    pub model: listing::Model,

    /// Manufacturing [`listing::Year`] of the car.
    pub year: listing::Year,

    /// [`listing::Price`] of the car.
    pub price: listing::Price,

    /// Optional [`listing::Description`] of the car.
    pub description: Option<listing::Description>,

    /// [`user::Login`] of the selling [`User`].
    pub seller_login: user::Login,
}

impl<Db> Command<CreateListing> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Insert<listing::New>,
            Ok = Listing,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateListing {
            make,
            model,
            year,
            price,
            description,
            seller_login,
        } = cmd;

        let new = listing::New {
            make,
            model,
            year,
            price,
            description,
            seller_login,
            created_at: listing::CreationDateTime::now(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let listing = tx
            .execute(Insert(new))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(listing)
    }
}

/// Error of [`CreateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{fixture::Users, CreateListing},
        domain::listing,
        query, Command as _, Query as _, Service,
    };

    fn cmd(seller: &crate::domain::User, year: i32) -> CreateListing {
        CreateListing {
            make: listing::Make::new("Lada").unwrap(),
            model: listing::Model::new("Niva").unwrap(),
            year: listing::Year::new(year).unwrap(),
            price: listing::Price::new(0.01).unwrap(),
            description: listing::Description::new("Runs well"),
            seller_login: seller.login.clone(),
        }
    }

    #[tokio::test]
    async fn creates_listing_for_sale() {
        let svc = Service::in_memory().await;
        let Users { seller, .. } = Users::create(&svc).await;

        let created = svc.execute(cmd(&seller, 1950)).await.unwrap();

        assert_eq!(created.status, listing::Status::ForSale);
        assert_eq!(created.seller_login, seller.login);
        assert!(created.created_at.is_some());
        let stored = svc
            .execute(query::listing::ById::by(created.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn accepts_boundary_years() {
        let svc = Service::in_memory().await;
        let Users { seller, .. } = Users::create(&svc).await;

        _ = svc.execute(cmd(&seller, 1950)).await.unwrap();
        _ = svc.execute(cmd(&seller, 2024)).await.unwrap();

        let own = svc
            .execute(query::listings::BySeller::by(seller.login.clone()))
            .await
            .unwrap();
        let years = own.iter().map(|l| i32::from(l.year)).collect::<Vec<_>>();
        assert_eq!(years, [1950, 2024]);
    }
}
