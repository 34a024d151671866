//! [`Query`] definition.

pub mod listing;
pub mod listings;
pub mod user;
pub mod users;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::fixture::{create_listing, Users},
        query, read, Query as _, Service,
    };

    #[tokio::test]
    async fn lists_listings_of_seller_only() {
        let svc = Service::in_memory().await;
        let Users { seller, admin, .. } = Users::create(&svc).await;
        let own = create_listing(&svc, &seller, 100.0).await;
        let foreign = create_listing(&svc, &admin, 200.0).await;

        let mine = svc
            .execute(query::listings::BySeller::by(seller.login.clone()))
            .await
            .unwrap();
        let all = svc.execute(query::listings::List::by(())).await.unwrap();

        assert_eq!(mine, [own.clone()]);
        assert_eq!(all, [own, foreign]);
    }

    #[tokio::test]
    async fn returns_none_for_missing_user() {
        let svc = Service::in_memory().await;
        let Users { buyer, .. } = Users::create(&svc).await;

        let found = svc
            .execute(query::user::ById::by(buyer.id))
            .await
            .unwrap();
        let missing = svc
            .execute(query::user::ById::by(i64::MAX.into()))
            .await
            .unwrap();

        assert_eq!(found.map(|u| u.login), Some(buyer.login));
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn searches_by_price_sorted() {
        let svc = Service::in_memory().await;
        let Users { seller, .. } = Users::create(&svc).await;
        let cheap = create_listing(&svc, &seller, 100.0).await;
        let middle = create_listing(&svc, &seller, 200.0).await;
        let pricey = create_listing(&svc, &seller, 300.0).await;

        let found = svc
            .execute(query::listings::Search::by(
                read::listing::search::Filter {
                    min_price: Some(100.0),
                    max_price: Some(250.0),
                    sort: read::listing::search::Sort::PriceDesc,
                    ..Default::default()
                },
            ))
            .await
            .unwrap();

        assert_eq!(found, [middle, cheap]);
        assert!(!found.contains(&pricey));
    }
}
