//! [`Listing`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use sqlx::Row as _;
use tracerr::Traced;

use crate::{
    domain::{listing, user, Listing},
    infra::{
        database::{
            self,
            sqlite::{self, connection::Row, Connection},
            Sqlite,
        },
        Database,
    },
    read::listing::search,
};

/// Columns of the `cars` table forming a [`Listing`].
macro_rules! columns {
    () => {
        "id, make, model, year, price, description, seller_login, \
         buyer_login, date_added, purchase_date"
    };
}

/// Builds a [`Listing`] out of the provided [`Row`].
///
/// [`listing::Status`] is derived from the presence of a buyer, so rows with
/// any legacy `status` text are still readable.
fn from_row(row: &Row) -> Result<Listing, Traced<database::Error>> {
    let build = || -> Result<_, sqlx::Error> {
        let status = match row.try_get::<Option<user::Login>, _>("buyer_login")? {
            None => listing::Status::ForSale,
            Some(buyer) => listing::Status::Purchased {
                buyer,
                purchased_at: row.try_get("purchase_date")?,
            },
        };
        Ok(Listing {
            id: row.try_get("id")?,
            make: row.try_get("make")?,
            model: row.try_get("model")?,
            year: row.try_get("year")?,
            price: row.try_get("price")?,
            description: row
                .try_get::<Option<String>, _>("description")?
                .and_then(listing::Description::new),
            seller_login: row.try_get("seller_login")?,
            status,
            created_at: row.try_get("date_added")?,
        })
    };
    build()
        .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
        .map_err(tracerr::map_from)
}

/// Returns SQL `ORDER BY` expression of the provided [`search::Sort`].
const fn order_by(sort: search::Sort) -> &'static str {
    match sort {
        search::Sort::None => "id ASC",
        search::Sort::PriceAsc => "price ASC, id ASC",
        search::Sort::PriceDesc => "price DESC, id ASC",
    }
}

impl<C> Database<Select<By<Option<Listing>, listing::Id>>> for Sqlite<C>
where
    C: Connection,
{
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = concat!(
            "SELECT ",
            columns!(),
            " FROM cars \
              WHERE id = ?1",
        );
        self.query_opt(sqlx::query(SQL).bind(id))
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row)
            .transpose()
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Listing>, ()>>> for Sqlite<C>
where
    C: Connection,
{
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Listing>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = concat!(
            "SELECT ",
            columns!(),
            " FROM cars \
              ORDER BY id ASC",
        );
        self.query(sqlx::query(SQL))
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect::<Result<_, _>>()
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Listing>, user::Login>>> for Sqlite<C>
where
    C: Connection,
{
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Listing>, user::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let seller = by.into_inner();

        const SQL: &str = concat!(
            "SELECT ",
            columns!(),
            " FROM cars \
              WHERE seller_login = ?1 \
              ORDER BY id ASC",
        );
        self.query(sqlx::query(SQL).bind(seller))
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect::<Result<_, _>>()
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Listing>, search::Filter>>> for Sqlite<C>
where
    C: Connection,
{
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Listing>, search::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let search::Filter {
            make,
            min_price,
            max_price,
            sort,
        } = by.into_inner();

        let make = make.filter(|m| !m.is_empty()).map(|m| m.to_lowercase());

        let sql = format!(
            concat!(
                "SELECT ",
                columns!(),
                " FROM cars \
                  WHERE buyer_login IS NULL \
                    AND (?1 IS NULL OR price >= ?1) \
                    AND (?2 IS NULL OR price <= ?2) \
                  ORDER BY {order}",
            ),
            order = order_by(sort),
        );
        let rows = self
            .query(sqlx::query(&sql).bind(min_price).bind(max_price))
            .await
            .map_err(tracerr::wrap!())?;

        // `LIKE` folds the case of ASCII letters only.
        rows.iter()
            .map(from_row)
            .filter(|res| match (res, &make) {
                (Ok(l), Some(fragment)) => contains_folded(&l.make, fragment),
                (Ok(_) | Err(_), _) => true,
            })
            .collect::<Result<_, _>>()
            .map_err(tracerr::wrap!())
    }
}

/// Checks whether the provided [`listing::Make`] contains the provided
/// lower-cased `fragment`, ignoring the case of any letters.
fn contains_folded(make: &listing::Make, fragment: &str) -> bool {
    AsRef::<str>::as_ref(make).to_lowercase().contains(fragment)
}

impl<C> Database<Insert<listing::New>> for Sqlite<C>
where
    C: Connection,
{
    type Ok = Listing;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<listing::New>,
    ) -> Result<Self::Ok, Self::Err> {
        let listing::New {
            make,
            model,
            year,
            price,
            description,
            seller_login,
            created_at,
        } = listing;
        let status = listing::Status::ForSale;

        const SQL: &str = "\
            INSERT INTO cars (\
                make, model, year, price, description, \
                seller_login, status, date_added\
            ) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
            RETURNING id";
        let row = self
            .query_one(
                sqlx::query(SQL)
                    .bind(make.clone())
                    .bind(model.clone())
                    .bind(year)
                    .bind(price)
                    .bind(description.clone())
                    .bind(seller_login.clone())
                    .bind(status.tag())
                    .bind(created_at),
            )
            .await
            .map_err(tracerr::wrap!())?;
        let id = row
            .try_get("id")
            .map_err(tracerr::from_and_wrap!(=> sqlite::Error))
            .map_err(tracerr::map_from)?;

        Ok(Listing {
            id,
            make,
            model,
            year,
            price,
            description,
            seller_login,
            status,
            created_at: Some(created_at),
        })
    }
}

impl<C> Database<Update<Listing>> for Sqlite<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        let (buyer, purchased_at) = match &listing.status {
            listing::Status::ForSale => (None, None),
            listing::Status::Purchased {
                buyer,
                purchased_at,
            } => (Some(buyer.clone()), *purchased_at),
        };

        // `seller_login` and `date_added` are never changed once created.
        const SQL: &str = "\
            UPDATE cars \
            SET make = ?2, model = ?3, year = ?4, price = ?5, \
                description = ?6, status = ?7, \
                buyer_login = ?8, purchase_date = ?9 \
            WHERE id = ?1";
        self.exec(
            sqlx::query(SQL)
                .bind(listing.id)
                .bind(listing.make)
                .bind(listing.model)
                .bind(listing.year)
                .bind(listing.price)
                .bind(listing.description)
                .bind(listing.status.tag())
                .bind(buyer)
                .bind(purchased_at),
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Listing, listing::Id>>> for Sqlite<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM cars \
            WHERE id = ?1";
        self.exec(sqlx::query(SQL).bind(id))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Insert, Select, Update};

    use crate::{
        domain::{listing, user, Listing},
        infra::{
            database::{sqlite::Connection as _, Sqlite},
            Database as _,
        },
        read::listing::search,
    };

    async fn db() -> Sqlite {
        let db = Sqlite::in_memory().unwrap();
        db.ensure_schema().await.unwrap();
        db
    }

    fn login(login: &str) -> user::Login {
        user::Login::new(login).unwrap()
    }

    async fn insert(db: &Sqlite, make: &str, price: f64) -> Listing {
        db.execute(Insert(listing::New {
            make: listing::Make::new(make).unwrap(),
            model: listing::Model::new("Model").unwrap(),
            year: listing::Year::new(2000).unwrap(),
            price: listing::Price::new(price).unwrap(),
            description: listing::Description::new("Fine"),
            seller_login: login("seller"),
            created_at: listing::CreationDateTime::now(),
        }))
        .await
        .unwrap()
    }

    async fn search_prices(db: &Sqlite, filter: search::Filter) -> Vec<f64> {
        db.execute(Select(By::<Vec<Listing>, _>::new(filter)))
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.price.amount())
            .collect()
    }

    #[tokio::test]
    async fn inserts_and_selects() {
        let db = db().await;

        let inserted = insert(&db, "Lada", 100.0).await;
        let selected = db
            .execute(Select(By::<Option<Listing>, _>::new(inserted.id)))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(selected, inserted);
        assert_eq!(selected.status, listing::Status::ForSale);
        assert!(selected.created_at.is_some());
    }

    #[tokio::test]
    async fn updates_purchase_status() {
        let db = db().await;
        let mut car = insert(&db, "Lada", 100.0).await;

        car.status = listing::Status::Purchased {
            buyer: login("buyer"),
            purchased_at: Some(listing::PurchaseDateTime::now()),
        };
        db.execute(Update(car.clone())).await.unwrap();

        let selected = db
            .execute(Select(By::<Option<Listing>, _>::new(car.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(selected, car);
        assert_eq!(selected.seller_login, login("seller"));
    }

    #[tokio::test]
    async fn reads_legacy_rows() {
        let db = db().await;
        db.batch_exec(
            "INSERT INTO cars (make, model, year, price, seller_login) \
             VALUES ('Lada', 'Niva', 1990, 1500.0, 'seller'); \
             INSERT INTO cars (\
                 make, model, year, price, description, \
                 seller_login, status, buyer_login\
             ) \
             VALUES ('Volga', 'GAZ-24', 1980, 900.0, '', \
                     'seller', 'Куплено', 'buyer');",
        )
        .await
        .unwrap();

        let all = db
            .execute(Select(By::<Vec<Listing>, _>::new(())))
            .await
            .unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(all[0].status, listing::Status::ForSale);
        assert_eq!(all[0].created_at, None);
        assert_eq!(
            all[1].status,
            listing::Status::Purchased {
                buyer: login("buyer"),
                purchased_at: None,
            },
        );
        assert_eq!(all[1].description, None);
    }

    #[tokio::test]
    async fn selects_by_seller() {
        let db = db().await;
        _ = insert(&db, "Lada", 100.0).await;
        _ = db
            .execute(Insert(listing::New {
                make: listing::Make::new("Volga").unwrap(),
                model: listing::Model::new("GAZ-24").unwrap(),
                year: listing::Year::new(1980).unwrap(),
                price: listing::Price::new(900.0).unwrap(),
                description: None,
                seller_login: login("other"),
                created_at: listing::CreationDateTime::now(),
            }))
            .await
            .unwrap();

        let own = db
            .execute(Select(By::<Vec<Listing>, _>::new(login("seller"))))
            .await
            .unwrap();

        assert_eq!(own.len(), 1);
        assert_eq!(own[0].make.to_string(), "Lada");
    }

    #[tokio::test]
    async fn searches_sorted_by_price() {
        let db = db().await;
        for price in [100.0, 50.0, 75.0] {
            _ = insert(&db, "Lada", price).await;
        }

        let asc = search_prices(
            &db,
            search::Filter {
                sort: search::Sort::PriceAsc,
                ..search::Filter::default()
            },
        )
        .await;
        assert_eq!(asc, [50.0, 75.0, 100.0]);

        let desc = search_prices(
            &db,
            search::Filter {
                sort: search::Sort::PriceDesc,
                ..search::Filter::default()
            },
        )
        .await;
        assert_eq!(desc, [100.0, 75.0, 50.0]);

        let unsorted = search_prices(&db, search::Filter::default()).await;
        assert_eq!(unsorted, [100.0, 50.0, 75.0]);
    }

    #[tokio::test]
    async fn searches_ties_by_id() {
        let db = db().await;
        let first = insert(&db, "Lada", 100.0).await;
        let second = insert(&db, "Volga", 100.0).await;

        for sort in [search::Sort::PriceAsc, search::Sort::PriceDesc] {
            let found = db
                .execute(Select(By::<Vec<Listing>, _>::new(search::Filter {
                    sort,
                    ..search::Filter::default()
                })))
                .await
                .unwrap();
            let ids = found.iter().map(|l| l.id).collect::<Vec<_>>();
            assert_eq!(ids, [first.id, second.id]);
        }
    }

    #[tokio::test]
    async fn searches_by_filters_conjunctively() {
        let db = db().await;
        _ = insert(&db, "Toyota", 100.0).await;
        _ = insert(&db, "Lada", 50.0).await;
        _ = insert(&db, "toyota", 300.0).await;

        let found = search_prices(
            &db,
            search::Filter {
                make: Some("TOY".into()),
                min_price: Some(100.0),
                max_price: Some(200.0),
                sort: search::Sort::None,
            },
        )
        .await;
        assert_eq!(found, [100.0]);

        let any_make = search_prices(
            &db,
            search::Filter {
                make: Some(String::new()),
                max_price: Some(100.0),
                ..search::Filter::default()
            },
        )
        .await;
        assert_eq!(any_make, [100.0, 50.0]);

        let none = search_prices(
            &db,
            search::Filter {
                min_price: Some(1000.0),
                ..search::Filter::default()
            },
        )
        .await;
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn searches_make_literally() {
        let db = db().await;
        _ = insert(&db, "Lada", 100.0).await;
        _ = insert(&db, "La_da", 200.0).await;
        _ = insert(&db, "100%Auto", 300.0).await;

        let underscore = search_prices(
            &db,
            search::Filter {
                make: Some("a_d".into()),
                ..search::Filter::default()
            },
        )
        .await;
        assert_eq!(underscore, [200.0]);

        let percent = search_prices(
            &db,
            search::Filter {
                make: Some("%".into()),
                ..search::Filter::default()
            },
        )
        .await;
        assert_eq!(percent, [300.0]);
    }

    #[tokio::test]
    async fn searches_make_ignoring_unicode_case() {
        let db = db().await;
        _ = insert(&db, "Лада", 100.0).await;
        _ = insert(&db, "Волга", 200.0).await;
        _ = insert(&db, "ЗИЛ-Lada", 300.0).await;

        let found = search_prices(
            &db,
            search::Filter {
                make: Some("лада".into()),
                ..search::Filter::default()
            },
        )
        .await;
        assert_eq!(found, [100.0]);

        let mixed = search_prices(
            &db,
            search::Filter {
                make: Some("зил-LADA".into()),
                ..search::Filter::default()
            },
        )
        .await;
        assert_eq!(mixed, [300.0]);
    }

    #[tokio::test]
    async fn searches_only_for_sale() {
        let db = db().await;
        let mut sold = insert(&db, "Lada", 100.0).await;
        _ = insert(&db, "Lada", 200.0).await;
        sold.status = listing::Status::Purchased {
            buyer: login("buyer"),
            purchased_at: Some(listing::PurchaseDateTime::now()),
        };
        db.execute(Update(sold)).await.unwrap();

        let found = search_prices(&db, search::Filter::default()).await;

        assert_eq!(found, [200.0]);
    }
}
