//! [`Listing`]-related definitions.

use common::{DateTime, DateTimeOf};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;

use crate::{
    api::{self, scalar},
    Context,
};

/// A car [`Listing`].
#[derive(Clone, Debug, From, Into)]
pub struct Listing(domain::Listing);

/// A car put up for sale.
#[graphql_object(context = Context)]
impl Listing {
    /// Unique identifier of this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Make of the listed car.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.make",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn make(&self) -> Make {
        self.0.make.clone().into()
    }

    /// Model of the listed car.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.model",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn model(&self) -> Model {
        self.0.model.clone().into()
    }

    /// Manufacturing year of the listed car.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.year",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn year(&self) -> i32 {
        self.0.year.into()
    }

    /// Price of the listed car.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.price",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn price(&self) -> f64 {
        self.0.price.amount()
    }

    /// Price of the listed car, formatted with two decimals.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.priceLabel",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn price_label(&self) -> String {
        self.0.price.to_string()
    }

    /// Description of the listed car, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.description",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn description(&self) -> Option<Description> {
        self.0.description.clone().map(Into::into)
    }

    /// Login of the `User` selling the car.
    ///
    /// Kept even after the `User` is deleted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.sellerLogin",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn seller_login(&self) -> api::user::Login {
        self.0.seller_login.clone().into()
    }

    /// Sale status of this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn status(&self) -> Status {
        (&self.0.status).into()
    }

    /// Human-readable sale status of this `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.statusLabel",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn status_label(&self) -> String {
        status_label(&self.0.status)
    }

    /// Login of the `User` who purchased the car, if it's purchased.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.buyerLogin",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn buyer_login(&self) -> Option<api::user::Login> {
        self.0.buyer_login().cloned().map(Into::into)
    }

    /// `DateTime` when the car was purchased, if known.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.purchasedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn purchased_at(&self) -> Option<DateTime> {
        match &self.0.status {
            domain::listing::Status::ForSale => None,
            domain::listing::Status::Purchased { purchased_at, .. } => {
                purchased_at.map(DateTimeOf::coerce)
            }
        }
    }

    /// `DateTime` when this `Listing` was created, if known.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Listing.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> Option<DateTime> {
        self.0.created_at.map(DateTimeOf::coerce)
    }
}

/// Renders the provided [`domain::listing::Status`] for displaying.
fn status_label(status: &domain::listing::Status) -> String {
    match status {
        domain::listing::Status::ForSale => "For sale".to_owned(),
        domain::listing::Status::Purchased {
            buyer,
            purchased_at: Some(at),
        } => format!("Purchased by {buyer} at {}", at.to_storage()),
        domain::listing::Status::Purchased {
            buyer,
            purchased_at: None,
        } => format!("Purchased by {buyer}"),
    }
}

/// Unique identifier of a `Listing`.
#[derive(
    AsRef,
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    GraphQLScalar,
    Into,
    PartialEq,
)]
#[graphql(name = "ListingId", with = scalar::Via::<domain::listing::Id>)]
pub struct Id(domain::listing::Id);

/// Make of a listed car.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingMake",
    with = scalar::Via::<domain::listing::Make>,
)]
pub struct Make(domain::listing::Make);

/// Model of a listed car.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingModel",
    with = scalar::Via::<domain::listing::Model>,
)]
pub struct Model(domain::listing::Model);

/// Description of a listed car.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingDescription",
    with = scalar::Via::<domain::listing::Description>,
)]
pub struct Description(domain::listing::Description);

/// Sale status of a `Listing`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ListingStatus")]
pub enum Status {
    /// The car is available for purchase.
    ForSale,

    /// The car is purchased.
    Purchased,
}

impl From<&domain::listing::Status> for Status {
    fn from(status: &domain::listing::Status) -> Self {
        use domain::listing::Status as S;
        match status {
            S::ForSale => Self::ForSale,
            S::Purchased { .. } => Self::Purchased,
        }
    }
}

/// Sort order of the found `Listing`s.
#[derive(Clone, Copy, Debug, Default, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ListingSort")]
pub enum Sort {
    /// No particular order, the oldest `Listing`s first.
    #[default]
    None,

    /// The cheapest `Listing`s first.
    PriceAsc,

    /// The most expensive `Listing`s first.
    PriceDesc,
}

impl From<Sort> for service::read::listing::search::Sort {
    fn from(sort: Sort) -> Self {
        match sort {
            Sort::None => Self::None,
            Sort::PriceAsc => Self::PriceAsc,
            Sort::PriceDesc => Self::PriceDesc,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use service::domain::{listing::Status, user::Login};

    use super::status_label;

    #[test]
    fn labels_listing_for_sale() {
        assert_eq!(status_label(&Status::ForSale), "For sale");
    }

    #[test]
    fn labels_purchased_listing() {
        let buyer = Login::new("buyer").unwrap();

        let with_time = Status::Purchased {
            buyer: buyer.clone(),
            purchased_at: DateTime::from_unix_timestamp(1_700_000_000)
                .map(DateTime::coerce),
        };
        let legacy = Status::Purchased {
            buyer,
            purchased_at: None,
        };

        assert_eq!(
            status_label(&with_time),
            "Purchased by buyer at 14.11.2023 22:13:20",
        );
        assert_eq!(status_label(&legacy), "Purchased by buyer");
    }
}
