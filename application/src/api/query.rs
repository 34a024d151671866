//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{domain::user::Role, query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        ctx.current_user().await.map(Into::into)
    }

    /// Returns all the `User`s ordered by their IDs.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ROLE_REQUIRED` - the current `User` is not an admin.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "users",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn users(ctx: &Context) -> Result<Vec<api::User>, Error> {
        let me = ctx.current_user().await?;
        api::ensure_role(&me, &[Role::Admin], api::PrivilegeError::Admin)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::users::List::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|users| users.into_iter().map(Into::into).collect())
    }

    /// Returns the `User` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist;
    /// - `ROLE_REQUIRED` - the current `User` is not an admin.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "user",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let me = ctx.current_user().await?;
        api::ensure_role(&me, &[Role::Admin], api::PrivilegeError::Admin)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::user::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Listing` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "listing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn listing(
        id: api::listing::Id,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        drop(ctx.current_session().await?);

        ctx.service()
            .execute(query::listing::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ListingError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns all the `Listing`s, both for sale and purchased, ordered by
    /// their IDs.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ROLE_REQUIRED` - the current `User` is neither an admin nor a
    ///                     seller.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "listings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn listings(ctx: &Context) -> Result<Vec<api::Listing>, Error> {
        let me = ctx.current_user().await?;
        api::ensure_role(
            &me,
            &[Role::Admin, Role::Seller],
            api::PrivilegeError::AdminOrSeller,
        )
        .map_err(ctx.error())?;

        ctx.service()
            .execute(query::listings::List::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ls| ls.into_iter().map(Into::into).collect())
    }

    /// Returns the `Listing`s created by the current `User`, ordered by their
    /// IDs.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ROLE_REQUIRED` - the current `User` is not a seller.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myListings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_listings(
        ctx: &Context,
    ) -> Result<Vec<api::Listing>, Error> {
        let me = ctx.current_user().await?;
        api::ensure_role(&me, &[Role::Seller], api::PrivilegeError::Seller)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::listings::BySeller::by(me.login))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ls| ls.into_iter().map(Into::into).collect())
    }

    /// Searches the `Listing`s being for sale.
    ///
    /// All the provided conditions must hold for a `Listing` to be found.
    /// `make` is matched as a case-insensitive fragment. Price bounds are
    /// inclusive.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "searchListings",
            make = ?make,
            max_price = ?max_price,
            min_price = ?min_price,
            otel.name = Self::SPAN_NAME,
            sort = ?sort,
        ),
    )]
    pub async fn search_listings(
        make: Option<String>,
        min_price: Option<f64>,
        max_price: Option<f64>,
        sort: Option<api::listing::Sort>,
        ctx: &Context,
    ) -> Result<Vec<api::Listing>, Error> {
        drop(ctx.current_session().await?);

        ctx.service()
            .execute(query::listings::Search::by(read::listing::search::Filter {
                make,
                min_price,
                max_price,
                sort: sort.unwrap_or_default().into(),
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ls| ls.into_iter().map(Into::into).collect())
    }
}

define_error! {
    enum ListingError {
        #[code = "LISTING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Listing` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
