//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{
    command,
    domain::{listing, user, user::Role},
    Command as _,
};

use crate::{api, define_error, AsError, Context, Error, Session};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";

    /// Signs in the [`Context`] with the provided created session.
    async fn sign_in(
        ctx: &Context,
        output: command::create_user_session::Output,
    ) -> api::user::session::CreateResult {
        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        output.into()
    }
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Registers a new `User` with the provided credentials and signs it in.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_LOGIN` - provided login is empty or too long;
    /// - `INVALID_PASSWORD` - provided password is empty or too long;
    /// - `DUPLICATE_LOGIN` - provided login is occupied by another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createUser",
            login = %login,
            otel.name = Self::SPAN_NAME,
            role = ?role,
        ),
    )]
    pub async fn create_user(
        login: String,
        password: String,
        role: api::user::Role,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let login = user::Login::new(login)
            .ok_or_else(|| api::ValidationError::Login.into())
            .map_err(ctx.error())?;
        let password = user::Password::new(password)
            .ok_or_else(|| api::ValidationError::Password.into())
            .map_err(ctx.error())?;

        let user = ctx
            .service()
            .execute(command::CreateUser {
                login,
                password: secrecy::SecretBox::init_with(move || password),
                role: role.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByUserId(user.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        Ok(Self::sign_in(ctx, output).await)
    }

    /// Creates a new `UserSession` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_CREDENTIALS` - provided credentials do not match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createUserSession",
            login = %login,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        login: String,
        password: String,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let login = user::Login::new(login);
        let password = user::Password::new(password);
        let (Some(login), Some(password)) = (login, password) else {
            return Err(CredentialsError::Invalid.into()).map_err(ctx.error());
        };

        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByCredentials {
                login,
                password: secrecy::SecretBox::init_with(move || password),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        Ok(Self::sign_in(ctx, output).await)
    }

    /// Deletes the `User` with the specified ID.
    ///
    /// `Listing`s of the deleted `User` are kept.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ROLE_REQUIRED` - the current `User` is not an admin;
    /// - `SELF_DELETION` - the current `User` tries to delete itself;
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist;
    /// - `PROTECTED_ROLE` - the specified `User` is an admin.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteUser",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteUser {
                requester: my_id.into(),
                target: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Puts a car up for sale on behalf of the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ROLE_REQUIRED` - the current `User` is not a seller;
    /// - `INVALID_MAKE` - provided make is blank;
    /// - `INVALID_MODEL` - provided model is blank;
    /// - `INVALID_YEAR` - provided year is out of the 1950-2024 range;
    /// - `INVALID_PRICE` - provided price is not a positive number.
    #[tracing::instrument(
        skip_all,
        fields(
            description = ?description,
            gql.name = "createListing",
            make = %make,
            model = %model,
            otel.name = Self::SPAN_NAME,
            price = %price,
            year = %year,
        ),
    )]
    pub async fn create_listing(
        make: String,
        model: String,
        year: i32,
        price: f64,
        description: Option<String>,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let me = ctx.current_user().await?;
        api::ensure_role(&me, &[Role::Seller], api::PrivilegeError::Seller)
            .map_err(ctx.error())?;

        let make = listing::Make::new(make)
            .ok_or_else(|| api::ValidationError::Make.into())
            .map_err(ctx.error())?;
        let model = listing::Model::new(model)
            .ok_or_else(|| api::ValidationError::Model.into())
            .map_err(ctx.error())?;
        let year = listing::Year::new(year)
            .ok_or_else(|| api::ValidationError::Year.into())
            .map_err(ctx.error())?;
        let price = listing::Price::new(price)
            .ok_or_else(|| api::ValidationError::Price.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateListing {
                make,
                model,
                year,
                price,
                description: description.and_then(listing::Description::new),
                seller_login: me.login,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Listing` with the specified ID, whether it's purchased or
    /// not.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist;
    /// - `FORBIDDEN` - the current `User` is neither the seller of the
    ///                 `Listing` nor an admin.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteListing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_listing(
        id: api::listing::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteListing {
                requester: my_id.into(),
                listing_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Purchases the `Listing` with the specified ID by the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ROLE_REQUIRED` - the current `User` is not a buyer;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist;
    /// - `ALREADY_OWNED_BY_BUYER` - the current `User` has already purchased
    ///                              the `Listing`;
    /// - `ALREADY_PURCHASED` - the `Listing` is purchased by another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "purchaseListing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn purchase_listing(
        id: api::listing::Id,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let me = ctx.current_user().await?;
        api::ensure_role(&me, &[Role::Buyer], api::PrivilegeError::Buyer)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::PurchaseListing {
                buyer_login: me.login,
                listing_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum CredentialsError {
        #[code = "INVALID_CREDENTIALS"]
        #[status = FORBIDDEN]
        #[message = "Provided credentials do not match any `User`"]
        Invalid,
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "DUPLICATE_LOGIN"]
                #[status = CONFLICT]
                #[message = "`UserLogin` is occupied by another `User`"]
                LoginOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::LoginOccupied(_) => Some(Error::LoginOccupied.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(CredentialsError::Invalid.into())
            }
        }
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PROTECTED_ROLE"]
                #[status = FORBIDDEN]
                #[message = "Admin `User`s cannot be deleted"]
                ProtectedRole,

                #[code = "SELF_DELETION"]
                #[status = CONFLICT]
                #[message = "`User` cannot delete itself"]
                SelfDeletion,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NotAdmin(_) => api::PrivilegeError::Admin.into(),
            Self::ProtectedRole(_) => Error::ProtectedRole.into(),
            Self::SelfDeletion => Error::SelfDeletion.into(),
            Self::UserNotExists(_) => api::query::UserError::NotExists.into(),
        })
    }
}

impl AsError for command::create_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::delete_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "FORBIDDEN"]
                #[status = FORBIDDEN]
                #[message = "Only the seller or an admin may delete the \
                             `Listing`"]
                Forbidden,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::Forbidden(_) => Error::Forbidden.into(),
            Self::ListingNotExists(_) => {
                api::query::ListingError::NotExists.into()
            }
            Self::UserNotExists(_) => api::query::UserError::NotExists.into(),
        })
    }
}

impl AsError for command::purchase_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ALREADY_OWNED_BY_BUYER"]
                #[status = CONFLICT]
                #[message = "`Listing` is already purchased by the current \
                             `User`"]
                AlreadyOwnedByBuyer,

                #[code = "ALREADY_PURCHASED"]
                #[status = CONFLICT]
                #[message = "`Listing` is already purchased by another `User`"]
                AlreadyPurchased,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::AlreadyOwnedByBuyer(_) => Error::AlreadyOwnedByBuyer.into(),
            Self::AlreadyPurchased(_) => Error::AlreadyPurchased.into(),
            Self::ListingNotExists(_) => {
                api::query::ListingError::NotExists.into()
            }
        })
    }
}
