//! [`User`]-related definitions.

use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;

use crate::{
    api::{self, scalar},
    Context,
};

/// A [`User`] of the marketplace.
#[derive(Clone, Debug, From, Into)]
pub struct User(domain::User);

/// A `User` of the marketplace.
#[graphql_object(context = Context)]
impl User {
    /// Unique identifier of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Login of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.login",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn login(&self) -> Login {
        self.0.login.clone().into()
    }

    /// Role of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.role",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn role(&self) -> Role {
        self.0.role.into()
    }
}

/// Unique identifier of a `User`.
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
#[graphql(name = "UserId", with = scalar::Via::<domain::user::Id>)]
pub struct Id(domain::user::Id);

/// Login of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserLogin",
    with = scalar::Via::<domain::user::Login>,
)]
pub struct Login(domain::user::Login);

/// Role of a `User`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "UserRole")]
pub enum Role {
    /// Moderator of `User`s and `Listing`s.
    Admin,

    /// `User` putting cars up for sale.
    Seller,

    /// `User` purchasing cars.
    Buyer,
}

impl From<domain::user::Role> for Role {
    fn from(role: domain::user::Role) -> Self {
        use domain::user::Role as R;
        match role {
            R::Admin => Self::Admin,
            R::Seller => Self::Seller,
            R::Buyer => Self::Buyer,
        }
    }
}

impl From<Role> for domain::user::Role {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => Self::Admin,
            Role::Seller => Self::Seller,
            Role::Buyer => Self::Buyer,
        }
    }
}

pub mod session {
    //! [`Session`]-related definitions.
    //!
    //! [`Session`]: crate::Session

    use common::DateTime;
    use derive_more::{AsRef, From, Into};
    use juniper::{GraphQLObject, GraphQLScalar};
    use service::{command, domain};

    use crate::{
        api::{self, scalar},
        Context,
    };

    /// `Session` access token.
    #[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
    #[graphql(
        name = "UserAuthToken",
        with = scalar::Via::<domain::user::session::Token>,
    )]
    pub struct Token(domain::user::session::Token);

    /// Result of a `Session` creation.
    #[derive(Clone, Debug, From, GraphQLObject)]
    #[graphql(context = Context, name = "CreateSessionResult")]
    pub struct CreateResult {
        /// Access token of the created `Session`.
        ///
        /// Must be passed as a bearer token in the `Authorization` header of
        /// the subsequent requests.
        pub token: Token,

        /// `User` associated with the created `Session`.
        pub user: api::User,

        /// `DateTime` when the created `Session` expires.
        pub expires_at: DateTime,
    }

    impl From<command::create_user_session::Output> for CreateResult {
        fn from(output: command::create_user_session::Output) -> Self {
            let command::create_user_session::Output {
                token,
                user,
                expires_at,
            } = output;
            Self {
                token: token.into(),
                user: user.into(),
                expires_at: expires_at.coerce(),
            }
        }
    }
}
