//! GraphQL API definitions.

pub mod listing;
mod mutation;
mod query;
pub mod scalar;
pub mod user;

use juniper::EmptySubscription;
use service::domain::{user::Role, User as DomainUser};

use crate::{define_error, Context, Error};

pub use self::{
    listing::Listing, mutation::Mutation, query::Query, user::User,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

/// Checks whether the provided [`DomainUser`] has any of the provided
/// [`Role`]s.
///
/// # Errors
///
/// Errors with the provided [`PrivilegeError`] otherwise.
fn ensure_role(
    user: &DomainUser,
    roles: &[Role],
    err: PrivilegeError,
) -> Result<(), Error> {
    if roles.contains(&user.role) {
        Ok(())
    } else {
        Err(err.into())
    }
}

define_error! {
    enum PrivilegeError {
        #[code = "ROLE_REQUIRED"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be an admin"]
        Admin,

        #[code = "ROLE_REQUIRED"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be a seller"]
        Seller,

        #[code = "ROLE_REQUIRED"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be a buyer"]
        Buyer,

        #[code = "ROLE_REQUIRED"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` must be an admin or a seller"]
        AdminOrSeller,
    }
}

define_error! {
    enum ValidationError {
        #[code = "INVALID_LOGIN"]
        #[status = BAD_REQUEST]
        #[message = "`UserLogin` must be non-empty and at most 10 characters"]
        Login,

        #[code = "INVALID_PASSWORD"]
        #[status = BAD_REQUEST]
        #[message = "`UserPassword` must be non-empty and at most 8 \
                     characters"]
        Password,

        #[code = "INVALID_MAKE"]
        #[status = BAD_REQUEST]
        #[message = "`ListingMake` must not be blank"]
        Make,

        #[code = "INVALID_MODEL"]
        #[status = BAD_REQUEST]
        #[message = "`ListingModel` must not be blank"]
        Model,

        #[code = "INVALID_YEAR"]
        #[status = BAD_REQUEST]
        #[message = "Year must be between 1950 and 2024"]
        Year,

        #[code = "INVALID_PRICE"]
        #[status = BAD_REQUEST]
        #[message = "Price must be a positive number"]
        Price,
    }
}
