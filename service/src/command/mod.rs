//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_listing;
pub mod create_user;
pub mod create_user_session;
pub mod delete_listing;
pub mod delete_user;
#[cfg(test)]
pub(crate) mod fixture;
pub mod purchase_listing;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_listing::CreateListing, create_user::CreateUser,
    create_user_session::CreateUserSession, delete_listing::DeleteListing,
    delete_user::DeleteUser, purchase_listing::PurchaseListing,
};
