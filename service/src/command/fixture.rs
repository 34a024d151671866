//! Shared fixtures of [`Command`] tests.
//!
//! [`Command`]: super::Command

use secrecy::SecretBox;

use crate::{
    command::{CreateListing, CreateUser},
    domain::{listing, user, Listing, User},
    infra::Sqlite,
    Command as _, Service,
};

/// [`User`]s of every [`user::Role`].
pub(crate) struct Users {
    /// [`user::Role::Admin`] [`User`].
    pub(crate) admin: User,

    /// Another [`user::Role::Admin`] [`User`].
    pub(crate) other_admin: User,

    /// [`user::Role::Seller`] [`User`].
    pub(crate) seller: User,

    /// [`user::Role::Buyer`] [`User`].
    pub(crate) buyer: User,

    /// Another [`user::Role::Buyer`] [`User`].
    pub(crate) other_buyer: User,
}

impl Users {
    /// Registers [`Users`] in the provided [`Service`].
    pub(crate) async fn create(svc: &Service<Sqlite>) -> Self {
        Self {
            admin: create_user(svc, "admin", user::Role::Admin).await,
            other_admin: create_user(svc, "admin2", user::Role::Admin).await,
            seller: create_user(svc, "seller", user::Role::Seller).await,
            buyer: create_user(svc, "buyer", user::Role::Buyer).await,
            other_buyer: create_user(svc, "buyer2", user::Role::Buyer).await,
        }
    }
}

/// Registers a new [`User`] in the provided [`Service`].
pub(crate) async fn create_user(
    svc: &Service<Sqlite>,
    login: &str,
    role: user::Role,
) -> User {
    svc.execute(CreateUser {
        login: user::Login::new(login).unwrap(),
        password: SecretBox::new(Box::new(user::Password::new("pw").unwrap())),
        role,
    })
    .await
    .unwrap()
}

/// Creates a new [`Listing`] of the provided seller in the provided
/// [`Service`].
pub(crate) async fn create_listing(
    svc: &Service<Sqlite>,
    seller: &User,
    price: f64,
) -> Listing {
    svc.execute(CreateListing {
        make: listing::Make::new("Lada").unwrap(),
        model: listing::Model::new("Niva").unwrap(),
        year: listing::Year::new(1990).unwrap(),
        price: listing::Price::new(price).unwrap(),
        description: None,
        seller_login: seller.login.clone(),
    })
    .await
    .unwrap()
}
