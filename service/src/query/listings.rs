//! [`Query`] collection related to the multiple [`Listing`]s.

use common::operations::By;

use crate::{
    domain::{user, Listing},
    read,
};
#[cfg(doc)]
use crate::{
    domain::{listing, User},
    Query,
};

use super::DatabaseQuery;

/// Queries all the [`Listing`]s ordered by their [`listing::Id`]s.
pub type List = DatabaseQuery<By<Vec<Listing>, ()>>;

/// Queries [`Listing`]s created by the [`User`] with the provided
/// [`user::Login`], ordered by their [`listing::Id`]s.
pub type BySeller = DatabaseQuery<By<Vec<Listing>, user::Login>>;

/// Searches [`Listing`]s for sale matching the provided
/// [`read::listing::search::Filter`].
pub type Search =
    DatabaseQuery<By<Vec<Listing>, read::listing::search::Filter>>;
