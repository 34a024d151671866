//! [`Query`] collection related to the multiple [`User`]s.

use common::operations::By;

use crate::domain::User;
#[cfg(doc)]
use crate::{domain::user, Query};

use super::DatabaseQuery;

/// Queries all the [`User`]s ordered by their [`user::Id`]s.
pub type List = DatabaseQuery<By<Vec<User>, ()>>;
