//! [`Query`] collection related to a single [`User`].

use common::operations::By;

use crate::domain::{user, User};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`User`] by its [`user::Id`].
///
/// Resolves to [`None`] once the [`User`] is deleted, so a still valid session
/// of a deleted [`User`] may be detected.
pub type ById = DatabaseQuery<By<Option<User>, user::Id>>;
