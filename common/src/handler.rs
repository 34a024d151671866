//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler.
///
/// Implemented by the service for its commands and queries, and by the
/// database for the operations it supports.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
