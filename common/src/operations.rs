//! Abstract storage operations.
//!
//! Each operation is a plain value handed to a [`Handler`], so a storage
//! declares the exact set of operations it supports via its [`Handler`]
//! impls.

use std::marker::PhantomData;

use crate::Handler;

/// Operation persisting a new entity.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Operation overwriting an already persisted entity.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Operation removing a persisted entity.
#[derive(Clone, Copy, Debug)]
pub struct Delete<T>(pub T);

/// Operation reading persisted entities.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Operation opening a transaction.
///
/// Writes are executed over the [`Transacted`] handler returned by it.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Handler of the operations inside a [`Transact`]ion started by `T`.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Operation committing a [`Transact`]ion.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selector of a `W`hat by a `B`y key.
///
/// `W` determines the shape of the result, so the same key may select
/// different things: e.g. a single optional entity or a list of them.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the selected value.
    _what: PhantomData<W>,

    /// Key to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector with the provided key.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Returns the key of this [`By`] selector.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
