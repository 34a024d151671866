//! [`Listing`] read model definition.
//!
//! [`Listing`]: crate::domain::Listing

pub mod search {
    //! [`Listing`]s search definitions.

    #[cfg(doc)]
    use crate::domain::{listing, Listing};

    /// Filter of [`Listing`]s being [`listing::Status::ForSale`].
    ///
    /// All the specified conditions must hold for a [`Listing`] to match.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// Fragment of a [`listing::Make`] to search for.
        ///
        /// Matched literally and case-insensitively. Empty fragment matches
        /// any [`listing::Make`].
        pub make: Option<String>,

        /// Inclusive lower bound of a [`listing::Price`].
        pub min_price: Option<f64>,

        /// Inclusive upper bound of a [`listing::Price`].
        pub max_price: Option<f64>,

        /// [`Sort`] order of the found [`Listing`]s.
        pub sort: Sort,
    }

    /// Sort order of the found [`Listing`]s.
    ///
    /// [`Listing`]s with equal [`listing::Price`]s are always ordered by
    /// their [`listing::Id`]s ascending.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub enum Sort {
        /// By [`listing::Id`]s ascending.
        #[default]
        None,

        /// By [`listing::Price`]s ascending.
        PriceAsc,

        /// By [`listing::Price`]s descending.
        PriceDesc,
    }
}
