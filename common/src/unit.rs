//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity purchase.
#[derive(Clone, Copy, Debug)]
pub struct Purchase;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
