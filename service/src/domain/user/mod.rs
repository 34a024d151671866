//! [`User`] definitions.

pub mod session;

use common::define_kind;
use derive_more::{AsRef, Display, From, FromStr, Into};
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};

pub use self::session::Session;

/// Marketplace user.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Login`] of this [`User`].
    pub login: Login,

    /// [`Password`] of this [`User`].
    pub password: Password,

    /// [`Role`] of this [`User`].
    pub role: Role,
}

impl User {
    /// Indicates whether this [`User`] is an [`Role::Admin`].
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// [`User`] which is not persisted yet, so has no [`Id`] assigned.
#[derive(Clone, Debug)]
pub struct New {
    /// [`Login`] of a new [`User`].
    pub login: Login,

    /// [`Password`] of a new [`User`].
    pub password: Password,

    /// [`Role`] of a new [`User`].
    pub role: Role,
}

/// ID of a [`User`], assigned by a database.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type), sqlx(transparent))]
pub struct Id(i64);

/// Login of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type), sqlx(transparent))]
pub struct Login(String);

impl Login {
    /// Maximum number of characters in a [`Login`].
    pub const MAX_LEN: usize = 10;

    /// Creates a new [`Login`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `login` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(login: impl Into<String>) -> Self {
        Self(login.into())
    }

    /// Creates a new [`Login`] if the given `login` is valid.
    #[must_use]
    pub fn new(login: impl Into<String>) -> Option<Self> {
        let login = login.into();
        Self::check(&login).then_some(Self(login))
    }

    /// Checks whether the given `login` is a valid [`Login`].
    fn check(login: impl AsRef<str>) -> bool {
        let login = login.as_ref();
        !login.is_empty() && login.chars().count() <= Self::MAX_LEN
    }
}

impl FromStr for Login {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Login`")
    }
}

/// Password of a [`User`].
///
/// Stored and compared verbatim.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type), sqlx(transparent))]
pub struct Password(String);

impl Password {
    /// Maximum number of characters in a [`Password`].
    pub const MAX_LEN: usize = 8;

    /// Creates a new [`Password`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `password` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        !password.is_empty() && password.chars().count() <= Self::MAX_LEN
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

define_kind! {
    #[doc = "Role of a [`User`] on the marketplace."]
    enum Role {
        #[doc = "Moderator of users and listings."]
        #[alias = "Админ"]
        Admin = 1,

        #[doc = "User listing cars for sale."]
        #[alias = "Продавец"]
        Seller = 2,

        #[doc = "User browsing and purchasing cars."]
        #[alias = "Покупатель"]
        Buyer = 3,
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use super::{Login, Password, Role};

    #[test]
    fn login_length_is_limited() {
        assert!(Login::new("u").is_some());
        assert!(Login::new("tenletters").is_some());
        assert!(Login::new("verylonglogin1").is_none());
        assert!(Login::new("").is_none());
    }

    #[test]
    fn login_length_counts_characters() {
        assert!(Login::new("продавец01").is_some());
        assert!(Login::new("покупатель1").is_none());
    }

    #[test]
    fn password_length_is_limited() {
        assert!(Password::new("pw").is_some());
        assert!(Password::new("12345678").is_some());
        assert!(Password::new("waytoolongpw").is_none());
        assert!(Password::new("").is_none());
    }

    #[test]
    fn role_has_textual_representation() {
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert_eq!(Role::Seller.to_string(), "SELLER");
        assert_eq!(Role::Buyer.to_string(), "BUYER");

        assert_eq!(Role::from_str("BUYER").unwrap(), Role::Buyer);
        assert!(Role::from_str("Покупатель").is_err());
    }

    #[test]
    fn role_recognizes_localized_labels() {
        assert_eq!(Role::from_alias("Админ"), Some(Role::Admin));
        assert_eq!(Role::from_alias("Продавец"), Some(Role::Seller));
        assert_eq!(Role::from_alias("Покупатель"), Some(Role::Buyer));
        assert_eq!(Role::from_alias("ADMIN"), None);
    }
}
