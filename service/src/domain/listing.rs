//! [`Listing`] definitions.

use std::fmt;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// Car listed for sale on the marketplace.
#[derive(Clone, Debug, PartialEq)]
pub struct Listing {
    /// ID of this [`Listing`].
    pub id: Id,

    /// [`Make`] of the listed car.
    pub make: Make,

    /// [`Model`] of the listed car.
    pub model: Model,

    /// Manufacturing [`Year`] of the listed car.
    pub year: Year,

    /// [`Price`] of the listed car.
    pub price: Price,

    /// Free-text [`Description`] of the listed car, if any.
    pub description: Option<Description>,

    /// [`user::Login`] of the [`User`] who created this [`Listing`].
    ///
    /// Never changes after creation, and may outlive the [`User`] itself.
    pub seller_login: user::Login,

    /// [`Status`] of this [`Listing`].
    pub status: Status,

    /// [`DateTime`] when this [`Listing`] was created.
    ///
    /// [`None`] only for listings created before creation time was recorded.
    pub created_at: Option<CreationDateTime>,
}

impl Listing {
    /// Returns [`user::Login`] of the buyer of this [`Listing`], if it's
    /// [`Status::Purchased`].
    #[must_use]
    pub fn buyer_login(&self) -> Option<&user::Login> {
        match &self.status {
            Status::ForSale => None,
            Status::Purchased { buyer, .. } => Some(buyer),
        }
    }

    /// Indicates whether the provided [`User`] may delete this [`Listing`].
    #[must_use]
    pub fn is_deletable_by(&self, user: &user::User) -> bool {
        user.is_admin() || user.login == self.seller_login
    }
}

/// [`Listing`] which is not persisted yet, so has no [`Id`] assigned.
#[derive(Clone, Debug)]
pub struct New {
    /// [`Make`] of the listed car.
    pub make: Make,

    /// [`Model`] of the listed car.
    pub model: Model,

    /// Manufacturing [`Year`] of the listed car.
    pub year: Year,

    /// [`Price`] of the listed car.
    pub price: Price,

    /// Free-text [`Description`] of the listed car, if any.
    pub description: Option<Description>,

    /// [`user::Login`] of the seller.
    pub seller_login: user::Login,

    /// [`DateTime`] when the [`Listing`] is created.
    pub created_at: CreationDateTime,
}

/// Sale status of a [`Listing`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Status {
    /// [`Listing`] is available for purchase.
    ForSale,

    /// [`Listing`] is purchased.
    Purchased {
        /// [`user::Login`] of the buyer.
        buyer: user::Login,

        /// [`DateTime`] of the purchase.
        ///
        /// [`None`] only for purchases made before purchase time was
        /// recorded.
        purchased_at: Option<PurchaseDateTime>,
    },
}

impl Status {
    /// Returns the persisted tag of this [`Status`].
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::ForSale => "ForSale",
            Self::Purchased { .. } => "Purchased",
        }
    }
}

/// ID of a [`Listing`], assigned by a database.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type), sqlx(transparent))]
pub struct Id(i64);

/// Make of a listed car.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type), sqlx(transparent))]
pub struct Make(String);

impl Make {
    /// Creates a new [`Make`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `make` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(make: impl Into<String>) -> Self {
        Self(make.into())
    }

    /// Creates a new [`Make`] if the given `make` is valid.
    ///
    /// Surrounding whitespace of the given `make` is trimmed.
    #[must_use]
    pub fn new(make: impl Into<String>) -> Option<Self> {
        trim_name(make.into()).map(Self)
    }
}

impl FromStr for Make {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Make`")
    }
}

/// Model of a listed car.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type), sqlx(transparent))]
pub struct Model(String);

impl Model {
    /// Creates a new [`Model`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `model` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(model: impl Into<String>) -> Self {
        Self(model.into())
    }

    /// Creates a new [`Model`] if the given `model` is valid.
    ///
    /// Surrounding whitespace of the given `model` is trimmed.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Option<Self> {
        trim_name(model.into()).map(Self)
    }
}

impl FromStr for Model {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Model`")
    }
}

/// Trims the given `name` of a [`Make`] or a [`Model`], returning [`None`] if
/// nothing is left or it's too long.
fn trim_name(name: String) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 512 {
        return None;
    }
    Some(if trimmed.len() == name.len() {
        name
    } else {
        trimmed.to_owned()
    })
}

/// Manufacturing year of a listed car.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type), sqlx(transparent))]
pub struct Year(i32);

impl Year {
    /// Earliest accepted [`Year`].
    pub const MIN: i32 = 1950;

    /// Latest accepted [`Year`].
    pub const MAX: i32 = 2024;

    /// Creates a new [`Year`] if the given `year` is within
    /// [`Year::MIN`]`..=`[`Year::MAX`].
    #[must_use]
    pub fn new(year: i32) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&year).then_some(Self(year))
    }
}

impl FromStr for Year {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Year`")
    }
}

/// Price of a listed car.
#[derive(Clone, Copy, Debug, Into, PartialEq, PartialOrd)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type), sqlx(transparent))]
pub struct Price(f64);

impl Price {
    /// Creates a new [`Price`] if the given `amount` is positive and finite.
    #[must_use]
    pub fn new(amount: f64) -> Option<Self> {
        (amount.is_finite() && amount > 0.0).then_some(Self(amount))
    }

    /// Returns the amount of this [`Price`].
    #[must_use]
    pub const fn amount(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Price`")
    }
}

/// Free-text description of a listed car.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "sqlite", derive(sqlx::Type), sqlx(transparent))]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`], unless the given `text` is blank.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (!text.trim().is_empty()).then_some(Self(text))
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("blank `Description`")
    }
}

/// [`DateTime`] when a [`Listing`] was created.
pub type CreationDateTime = DateTimeOf<(Listing, unit::Creation)>;

/// [`DateTime`] when a [`Listing`] was purchased.
pub type PurchaseDateTime = DateTimeOf<(Listing, unit::Purchase)>;

#[cfg(test)]
mod spec {
    use super::{Description, Make, Model, Price, Year};

    #[test]
    fn year_bounds_are_inclusive() {
        assert!(Year::new(1950).is_some());
        assert!(Year::new(2024).is_some());
        assert!(Year::new(1949).is_none());
        assert!(Year::new(1800).is_none());
        assert!(Year::new(2025).is_none());
    }

    #[test]
    fn year_rejects_non_numeric_input() {
        assert_eq!("1999".parse::<Year>().unwrap(), Year::new(1999).unwrap());
        assert!("19x9".parse::<Year>().is_err());
        assert!("".parse::<Year>().is_err());
    }

    #[test]
    fn price_must_be_positive() {
        assert!(Price::new(0.01).is_some());
        assert!(Price::new(0.0).is_none());
        assert!(Price::new(-5.0).is_none());
        assert!(Price::new(f64::NAN).is_none());
        assert!(Price::new(f64::INFINITY).is_none());
    }

    #[test]
    fn price_rejects_non_numeric_input() {
        assert_eq!(" 150.5 ".parse::<Price>().unwrap().amount(), 150.5);
        assert!("cheap".parse::<Price>().is_err());
        assert!("0".parse::<Price>().is_err());
    }

    #[test]
    fn price_displays_two_decimals() {
        assert_eq!(Price::new(100.0).unwrap().to_string(), "100.00");
        assert_eq!(Price::new(0.5).unwrap().to_string(), "0.50");
    }

    #[test]
    fn make_is_required() {
        assert!(Make::new("Lada").is_some());
        assert!(Make::new("").is_none());
        assert!(Make::new(" \t ").is_none());
    }

    #[test]
    fn make_and_model_are_trimmed() {
        assert_eq!(Make::new(" Lada ").unwrap().to_string(), "Lada");
        assert_eq!(Model::new("Niva\n").unwrap().to_string(), "Niva");
    }

    #[test]
    fn blank_description_is_absent() {
        assert!(Description::new("").is_none());
        assert!(Description::new("  ").is_none());
        assert!(Description::new("Good condition").is_some());
    }
}
