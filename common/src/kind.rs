//! Macros for defining kind enums.

/// Macro for defining a kind enum.
///
/// Variants are represented as `SCREAMING_SNAKE_CASE` strings both in
/// [`Display`]/[`FromStr`] and in a database column. A variant may declare
/// `#[alias = ".."]` strings, additionally accepted when read from a database
/// column.
///
/// # Example
///
/// ```rust,ignore
/// use common::define_kind;
///
/// define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube"]
///         Cube = 1,
///
///         #[doc = "A sphere"]
///         #[alias = "ball"]
///         Sphere = 2,
///     }
/// }
///
/// assert_eq!(Kind::Cube.to_string(), "CUBE");
/// assert_eq!(Kind::from_alias("ball"), Some(Kind::Sphere));
/// ```
///
/// [`Display`]: std::fmt::Display
/// [`FromStr`]: std::str::FromStr
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $(#[alias = $alias:literal])*
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            Eq,
            Hash,
            PartialEq,
        )]
        #[cfg_attr(
            feature = "serde",
            derive(
                $crate::private::serde::Deserialize,
                $crate::private::serde::Serialize,
            ),
            serde(rename_all = "SCREAMING_SNAKE_CASE"),
        )]
        #[doc = $doc]
        #[repr(u8)]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant = $value,
            )*
        }

        impl $name {
            /// Converts this into its [`u8`] representation.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }

            /// Parses this kind from one of its legacy aliases, if any.
            #[must_use]
            pub fn from_alias(alias: &str) -> Option<Self> {
                match alias {
                    $($($alias => Some(Self::$variant),)*)*
                    _ => None,
                }
            }
        }

        #[cfg(feature = "sqlite")]
        impl $crate::private::sqlx::Type<$crate::private::sqlx::Sqlite>
            for $name
        {
            fn type_info() -> $crate::private::sqlx::sqlite::SqliteTypeInfo {
                <str as $crate::private::sqlx::Type<
                    $crate::private::sqlx::Sqlite,
                >>::type_info()
            }

            fn compatible(
                ty: &$crate::private::sqlx::sqlite::SqliteTypeInfo,
            ) -> bool {
                <str as $crate::private::sqlx::Type<
                    $crate::private::sqlx::Sqlite,
                >>::compatible(ty)
            }
        }

        #[cfg(feature = "sqlite")]
        impl<'q> $crate::private::sqlx::Encode<'q, $crate::private::sqlx::Sqlite>
            for $name
        {
            fn encode_by_ref(
                &self,
                buf: &mut <$crate::private::sqlx::Sqlite
                    as $crate::private::sqlx::Database>::ArgumentBuffer<'q>,
            ) -> Result<
                $crate::private::sqlx::encode::IsNull,
                $crate::private::sqlx::error::BoxDynError,
            > {
                <::std::string::String as $crate::private::sqlx::Encode<
                    'q,
                    $crate::private::sqlx::Sqlite,
                >>::encode(::std::string::ToString::to_string(self), buf)
            }
        }

        #[cfg(feature = "sqlite")]
        impl<'r> $crate::private::sqlx::Decode<'r, $crate::private::sqlx::Sqlite>
            for $name
        {
            fn decode(
                value: $crate::private::sqlx::sqlite::SqliteValueRef<'r>,
            ) -> Result<Self, $crate::private::sqlx::error::BoxDynError> {
                let s = <&str as $crate::private::sqlx::Decode<
                    'r,
                    $crate::private::sqlx::Sqlite,
                >>::decode(value)?;
                s.parse::<Self>()
                    .or_else(|e| Self::from_alias(s).ok_or(e))
                    .map_err(|e| {
                        ::std::format!(
                            "invalid `{}` value `{s}`: {e}",
                            ::core::stringify!($name),
                        )
                        .into()
                    })
            }
        }
    };
}
