//! GraphQL scalar definitions.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Helper type to use in `#[graphql(with = ..)]` attribute.
///
/// Represents the target type as a GraphQL string scalar by the
/// [`FromStr`]/[`Display`] impls of the wrapped domain `As` type, so domain
/// validation applies to the GraphQL input as well. Numeric IDs are
/// represented as strings this way too.
///
/// Target type must implement [`TryFrom`] and [`AsRef`] for `As` type.
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Convert the target type into scalar [`Value`] by using [`Display`] impl
    /// of `As` type.
    ///
    /// [`Display`]: fmt::Display
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::from(value.as_ref().to_string())
    }

    /// Constructs the target type from scalar [`Value`] by using [`FromStr`]
    /// impl of `As` type.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the input value is not a string;
    /// - the input value cannot be parsed into `As` type;
    /// - the parsed value cannot be converted into the target type.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr + fmt::Display,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let s = input.as_string_value().ok_or_else(|| {
            format!(
                "Cannot parse input scalar `{}`: expected string input \
                 value, found: {input}",
                T::name(&()).expect("always has a name"),
            )
        })?;
        s.parse::<As>()
            .map_err(|e| {
                format!(
                    "Cannot parse input scalar `{}` from \"{s}\" string: {e}",
                    T::name(&()).expect("always has a name"),
                )
            })?
            .try_into()
            .map_err(|e| {
                format!(
                    "Cannot parse input scalar `{}`: {e}",
                    T::name(&()).expect("always has a name"),
                )
            })
    }

    /// Parse the provided [`ScalarToken`].
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be parsed as [`String`].
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, InputValue, Value};
    use service::domain;

    use crate::api::{listing, user};

    use super::Via;

    type Input = InputValue<DefaultScalarValue>;

    #[test]
    fn parses_valid_input() {
        let input = Input::scalar("seller".to_owned());

        let login =
            Via::<domain::user::Login>::from_input::<user::Login, _>(&input)
                .unwrap();

        assert_eq!(login.to_string(), "seller");
    }

    #[test]
    fn rejects_input_violating_domain_rules() {
        let input = Input::scalar("much-too-long-login".to_owned());

        let err =
            Via::<domain::user::Login>::from_input::<user::Login, _>(&input)
                .unwrap_err();

        assert!(err.contains("UserLogin"), "unexpected error: {err}");
    }

    #[test]
    fn rejects_non_string_input() {
        let input = Input::scalar(42);

        let res =
            Via::<domain::listing::Id>::from_input::<listing::Id, _>(&input);

        assert!(res.is_err());
    }

    #[test]
    fn outputs_ids_as_strings() {
        let id = listing::Id::from(domain::listing::Id::from(5));

        let out = Via::<domain::listing::Id>::to_output::<_, DefaultScalarValue>(
            &id,
        );

        assert_eq!(out, Value::scalar("5".to_owned()));
    }
}
