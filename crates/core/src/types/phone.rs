//! Ukrainian mobile phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone cannot be empty")]
    Empty,
    /// The input does not match `+380XXXXXXXXX`.
    #[error("phone must be in format +380XXXXXXXXX")]
    InvalidFormat,
}

/// A phone number in the `+380XXXXXXXXX` format.
///
/// Phones are unique per user and are how orders are matched to accounts, so
/// the stored form is always exactly the country prefix followed by nine
/// digits.
///
/// ```
/// use blended_core::Phone;
///
/// assert!(Phone::parse("+380501234567").is_ok());
/// assert!(Phone::parse("0501234567").is_err());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Country prefix every phone must start with.
    pub const PREFIX: &'static str = "+380";

    /// Number of digits after the prefix.
    pub const SUBSCRIBER_DIGITS: usize = 9;

    /// Parse a `Phone`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `PhoneError::Empty` for blank input and
    /// `PhoneError::InvalidFormat` for anything other than `+380` followed by
    /// nine ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        let digits = s.strip_prefix(Self::PREFIX).ok_or(PhoneError::InvalidFormat)?;
        if digits.len() != Self::SUBSCRIBER_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::InvalidFormat);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Phone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Phone {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Phone {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Phone {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let phone = Phone::parse(" +380671112233 ").unwrap();
        assert_eq!(phone.as_str(), "+380671112233");
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Phone::parse(""), Err(PhoneError::Empty));
        assert_eq!(Phone::parse("380671112233"), Err(PhoneError::InvalidFormat));
        assert_eq!(Phone::parse("+38067111223"), Err(PhoneError::InvalidFormat));
        assert_eq!(Phone::parse("+3806711122334"), Err(PhoneError::InvalidFormat));
        assert_eq!(Phone::parse("+38067111223a"), Err(PhoneError::InvalidFormat));
        assert_eq!(Phone::parse("+14155550100"), Err(PhoneError::InvalidFormat));
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        assert!(serde_json::from_str::<Phone>("\"+380501234567\"").is_ok());
        assert!(serde_json::from_str::<Phone>("\"555-0100\"").is_err());
    }
}
