//! Feedback rates and the per-product aggregate derived from them.
//!
//! A product caches `averageRate` and `feedbackCount`. Whenever a feedback row
//! is created or deleted the API reloads the product's remaining rates and
//! rebuilds the cache with [`RatingSummary::from_rates`].

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Error returned for a rate outside `1..=5`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rate must be an integer between {min} and {max}, got {value}", min = Rate::MIN, max = Rate::MAX)]
pub struct RateError {
    /// The rejected value.
    pub value: i64,
}

/// A single feedback score, an integer from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rate(i16);

impl Rate {
    /// Lowest accepted score.
    pub const MIN: i16 = 1;
    /// Highest accepted score.
    pub const MAX: i16 = 5;

    /// Create a rate, checking the range.
    ///
    /// # Errors
    ///
    /// Returns `RateError` when `value` is outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, RateError> {
        i16::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RateError { value })
    }

    /// Get the underlying score.
    #[must_use]
    pub const fn get(self) -> i16 {
        self.0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Rate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Rate {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i16 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i16 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Rate {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i16 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(i64::from(raw))?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Rate {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i16 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// Cached aggregate rating of one product.
///
/// `average` is the arithmetic mean of the rates rounded half away from zero
/// to one decimal and carried with two decimal places (`4.5` is stored and
/// serialized as `"4.50"`). With no feedback both fields are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct RatingSummary {
    /// Rounded mean rate.
    #[serde(rename = "averageRate")]
    pub average: Decimal,
    /// Number of feedback entries the mean was taken over.
    #[serde(rename = "feedbackCount")]
    pub count: i32,
}

impl RatingSummary {
    /// Decimal places kept by the rounding step.
    pub const ROUND_DP: u32 = 1;
    /// Decimal places used when presenting and storing the average.
    pub const DISPLAY_DP: u32 = 2;

    /// Build the aggregate for a product from all of its remaining rates.
    ///
    /// ```
    /// use blended_core::{Rate, RatingSummary};
    ///
    /// let rates = [5, 4, 3].map(|r| Rate::new(r).unwrap());
    /// let summary = RatingSummary::from_rates(rates);
    /// assert_eq!(summary.count, 3);
    /// assert_eq!(summary.average.to_string(), "4.00");
    ///
    /// assert_eq!(RatingSummary::from_rates(Vec::<Rate>::new()), RatingSummary::default());
    /// ```
    #[must_use]
    pub fn from_rates<I>(rates: I) -> Self
    where
        I: IntoIterator<Item = Rate>,
    {
        let (sum, count) = rates
            .into_iter()
            .fold((0_i64, 0_i32), |(sum, count), rate| {
                (sum + i64::from(rate.get()), count.saturating_add(1))
            });

        if count == 0 {
            return Self::default();
        }

        let mean = Decimal::from(sum) / Decimal::from(count);
        let mut average =
            mean.round_dp_with_strategy(Self::ROUND_DP, RoundingStrategy::MidpointAwayFromZero);
        average.rescale(Self::DISPLAY_DP);

        Self { average, count }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rates(values: &[i64]) -> Vec<Rate> {
        values.iter().map(|&v| Rate::new(v).unwrap()).collect()
    }

    #[test]
    fn test_rate_range() {
        assert!(Rate::new(1).is_ok());
        assert!(Rate::new(5).is_ok());
        assert_eq!(Rate::new(0), Err(RateError { value: 0 }));
        assert_eq!(Rate::new(6), Err(RateError { value: 6 }));
        assert!(Rate::new(i64::from(i16::MAX) + 1).is_err());
    }

    #[test]
    fn test_rate_deserialize() {
        let rate: Rate = serde_json::from_str("4").unwrap();
        assert_eq!(rate.get(), 4);
        assert!(serde_json::from_str::<Rate>("9").is_err());
        assert!(serde_json::from_str::<Rate>("4.5").is_err());
    }

    #[test]
    fn test_summary_of_nothing_is_zero() {
        let summary = RatingSummary::from_rates(Vec::new());
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average, Decimal::ZERO);
    }

    #[test]
    fn test_summary_then_delete_one() {
        let summary = RatingSummary::from_rates(rates(&[5, 4, 3]));
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, Decimal::new(40, 1));

        let summary = RatingSummary::from_rates(rates(&[5, 4]));
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average, Decimal::new(45, 1));
        assert_eq!(summary.average.to_string(), "4.50");
    }

    #[test]
    fn test_summary_rounds_to_one_decimal() {
        // 13 / 3 = 4.333.. -> 4.3
        assert_eq!(
            RatingSummary::from_rates(rates(&[5, 4, 4])).average.to_string(),
            "4.30"
        );
        // 14 / 3 = 4.666.. -> 4.7
        assert_eq!(
            RatingSummary::from_rates(rates(&[5, 5, 4])).average.to_string(),
            "4.70"
        );
        // 17 / 4 = 4.25 -> 4.3 (half away from zero)
        assert_eq!(
            RatingSummary::from_rates(rates(&[5, 4, 4, 4])).average.to_string(),
            "4.30"
        );
    }

    #[test]
    fn test_summary_matches_mean_for_all_short_sequences() {
        // Every sequence of length 1..=3 over 1..=5
        let mut sequences: Vec<Vec<i64>> = (1..=5).map(|a| vec![a]).collect();
        for _ in 0..2 {
            let longer: Vec<Vec<i64>> = sequences
                .iter()
                .flat_map(|seq| {
                    (1..=5).map(move |r| {
                        let mut next = seq.clone();
                        next.push(r);
                        next
                    })
                })
                .collect();
            sequences.extend(longer);
        }

        for seq in sequences {
            let summary = RatingSummary::from_rates(rates(&seq));
            let sum: i64 = seq.iter().sum();
            let len = i64::try_from(seq.len()).unwrap();
            // Round half up on tenths using integer arithmetic
            let expected_tenths = (sum * 100 / len + 5) / 10;
            assert_eq!(summary.average, Decimal::new(expected_tenths, 1), "{seq:?}");
            assert_eq!(i64::from(summary.count), len);
        }
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = RatingSummary::from_rates(rates(&[5, 4]));
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["averageRate"], "4.50");
        assert_eq!(json["feedbackCount"], 2);
    }
}
