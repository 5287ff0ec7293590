//! Closed value sets: order status, user role and product category.
//!
//! Each enum maps to a `PostgreSQL` enum type in the `shop` schema when the
//! `postgres` feature is enabled, and parses from its wire spelling via
//! `FromStr` so handlers can report an invalid value as a 400 instead of a
//! generic deserialization failure.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a member of one of the fixed sets.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} '{value}', expected one of: {allowed}")]
pub struct InvalidVariant {
    /// Which set was being parsed (e.g. "order status").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// Comma-separated list of accepted spellings.
    pub allowed: String,
}

impl InvalidVariant {
    fn new(kind: &'static str, value: &str, allowed: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_owned(),
            allowed: allowed.join(", "),
        }
    }
}

/// Order status.
///
/// A flat set: any status may follow any other, there is no transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.order_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every allowed status, in display order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire spelling of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = InvalidVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                let allowed = Self::ALL.map(Self::as_str);
                InvalidVariant::new("order status", s, &allowed)
            })
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.user_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular shopper.
    #[default]
    User,
    /// May manage categories, feedback, order statuses and other users' products.
    Admin,
}

impl UserRole {
    /// Whether this role grants admin access.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

impl FromStr for UserRole {
    type Err = InvalidVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(InvalidVariant::new("role", s, &["user", "admin"])),
        }
    }
}

/// Product category, shared by products and the feedback left on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "shop.product_category"))]
pub enum ProductCategory {
    Books,
    Electronics,
    Clothing,
    #[default]
    Other,
}

impl ProductCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 4] = [Self::Books, Self::Electronics, Self::Clothing, Self::Other];

    /// Wire spelling of this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Books => "Books",
            Self::Electronics => "Electronics",
            Self::Clothing => "Clothing",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = InvalidVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| {
                let allowed = Self::ALL.map(Self::as_str);
                InvalidVariant::new("category", s, &allowed)
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_parses_every_member() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_order_status_rejects_outsiders() {
        let err = "refunded".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.value, "refunded");
        assert!(err.to_string().contains("pending, processing, shipped, delivered, cancelled"));

        // Case matters on the wire
        assert!("Pending".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_serde_matches_as_str() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_user_role() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("superuser".parse::<UserRole>().is_err());
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::default().is_admin());
        assert_eq!(UserRole::User.to_string(), "user");
    }

    #[test]
    fn test_product_category() {
        assert_eq!(
            "Electronics".parse::<ProductCategory>().unwrap(),
            ProductCategory::Electronics
        );
        assert!("Toys".parse::<ProductCategory>().is_err());
        assert_eq!(ProductCategory::default(), ProductCategory::Other);
        assert_eq!(
            serde_json::to_string(&ProductCategory::Clothing).unwrap(),
            "\"Clothing\""
        );
    }
}
