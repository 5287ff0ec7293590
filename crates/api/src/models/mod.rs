//! Domain models for the shop API.
//!
//! These are the validated types handlers and services work with; the row
//! types that mirror table layouts stay private to `crate::db`.

use rust_decimal::Decimal;

pub mod category;
pub mod feedback;
pub mod order;
pub mod product;
pub mod session;
pub mod subscription;
pub mod user;

pub use category::{Category, CategoryUpdate, NewCategory};
pub use feedback::{Feedback, FeedbackFilter, NewFeedback};
pub use order::{NewOrder, Order, OrderLine};
pub use product::{NewProduct, Product, ProductFilter, ProductUpdate};
pub use session::{CurrentUser, keys as session_keys};
pub use subscription::Subscription;
pub use user::{NewUser, ProfileUpdate, User};

/// Exclusive upper bound for money columns (`NUMERIC(12, 2)`).
const MAX_AMOUNT: i64 = 10_000_000_000;

/// Round a money amount to cents and check it fits its column.
pub(crate) fn bounded_amount(field: &str, value: Decimal) -> Result<Decimal, String> {
    let value = value.round_dp(2);
    if value >= Decimal::from(MAX_AMOUNT) {
        return Err(format!("'{field}' is too large"));
    }
    Ok(value)
}

/// Trim a required text field and check its minimum length in characters.
pub(crate) fn required_text(field: &str, value: &str, min_chars: usize) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.chars().count() < min_chars {
        return Err(if min_chars <= 1 {
            format!("'{field}' is required")
        } else {
            format!("'{field}' must be at least {min_chars} characters")
        });
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional text field, mapping blank input to `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
