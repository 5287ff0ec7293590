//! Core types for Blended.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod page;
pub mod phone;
pub mod rating;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use page::{PageError, PageInfo, PageRequest};
pub use phone::{Phone, PhoneError};
pub use rating::{Rate, RateError, RatingSummary};
pub use status::{InvalidVariant, OrderStatus, ProductCategory, UserRole};
