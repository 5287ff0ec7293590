//! Blended Core - Shared domain types.
//!
//! This crate provides the types used across all Blended components:
//! - `api` - The public JSON REST API
//! - `cli` - Command-line tools for migrations and admin management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. The rating aggregation arithmetic and the order status set
//! live here so they can be tested without a running database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, phones, statuses, ratings and pages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
