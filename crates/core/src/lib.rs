//! Pup Market Core - Shared types library.
//!
//! This crate provides common types used across the Pup Market components:
//! - `storefront` - Public listing API consumed by the browsing frontend
//! - `integration-tests` - End-to-end tests against a mocked record store
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Anything that parses an untrusted value from the record store and
//! has a well-defined fallback lives here so it can be tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Record ids, prices, emails, and registration statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
