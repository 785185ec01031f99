//! Business logic services for storefront.
//!
//! # Services
//!
//! - `registrations` - Pet shop registration inquiries (validate, then write
//!   to the record store)

pub mod registrations;

pub use registrations::{RegistrationError, RegistrationForm, RegistrationInquiry};
