//! Status values for registration inquiries.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a pet-shop registration inquiry.
///
/// Inquiries are always created as [`RegistrationStatus::New`]; later stages
/// are managed by staff directly in the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RegistrationStatus {
    #[default]
    New,
}

impl RegistrationStatus {
    /// The single-select option label used in the record store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
