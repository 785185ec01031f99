//! Newtype IDs for type-safe record references.
//!
//! Record ids come from the hosted record store and are opaque strings
//! (e.g. `recXXXXXXXXXXXXXX`). Use the `define_record_id!` macro to create
//! wrappers that prevent accidentally looking up a shop with a puppy id.

/// Macro to define a type-safe record ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Borrow<str>` (so maps keyed by the id
///   can be queried with a plain `&str`)
///
/// # Example
///
/// ```rust
/// # use pup_market_core::define_record_id;
/// define_record_id!(KennelId);
/// define_record_id!(LitterId);
///
/// let kennel = KennelId::new("rec123");
/// let litter = LitterId::new("rec123");
/// assert_eq!(kennel.as_str(), litter.as_str());
///
/// // These are different types, so this won't compile:
/// // let _: KennelId = litter;
/// ```
#[macro_export]
macro_rules! define_record_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl ::core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Record ids for the tables this service reads and writes
define_record_id!(PuppyId);
define_record_id!(ShopId);
define_record_id!(RegistrationId);
