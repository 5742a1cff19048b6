//! Newtype IDs and item identity derivation.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a ProductId where an ItemId is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size segment used when an item has no size.
pub const NO_SIZE: &str = "no-size";

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(ItemId);

/// Derive the cart identity of a (product, size) pair.
///
/// ```
/// use cart_engine::ids::{derive_id, ProductId};
/// let product = ProductId::new("tee-01");
/// assert_eq!(derive_id(&product, Some("M")).as_str(), "tee-01-M");
/// assert_eq!(derive_id(&product, None).as_str(), "tee-01-no-size");
/// ```
pub fn derive_id(product_id: &ProductId, size: Option<&str>) -> ItemId {
    ItemId(format!("{}-{}", product_id, size.unwrap_or(NO_SIZE)))
}
