//! Shopping cart module.
//!
//! Contains the item types and the store that owns the cart and saved lists.

mod item;
mod store;

pub use item::{CartItem, ProductDescriptor, SavedItem, MAX_QUANTITY_PER_ITEM};
pub use store::{CartStore, StoreState};
