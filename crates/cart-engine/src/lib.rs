//! Shopping cart and order pricing engine.
//!
//! This crate owns the client-side purchase state of a storefront:
//!
//! - **Cart**: cart and saved-for-later lists with merge-on-add identity
//! - **Discounts**: a static catalog of promotional codes
//! - **Pricing**: subtotal, shipping, tax, discount and total derivation
//! - **Persistence**: best-effort durable snapshots behind a key-value store
//!
//! # Example
//!
//! ```rust,ignore
//! use cart_engine::prelude::*;
//!
//! let gateway = PersistenceGateway::new(FileStore::open(".cart"));
//! let mut cart = CartManager::open(gateway).await;
//!
//! let tee = ProductDescriptor::new("tee-01", "Logo Tee", Money::from_decimal(25.0));
//! cart.add_item(&tee, Some("M"), 2);
//! cart.apply_discount_code("WELCOME10");
//!
//! let summary = cart.summary();
//! println!("Total: {}", summary.total.display());
//! ```

pub mod config;
pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod discount;
pub mod manager;
pub mod persistence;
pub mod pricing;

pub use error::{CartError, OperationResult};
pub use ids::*;
pub use manager::CartManager;
pub use money::Money;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CartError, OperationResult};
    pub use crate::ids::*;
    pub use crate::manager::CartManager;
    pub use crate::money::Money;

    // Cart
    pub use crate::cart::{
        CartItem, CartStore, ProductDescriptor, SavedItem, StoreState, MAX_QUANTITY_PER_ITEM,
    };

    // Discounts & pricing
    pub use crate::discount::{
        AppliedDiscount, DiscountCatalog, DiscountRule, DiscountType, DiscountValue,
    };
    pub use crate::pricing::{OrderSummary, PricingPolicy};

    // Persistence & config
    pub use crate::config::{EngineConfig, LogFormat};
    pub use crate::persistence::{FileStore, KeyValueStore, MemoryStore, PersistenceGateway};
}
