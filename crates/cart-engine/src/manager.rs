//! Public cart API.
//!
//! [`CartManager`] composes the store, the discount catalog and the pricing
//! policy. Mutations return [`OperationResult`]; errors never escape as `Err`.

use crate::cart::{CartItem, CartStore, ProductDescriptor, SavedItem};
use crate::config::EngineConfig;
use crate::discount::{AppliedDiscount, DiscountCatalog};
use crate::error::{CartError, OperationResult};
use crate::ids::{ItemId, ProductId};
use crate::persistence::{FileStore, PersistenceGateway};
use crate::pricing::{OrderSummary, PricingPolicy};

/// The cart operations consumed by a storefront UI.
///
/// Created once at startup; lives until process exit.
#[derive(Debug)]
pub struct CartManager {
    store: CartStore,
    catalog: DiscountCatalog,
    pricing: PricingPolicy,
}

impl CartManager {
    /// Create a manager in the loading state with default pricing and codes.
    pub fn new(gateway: PersistenceGateway) -> Self {
        Self::with_parts(CartStore::new(gateway), DiscountCatalog::standard(), PricingPolicy::default())
    }

    /// Create a manager from explicit parts.
    pub fn with_parts(store: CartStore, catalog: DiscountCatalog, pricing: PricingPolicy) -> Self {
        Self {
            store,
            catalog,
            pricing,
        }
    }

    /// Create and load a manager with default pricing and codes.
    pub async fn open(gateway: PersistenceGateway) -> Self {
        let mut manager = Self::new(gateway);
        manager.load().await;
        manager
    }

    /// Create and load a manager backed by the file store described in `config`.
    pub async fn from_config(config: &EngineConfig) -> Self {
        let gateway = PersistenceGateway::new(FileStore::open(&config.storage.dir));
        let store = CartStore::open(gateway).await;
        Self::with_parts(store, config.discount_catalog(), config.pricing)
    }

    /// Load persisted state.
    pub async fn load(&mut self) {
        self.store.load().await;
    }

    /// Wait for scheduled saves to finish.
    pub async fn flush(&mut self) {
        self.store.flush().await;
    }

    /// Whether persisted state is still being read.
    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    /// Add a product in the given size.
    pub fn add_item(
        &mut self,
        product: &ProductDescriptor,
        size: Option<&str>,
        quantity: u32,
    ) -> OperationResult {
        let result = self.store.add_item(product, size, quantity);
        log_outcome("add_item", &result);
        result.into()
    }

    /// Remove an item. Removing an absent item succeeds.
    pub fn remove_item(&mut self, id: &ItemId) -> OperationResult {
        self.store.remove_item(id).into()
    }

    /// Set an item's quantity; zero or less removes it.
    pub fn set_quantity(&mut self, id: &ItemId, quantity: i64) -> OperationResult {
        let result = self.store.set_quantity(id, quantity);
        log_outcome("set_quantity", &result);
        result.into()
    }

    /// Move a cart item to the saved list.
    pub fn move_to_saved(&mut self, id: &ItemId) -> OperationResult {
        let result = self.store.move_to_saved(id);
        log_outcome("move_to_saved", &result);
        result.into()
    }

    /// Move a saved item back to the cart.
    pub fn move_to_cart(&mut self, id: &ItemId) -> OperationResult {
        let result = self.store.move_to_cart(id);
        log_outcome("move_to_cart", &result);
        result.into()
    }

    /// Empty the cart and remove any discount.
    pub fn clear_cart(&mut self) -> OperationResult {
        self.store.clear_cart();
        OperationResult::ok("Cart cleared")
    }

    /// Empty the saved list.
    pub fn clear_saved_items(&mut self) -> OperationResult {
        self.store.clear_saved_items();
        OperationResult::ok("Saved items cleared")
    }

    /// Apply a discount code against the current subtotal.
    ///
    /// On failure the previously applied discount, if any, is kept.
    pub fn apply_discount_code(&mut self, code: &str) -> OperationResult {
        let subtotal = self.summary().subtotal;
        let result = self.catalog.apply(code, subtotal).map(|discount| {
            let message = format!("{} applied: {}", discount.code, discount.description);
            self.store.set_applied_discount(discount);
            message
        });
        log_outcome("apply_discount_code", &result);
        result.into()
    }

    /// Remove the applied discount.
    pub fn remove_discount_code(&mut self) -> OperationResult {
        self.store.clear_applied_discount();
        OperationResult::ok("Discount removed")
    }

    /// Derive the current order summary.
    pub fn summary(&self) -> OrderSummary {
        self.pricing
            .summarize(self.store.cart_items(), self.store.applied_discount())
    }

    /// Items in the cart.
    pub fn cart_items(&self) -> &[CartItem] {
        self.store.cart_items()
    }

    /// Items saved for later.
    pub fn saved_items(&self) -> &[SavedItem] {
        self.store.saved_items()
    }

    /// The applied discount, if any.
    pub fn applied_discount(&self) -> Option<&AppliedDiscount> {
        self.store.applied_discount()
    }

    /// Applied discount code, or an empty string.
    pub fn discount_code(&self) -> &str {
        self.store.discount_code()
    }

    /// Whether the (product, size) pair is in the cart.
    pub fn is_in_cart(&self, product_id: &ProductId, size: Option<&str>) -> bool {
        self.store.is_in_cart(product_id, size)
    }

    /// Quantity of the (product, size) pair in the cart.
    pub fn quantity_in_cart(&self, product_id: &ProductId, size: Option<&str>) -> u32 {
        self.store.quantity_in_cart(product_id, size)
    }

    /// Whether the (product, size) pair is saved for later.
    pub fn is_saved(&self, product_id: &ProductId, size: Option<&str>) -> bool {
        self.store.is_saved(product_id, size)
    }

    /// Number of distinct items in the cart.
    pub fn unique_item_count(&self) -> usize {
        self.store.cart_items().len()
    }

    /// Number of saved items.
    pub fn saved_count(&self) -> usize {
        self.store.saved_items().len()
    }

    /// The discount catalog in use.
    pub fn catalog(&self) -> &DiscountCatalog {
        &self.catalog
    }
}

fn log_outcome(operation: &str, result: &Result<String, CartError>) {
    match result {
        Ok(message) => tracing::debug!(operation, "{message}"),
        Err(e) => tracing::info!(operation, error = %e, "Cart operation rejected"),
    }
}
