//! Canonical in-memory cart and saved-items lists.

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::cart::{CartItem, ProductDescriptor, SavedItem, MAX_QUANTITY_PER_ITEM};
use crate::discount::AppliedDiscount;
use crate::error::CartError;
use crate::ids::{derive_id, ItemId, ProductId};
use crate::persistence::{PersistenceGateway, Snapshot};

/// Lifecycle of a [`CartStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Persisted state has not been read yet; nothing is written.
    Loading,
    /// Persisted state is loaded; every mutation is saved.
    Ready,
}

/// Owns the cart, the saved items and the applied discount.
///
/// Mutations change memory synchronously and then schedule a save of the
/// full snapshot without waiting for it. While the store is still
/// [`StoreState::Loading`] no save is scheduled, so an empty in-memory state
/// can never overwrite what is on disk.
pub struct CartStore {
    state: StoreState,
    items: Vec<CartItem>,
    saved: Vec<SavedItem>,
    applied_discount: Option<AppliedDiscount>,
    gateway: PersistenceGateway,
    runtime: Option<Handle>,
    version: u64,
    pending: Vec<JoinHandle<()>>,
}

impl CartStore {
    /// Create a store in the loading state.
    pub fn new(gateway: PersistenceGateway) -> Self {
        Self {
            state: StoreState::Loading,
            items: Vec::new(),
            saved: Vec::new(),
            applied_discount: None,
            gateway,
            runtime: None,
            version: 0,
            pending: Vec::new(),
        }
    }

    /// Create a store and load persisted state.
    pub async fn open(gateway: PersistenceGateway) -> Self {
        let mut store = Self::new(gateway);
        store.load().await;
        store
    }

    /// Load persisted items and become ready.
    ///
    /// Items added while loading are merged on top of the persisted ones.
    pub async fn load(&mut self) {
        if self.state == StoreState::Ready {
            return;
        }

        let persisted_cart = self.gateway.load_cart().await;
        let persisted_saved = self.gateway.load_saved().await;

        let early_cart = std::mem::take(&mut self.items);
        let early_saved = std::mem::take(&mut self.saved);
        let merged_early = !early_cart.is_empty() || !early_saved.is_empty();

        for item in persisted_cart.into_iter().chain(early_cart) {
            self.merge_item(item);
        }
        for mut saved in persisted_saved.into_iter().chain(early_saved) {
            rederive_id(&mut saved.item);
            if saved.item.quantity == 0 || self.contains(saved.id()) {
                continue;
            }
            self.saved.retain(|s| s.id() != saved.id());
            self.saved.push(saved);
        }

        self.runtime = Handle::try_current().ok();
        self.state = StoreState::Ready;
        tracing::info!(
            cart_items = self.items.len(),
            saved_items = self.saved.len(),
            "Cart loaded"
        );

        if merged_early {
            self.persist();
        }
    }

    /// Merge a loaded item, capping the combined quantity.
    fn merge_item(&mut self, mut item: CartItem) {
        if item.quantity == 0 {
            return;
        }
        rederive_id(&mut item);
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing
                .quantity
                .saturating_add(item.quantity)
                .min(MAX_QUANTITY_PER_ITEM);
        } else {
            item.quantity = item.quantity.min(MAX_QUANTITY_PER_ITEM);
            self.items.push(item);
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StoreState {
        self.state
    }

    /// Whether persisted state is still being read.
    pub fn is_loading(&self) -> bool {
        self.state == StoreState::Loading
    }

    /// Schedule a save of the full current snapshot.
    fn persist(&mut self) {
        if self.is_loading() {
            tracing::debug!("Cart still loading, not persisting");
            return;
        }
        let Some(runtime) = self.runtime.as_ref() else {
            tracing::warn!("No async runtime available, cart changes will not be persisted");
            return;
        };

        self.version += 1;
        let snapshot = Snapshot {
            version: self.version,
            cart: self.items.clone(),
            saved: self.saved.clone(),
        };
        self.pending.retain(|handle| !handle.is_finished());
        self.pending.push(self.gateway.spawn_save(runtime, snapshot));
    }

    /// Wait for every scheduled save to finish.
    pub async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!("Cart save task did not complete: {e}");
            }
        }
    }

    /// Add a product to the cart, merging with an existing line for the same size.
    pub fn add_item(
        &mut self,
        product: &ProductDescriptor,
        size: Option<&str>,
        quantity: u32,
    ) -> Result<String, CartError> {
        let product_id = product
            .product_id()
            .cloned()
            .ok_or(CartError::InvalidProduct)?;
        if !product.in_stock {
            return Err(CartError::OutOfStock(product.name.clone()));
        }
        if quantity == 0 {
            return Err(CartError::QuantityOutOfRange {
                requested: 0,
                max: MAX_QUANTITY_PER_ITEM,
            });
        }

        let id = derive_id(&product_id, size);
        let position = self.items.iter().position(|i| i.id == id);
        let message = if let Some(existing) = position.map(|p| &mut self.items[p]) {
            let requested = existing.quantity.saturating_add(quantity);
            existing.quantity = requested.min(MAX_QUANTITY_PER_ITEM);
            if requested > MAX_QUANTITY_PER_ITEM {
                tracing::debug!(item = %id, requested, "Capped merged quantity");
                format!(
                    "{} quantity capped at {}",
                    existing.name, MAX_QUANTITY_PER_ITEM
                )
            } else {
                format!("Updated {} quantity to {}", existing.name, existing.quantity)
            }
        } else {
            let item = CartItem::from_product(
                product_id,
                product,
                size,
                quantity.min(MAX_QUANTITY_PER_ITEM),
            );
            let message = format!("Added {} to cart", item.name);
            self.items.push(item);
            message
        };

        // An id lives in exactly one list.
        self.saved.retain(|s| s.id() != &id);
        self.persist();
        Ok(message)
    }

    /// Remove an item. Removing an absent id succeeds.
    pub fn remove_item(&mut self, id: &ItemId) -> Result<String, CartError> {
        let len_before = self.items.len();
        self.items.retain(|i| &i.id != id);
        if self.items.len() < len_before {
            self.persist();
        }
        Ok("Item removed from cart".to_string())
    }

    /// Set an item's quantity. Zero or less removes it.
    pub fn set_quantity(&mut self, id: &ItemId, quantity: i64) -> Result<String, CartError> {
        if quantity <= 0 {
            return self.remove_item(id);
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= MAX_QUANTITY_PER_ITEM)
            .ok_or(CartError::QuantityOutOfRange {
                requested: quantity,
                max: MAX_QUANTITY_PER_ITEM,
            })?;

        let item = self
            .items
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or_else(|| CartError::ItemNotFound(id.to_string()))?;
        item.quantity = quantity;
        self.persist();
        Ok("Quantity updated".to_string())
    }

    /// Move a cart item to the saved list.
    pub fn move_to_saved(&mut self, id: &ItemId) -> Result<String, CartError> {
        let position = self
            .items
            .iter()
            .position(|i| &i.id == id)
            .ok_or_else(|| CartError::ItemNotFound(id.to_string()))?;

        let item = self.items.remove(position);
        let message = format!("Saved {} for later", item.name);
        self.saved.retain(|s| s.id() != id);
        self.saved.push(SavedItem::from_cart_item(item));
        self.persist();
        Ok(message)
    }

    /// Move a saved item back into the cart with its size and quantity.
    ///
    /// Goes through [`CartStore::add_item`], so stock is re-checked and the
    /// saved item stays put if the add fails.
    pub fn move_to_cart(&mut self, id: &ItemId) -> Result<String, CartError> {
        let saved = self
            .saved
            .iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| CartError::ItemNotFound(id.to_string()))?;

        let product = saved.item.to_descriptor();
        let size = saved.item.size.clone();
        let quantity = saved.item.quantity;

        self.add_item(&product, size.as_deref(), quantity)?;
        Ok(format!("Moved {} to cart", product.name))
    }

    /// Empty the cart and drop the applied discount.
    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.applied_discount = None;
        self.persist();
    }

    /// Empty the saved list.
    pub fn clear_saved_items(&mut self) {
        self.saved.clear();
        self.persist();
    }

    /// Replace the applied discount.
    pub fn set_applied_discount(&mut self, discount: AppliedDiscount) {
        self.applied_discount = Some(discount);
    }

    /// Drop the applied discount.
    pub fn clear_applied_discount(&mut self) {
        self.applied_discount = None;
    }

    /// Items in the cart.
    pub fn cart_items(&self) -> &[CartItem] {
        &self.items
    }

    /// Items saved for later.
    pub fn saved_items(&self) -> &[SavedItem] {
        &self.saved
    }

    /// Look up a cart item.
    pub fn get_item(&self, id: &ItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// The applied discount, if any.
    pub fn applied_discount(&self) -> Option<&AppliedDiscount> {
        self.applied_discount.as_ref()
    }

    /// Applied discount code, or an empty string.
    pub fn discount_code(&self) -> &str {
        self.applied_discount
            .as_ref()
            .map(|d| d.code.as_str())
            .unwrap_or("")
    }

    fn contains(&self, id: &ItemId) -> bool {
        self.items.iter().any(|i| &i.id == id)
    }

    /// Whether the (product, size) pair is in the cart.
    pub fn is_in_cart(&self, product_id: &ProductId, size: Option<&str>) -> bool {
        self.contains(&derive_id(product_id, size))
    }

    /// Quantity of the (product, size) pair in the cart, zero if absent.
    pub fn quantity_in_cart(&self, product_id: &ProductId, size: Option<&str>) -> u32 {
        self.get_item(&derive_id(product_id, size))
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    /// Whether the (product, size) pair is saved for later.
    pub fn is_saved(&self, product_id: &ProductId, size: Option<&str>) -> bool {
        let id = derive_id(product_id, size);
        self.saved.iter().any(|s| s.id() == &id)
    }
}

/// Stored ids are not trusted; identity always follows product and size.
fn rederive_id(item: &mut CartItem) {
    let id = derive_id(&item.product_id, item.size.as_deref());
    if item.id != id {
        tracing::debug!(stored = %item.id, derived = %id, "Re-derived persisted item id");
        item.id = id;
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .field("items", &self.items.len())
            .field("saved", &self.saved.len())
            .field("discount_code", &self.discount_code())
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::persistence::{KeyValueStore, MemoryStore, CART_KEY, SAVED_ITEMS_KEY};

    fn hoodie() -> ProductDescriptor {
        ProductDescriptor::new("hoodie", "Hoodie", Money::new(4_500))
    }

    async fn ready_store() -> (CartStore, MemoryStore) {
        let backend = MemoryStore::new();
        let store = CartStore::open(PersistenceGateway::new(backend.clone())).await;
        (store, backend)
    }

    #[tokio::test]
    async fn test_add_same_item_merges_quantity() {
        let (mut store, _) = ready_store().await;
        store.add_item(&hoodie(), Some("M"), 2).unwrap();
        store.add_item(&hoodie(), Some("M"), 3).unwrap();

        assert_eq!(store.cart_items().len(), 1);
        assert_eq!(store.quantity_in_cart(&ProductId::new("hoodie"), Some("M")), 5);
    }

    #[tokio::test]
    async fn test_sizes_are_separate_items() {
        let (mut store, _) = ready_store().await;
        store.add_item(&hoodie(), Some("M"), 1).unwrap();
        store.add_item(&hoodie(), Some("L"), 1).unwrap();
        store.add_item(&hoodie(), None, 1).unwrap();

        assert_eq!(store.cart_items().len(), 3);
        assert!(store.is_in_cart(&ProductId::new("hoodie"), None));
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_products() {
        let (mut store, _) = ready_store().await;

        let mut missing_id = hoodie();
        missing_id.id = None;
        assert_eq!(
            store.add_item(&missing_id, None, 1),
            Err(CartError::InvalidProduct)
        );

        let sold_out = hoodie().out_of_stock();
        assert_eq!(
            store.add_item(&sold_out, None, 1),
            Err(CartError::OutOfStock("Hoodie".to_string()))
        );

        assert!(store.add_item(&hoodie(), None, 0).is_err());
        assert!(store.cart_items().is_empty());
    }

    #[tokio::test]
    async fn test_merge_caps_at_max_quantity() {
        let (mut store, _) = ready_store().await;
        store.add_item(&hoodie(), None, 60).unwrap();
        let message = store.add_item(&hoodie(), None, 60).unwrap();

        assert_eq!(message, "Hoodie quantity capped at 99");
        assert_eq!(store.cart_items()[0].quantity, MAX_QUANTITY_PER_ITEM);
    }

    #[tokio::test]
    async fn test_set_quantity_bounds() {
        let (mut store, _) = ready_store().await;
        store.add_item(&hoodie(), None, 4).unwrap();
        let id = store.cart_items()[0].id.clone();

        let err = store.set_quantity(&id, 100).unwrap_err();
        assert!(matches!(err, CartError::QuantityOutOfRange { requested: 100, .. }));
        assert_eq!(store.cart_items()[0].quantity, 4);

        store.set_quantity(&id, 99).unwrap();
        assert_eq!(store.cart_items()[0].quantity, 99);

        store.set_quantity(&id, 0).unwrap();
        assert!(store.cart_items().is_empty());

        assert!(matches!(
            store.set_quantity(&id, 3),
            Err(CartError::ItemNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_absent_item_succeeds() {
        let (mut store, _) = ready_store().await;
        assert!(store.remove_item(&ItemId::new("ghost-no-size")).is_ok());
    }

    #[tokio::test]
    async fn test_move_round_trip() {
        let (mut store, _) = ready_store().await;
        store.add_item(&hoodie(), Some("S"), 3).unwrap();
        let id = store.cart_items()[0].id.clone();
        let product_id = ProductId::new("hoodie");

        store.move_to_saved(&id).unwrap();
        assert!(store.cart_items().is_empty());
        assert!(store.is_saved(&product_id, Some("S")));
        assert!(!store.is_in_cart(&product_id, Some("S")));

        store.move_to_cart(&id).unwrap();
        assert!(store.saved_items().is_empty());
        let item = &store.cart_items()[0];
        assert_eq!(item.product_id, product_id);
        assert_eq!(item.size.as_deref(), Some("S"));
        assert_eq!(item.quantity, 3);
        assert_eq!(item.unit_price, Money::new(4_500));
    }

    #[tokio::test]
    async fn test_move_to_cart_keeps_saved_item_when_out_of_stock() {
        let (mut store, _) = ready_store().await;
        store.add_item(&hoodie(), None, 1).unwrap();
        let id = store.cart_items()[0].id.clone();
        store.move_to_saved(&id).unwrap();

        store.saved.iter_mut().for_each(|s| s.item.in_stock = false);
        assert!(matches!(
            store.move_to_cart(&id),
            Err(CartError::OutOfStock(_))
        ));
        assert_eq!(store.saved_items().len(), 1);
        assert!(store.cart_items().is_empty());
    }

    #[tokio::test]
    async fn test_move_absent_item_fails() {
        let (mut store, _) = ready_store().await;
        let id = ItemId::new("nope-no-size");
        assert!(matches!(store.move_to_saved(&id), Err(CartError::ItemNotFound(_))));
        assert!(matches!(store.move_to_cart(&id), Err(CartError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_adding_saved_product_removes_saved_twin() {
        let (mut store, _) = ready_store().await;
        store.add_item(&hoodie(), None, 1).unwrap();
        let id = store.cart_items()[0].id.clone();
        store.move_to_saved(&id).unwrap();

        store.add_item(&hoodie(), None, 2).unwrap();
        assert!(store.saved_items().is_empty());
        assert_eq!(store.cart_items()[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_clear_cart_drops_discount() {
        let (mut store, _) = ready_store().await;
        store.add_item(&hoodie(), None, 1).unwrap();
        store.set_applied_discount(
            crate::discount::DiscountCatalog::standard()
                .apply("WELCOME10", Money::new(4_500))
                .unwrap(),
        );
        assert_eq!(store.discount_code(), "WELCOME10");

        store.clear_cart();
        assert!(store.cart_items().is_empty());
        assert!(store.applied_discount().is_none());
        assert_eq!(store.discount_code(), "");
    }

    #[tokio::test]
    async fn test_loading_store_never_writes() {
        let backend = MemoryStore::new();
        backend
            .set(CART_KEY, br#"[{"id":"cap-no-size","productId":"cap","name":"Cap","unitPrice":20.0,"quantity":2,"inStock":true,"addedAt":"2024-05-01T10:00:00Z"}]"#)
            .await
            .unwrap();

        let mut store = CartStore::new(PersistenceGateway::new(backend.clone()));
        assert!(store.is_loading());
        store.clear_cart();
        store.flush().await;

        assert!(backend.raw(CART_KEY).await.unwrap().contains("cap-no-size"));
        assert!(backend.raw(SAVED_ITEMS_KEY).await.is_none());
    }

    #[tokio::test]
    async fn test_items_added_while_loading_merge_with_persisted() {
        let backend = MemoryStore::new();
        let mut first = CartStore::open(PersistenceGateway::new(backend.clone())).await;
        first.add_item(&hoodie(), None, 2).unwrap();
        first.flush().await;

        let mut second = CartStore::new(PersistenceGateway::new(backend.clone()));
        second.add_item(&hoodie(), None, 1).unwrap();
        second.load().await;
        second.flush().await;

        assert_eq!(second.cart_items()[0].quantity, 3);
        let persisted: Vec<CartItem> =
            serde_json::from_str(&backend.raw(CART_KEY).await.unwrap()).unwrap();
        assert_eq!(persisted[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_mutations_persist_full_snapshot() {
        let (mut store, backend) = ready_store().await;
        store.add_item(&hoodie(), Some("M"), 1).unwrap();
        store
            .add_item(
                &ProductDescriptor::new("socks", "Socks", Money::new(900)),
                None,
                2,
            )
            .unwrap();
        let id = store.cart_items()[0].id.clone();
        store.move_to_saved(&id).unwrap();
        store.flush().await;

        let cart: Vec<CartItem> =
            serde_json::from_str(&backend.raw(CART_KEY).await.unwrap()).unwrap();
        let saved: Vec<SavedItem> =
            serde_json::from_str(&backend.raw(SAVED_ITEMS_KEY).await.unwrap()).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].product_id.as_str(), "socks");
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id().as_str(), "hoodie-M");
    }

    #[tokio::test]
    async fn test_write_failures_do_not_block_mutations() {
        let (mut store, backend) = ready_store().await;
        backend.set_fail_writes(true);

        assert!(store.add_item(&hoodie(), None, 1).is_ok());
        store.flush().await;
        assert_eq!(store.cart_items().len(), 1);
        assert!(backend.raw(CART_KEY).await.is_none());
    }

    #[tokio::test]
    async fn test_load_repairs_invalid_persisted_state() {
        let backend = MemoryStore::new();
        let item = r#"{"id":"cap-no-size","productId":"cap","name":"Cap","unitPrice":20.0,"quantity":70,"inStock":true,"addedAt":"2024-05-01T10:00:00Z"}"#;
        backend
            .set(CART_KEY, format!("[{item},{item}]").as_bytes())
            .await
            .unwrap();
        let saved = r#"{"id":"cap-no-size","productId":"cap","name":"Cap","unitPrice":20.0,"quantity":1,"inStock":true,"addedAt":"2024-05-01T10:00:00Z","savedAt":"2024-05-02T10:00:00Z"}"#;
        backend
            .set(SAVED_ITEMS_KEY, format!("[{saved}]").as_bytes())
            .await
            .unwrap();

        let store = CartStore::open(PersistenceGateway::new(backend)).await;
        assert_eq!(store.cart_items().len(), 1);
        assert_eq!(store.cart_items()[0].quantity, MAX_QUANTITY_PER_ITEM);
        assert!(store.saved_items().is_empty());
    }

    #[tokio::test]
    async fn test_load_rederives_mismatched_ids() {
        let backend = MemoryStore::new();
        let saved = r#"{"id":"stale-id","productId":"cap","name":"Cap","unitPrice":20.0,"size":"L","quantity":2,"inStock":true,"addedAt":"2024-05-01T10:00:00Z","savedAt":"2024-05-02T10:00:00Z"}"#;
        backend
            .set(SAVED_ITEMS_KEY, format!("[{saved}]").as_bytes())
            .await
            .unwrap();

        let mut store = CartStore::open(PersistenceGateway::new(backend)).await;
        let id = derive_id(&ProductId::new("cap"), Some("L"));
        assert_eq!(store.saved_items()[0].id(), &id);

        store.move_to_cart(&id).unwrap();
        assert!(store.saved_items().is_empty());
        assert_eq!(store.get_item(&id).map(|i| i.quantity), Some(2));
    }

    #[tokio::test]
    async fn test_failed_saved_write_keeps_previous_snapshot() {
        let (mut store, backend) = ready_store().await;
        store.add_item(&hoodie(), None, 1).unwrap();
        store.flush().await;

        backend.set_fail_key(Some(SAVED_ITEMS_KEY));
        let id = store.cart_items()[0].id.clone();
        store.move_to_saved(&id).unwrap();
        store.flush().await;

        let reopened = CartStore::open(PersistenceGateway::new(backend.clone())).await;
        assert_eq!(reopened.cart_items().len(), 1);
        assert_eq!(reopened.cart_items()[0].id, id);
        assert!(reopened.saved_items().is_empty());
    }
}
