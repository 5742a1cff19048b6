//! Cart state survives a process restart through the file store.

use cart_engine::persistence::{CART_KEY, SAVED_ITEMS_KEY};
use cart_engine::prelude::*;

fn jacket() -> ProductDescriptor {
    ProductDescriptor::new("jacket", "Rain Jacket", Money::from_decimal(89.5))
        .with_original_price(Money::from_decimal(120.0))
        .with_image("img/jacket.png")
        .with_sponsor("Northwind")
}

fn beanie() -> ProductDescriptor {
    ProductDescriptor::new("beanie", "Beanie", Money::from_decimal(18.0)).with_category("hats")
}

#[tokio::test]
async fn cart_and_saved_items_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut cart = CartManager::open(PersistenceGateway::new(FileStore::open(dir.path()))).await;
        assert!(cart.add_item(&jacket(), Some("L"), 1).success);
        assert!(cart.add_item(&beanie(), None, 3).success);
        assert!(cart.add_item(&jacket(), Some("L"), 1).success);
        let beanie_id = derive_id(&ProductId::new("beanie"), None);
        assert!(cart.move_to_saved(&beanie_id).success);
        assert!(cart.apply_discount_code("FREESHIP").success);
        cart.flush().await;
    }

    assert!(dir.path().join(format!("{CART_KEY}.json")).exists());
    assert!(dir.path().join(format!("{SAVED_ITEMS_KEY}.json")).exists());

    let cart = CartManager::open(PersistenceGateway::new(FileStore::open(dir.path()))).await;
    assert!(!cart.is_loading());

    let items = cart.cart_items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id.as_str(), "jacket-L");
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].unit_price, Money::new(8_950));
    assert_eq!(items[0].sponsor.as_deref(), Some("Northwind"));
    assert!(items[0].is_on_sale());

    assert!(cart.is_saved(&ProductId::new("beanie"), None));
    assert_eq!(cart.saved_items()[0].item.quantity, 3);
    assert_eq!(cart.saved_items()[0].item.category.as_deref(), Some("hats"));

    // Discounts live in memory only.
    assert_eq!(cart.discount_code(), "");
    let summary = cart.summary();
    assert_eq!(summary.subtotal, Money::new(17_900));
    assert!(summary.shipping.is_zero());
}

#[tokio::test]
async fn corrupt_files_start_empty_and_are_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cart.json"), "this is not json").unwrap();

    let mut cart = CartManager::open(PersistenceGateway::new(FileStore::open(dir.path()))).await;
    assert!(cart.cart_items().is_empty());

    assert!(cart.add_item(&beanie(), None, 1).success);
    cart.flush().await;

    let on_disk = std::fs::read_to_string(dir.path().join("cart.json")).unwrap();
    let items: Vec<CartItem> = serde_json::from_str(&on_disk).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id.as_str(), "beanie");
}

#[tokio::test]
async fn rapid_mutations_leave_latest_snapshot_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let mut cart = CartManager::open(PersistenceGateway::new(FileStore::open(dir.path()))).await;

    for _ in 0..20 {
        cart.add_item(&beanie(), None, 1);
    }
    let id = derive_id(&ProductId::new("beanie"), None);
    cart.set_quantity(&id, 7);
    cart.flush().await;

    let reopened = CartManager::open(PersistenceGateway::new(FileStore::open(dir.path()))).await;
    assert_eq!(reopened.cart_items()[0].quantity, 7);
}

#[tokio::test]
async fn config_drives_storage_and_pricing() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::from_toml(&format!(
        r#"
        [storage]
        dir = "{}"

        [pricing]
        tax_rate_bps = 1000
        "#,
        dir.path().join("carts").display()
    ))
    .unwrap();

    let mut cart = CartManager::from_config(&config).await;
    cart.add_item(&beanie(), None, 1);
    cart.flush().await;

    let summary = cart.summary();
    assert_eq!(summary.tax, Money::new(180));
    assert!(dir.path().join("carts").join("cart.json").exists());
}
