//! Cart and saved item types, plus the product descriptor they are built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{derive_id, ItemId, ProductId};
use crate::money::Money;

/// Maximum quantity allowed per cart item.
pub const MAX_QUANTITY_PER_ITEM: u32 = 99;

/// Product data handed in by the catalog when adding to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDescriptor {
    /// Catalog product id. `None` or blank is rejected.
    pub id: Option<ProductId>,
    /// Product name (denormalized for display).
    pub name: String,
    /// Current unit price.
    pub price: Money,
    /// Price before markdown, if any.
    #[serde(default)]
    pub original_price: Option<Money>,
    /// Image reference.
    #[serde(default)]
    pub image: Option<String>,
    /// Sponsoring brand or creator.
    #[serde(default)]
    pub sponsor: Option<String>,
    /// Catalog category.
    #[serde(default)]
    pub category: Option<String>,
    /// Whether the product can be purchased.
    pub in_stock: bool,
    /// Whether the product is only sold in-app.
    #[serde(default)]
    pub is_app_exclusive: bool,
}

impl ProductDescriptor {
    /// Create an in-stock product.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            price,
            original_price: None,
            image: None,
            sponsor: None,
            category: None,
            in_stock: true,
            is_app_exclusive: false,
        }
    }

    /// Mark the product as out of stock.
    pub fn out_of_stock(mut self) -> Self {
        self.in_stock = false;
        self
    }

    /// Set the pre-markdown price.
    pub fn with_original_price(mut self, price: Money) -> Self {
        self.original_price = Some(price);
        self
    }

    /// Set the image reference.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the sponsor.
    pub fn with_sponsor(mut self, sponsor: impl Into<String>) -> Self {
        self.sponsor = Some(sponsor.into());
        self
    }

    /// Product id if present and non-blank.
    pub fn product_id(&self) -> Option<&ProductId> {
        self.id.as_ref().filter(|id| !id.as_str().trim().is_empty())
    }
}

/// An item in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Identity derived from product id and size.
    pub id: ItemId,
    /// Catalog product id.
    pub product_id: ProductId,
    /// Product name.
    pub name: String,
    /// Unit price at the time of adding.
    pub unit_price: Money,
    /// Price before markdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,
    /// Image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    /// Selected size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Quantity, 1..=99.
    pub quantity: u32,
    /// Sponsoring brand or creator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<String>,
    /// Catalog category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Stock flag copied from the product.
    pub in_stock: bool,
    /// In-app exclusive flag copied from the product.
    #[serde(default)]
    pub is_app_exclusive: bool,
    /// When the item entered the cart.
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Build a cart item from a product descriptor.
    pub(crate) fn from_product(
        product_id: ProductId,
        product: &ProductDescriptor,
        size: Option<&str>,
        quantity: u32,
    ) -> Self {
        Self {
            id: derive_id(&product_id, size),
            product_id,
            name: product.name.clone(),
            unit_price: product.price,
            original_price: product.original_price,
            image_ref: product.image.clone(),
            size: size.map(str::to_string),
            quantity,
            sponsor: product.sponsor.clone(),
            category: product.category.clone(),
            in_stock: product.in_stock,
            is_app_exclusive: product.is_app_exclusive,
            added_at: Utc::now(),
        }
    }

    /// Unit price times quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price * i64::from(self.quantity)
    }

    /// Whether the item is marked down from its original price.
    pub fn is_on_sale(&self) -> bool {
        self.original_price
            .map(|original| original > self.unit_price)
            .unwrap_or(false)
    }

    /// Rebuild the product descriptor this item was created from.
    pub fn to_descriptor(&self) -> ProductDescriptor {
        ProductDescriptor {
            id: Some(self.product_id.clone()),
            name: self.name.clone(),
            price: self.unit_price,
            original_price: self.original_price,
            image: self.image_ref.clone(),
            sponsor: self.sponsor.clone(),
            category: self.category.clone(),
            in_stock: self.in_stock,
            is_app_exclusive: self.is_app_exclusive,
        }
    }
}

/// An item set aside for later, outside pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItem {
    /// The item as it sat in the cart.
    #[serde(flatten)]
    pub item: CartItem,
    /// When it was saved.
    pub saved_at: DateTime<Utc>,
}

impl SavedItem {
    /// Wrap a cart item being moved out of the cart.
    pub fn from_cart_item(item: CartItem) -> Self {
        Self {
            item,
            saved_at: Utc::now(),
        }
    }

    /// Identity of the saved item.
    pub fn id(&self) -> &ItemId {
        &self.item.id
    }
}
