//! CLI command implementations.

pub mod init;
pub mod items;
pub mod summary;

use cart_engine::{derive_id, ItemId, ProductId};
use clap::{Args, ValueEnum};

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing cart.toml.
    #[arg(short, long)]
    pub force: bool,
}

/// Identifies an item by product and size.
#[derive(Args)]
pub struct ItemArgs {
    /// Product id.
    pub product: String,

    /// Size, if the product has one.
    #[arg(short, long)]
    pub size: Option<String>,
}

impl ItemArgs {
    /// Item identity for these arguments.
    pub fn item_id(&self) -> ItemId {
        derive_id(&ProductId::new(self.product.as_str()), self.size.as_deref())
    }
}

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    #[command(flatten)]
    pub item: ItemArgs,

    /// Display name.
    #[arg(short, long)]
    pub name: String,

    /// Unit price in dollars.
    #[arg(short, long)]
    pub price: f64,

    /// Quantity to add.
    #[arg(short, long, default_value = "1")]
    pub quantity: u32,

    /// Price before markdown, in dollars.
    #[arg(long)]
    pub original_price: Option<f64>,

    /// Catalog category.
    #[arg(long)]
    pub category: Option<String>,

    /// Treat the product as out of stock.
    #[arg(long)]
    pub out_of_stock: bool,
}

/// Arguments for the qty command.
#[derive(Args)]
pub struct QuantityArgs {
    #[command(flatten)]
    pub item: ItemArgs,

    /// New quantity. Zero or less removes the item.
    #[arg(allow_hyphen_values = true)]
    pub quantity: i64,
}

/// Which list to clear.
#[derive(Clone, Copy, ValueEnum)]
pub enum ClearTarget {
    /// The cart (also drops any discount).
    Cart,
    /// The saved-for-later list.
    Saved,
}

/// Arguments for the clear command.
#[derive(Args)]
pub struct ClearArgs {
    /// List to clear.
    #[arg(value_enum, default_value = "cart")]
    pub target: ClearTarget,
}

/// Arguments for the summary command.
#[derive(Args)]
pub struct SummaryArgs {
    /// Discount code to price with.
    #[arg(long)]
    pub code: Option<String>,
}
