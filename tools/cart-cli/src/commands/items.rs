//! Cart mutation commands.

use anyhow::{bail, Result};
use cart_engine::cart::ProductDescriptor;
use cart_engine::{CartManager, Money, OperationResult};

use super::{AddArgs, ClearArgs, ClearTarget, ItemArgs, QuantityArgs};
use crate::context::Context;

/// Add a product to the cart.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    if !args.price.is_finite() || args.price < 0.0 {
        bail!("Price must be a non-negative number, got {}", args.price);
    }

    let mut product = ProductDescriptor::new(
        args.item.product.as_str(),
        args.name.as_str(),
        Money::from_decimal(args.price),
    );
    if let Some(original) = args.original_price {
        product = product.with_original_price(Money::from_decimal(original));
    }
    if let Some(category) = args.category {
        product = product.with_category(category);
    }
    if args.out_of_stock {
        product = product.out_of_stock();
    }

    let size = args.item.size.as_deref();
    mutate(ctx, |cart| cart.add_item(&product, size, args.quantity)).await
}

/// Remove an item from the cart.
pub async fn remove(args: ItemArgs, ctx: &Context) -> Result<()> {
    let id = args.item_id();
    mutate(ctx, |cart| cart.remove_item(&id)).await
}

/// Set an item's quantity.
pub async fn set_quantity(args: QuantityArgs, ctx: &Context) -> Result<()> {
    let id = args.item.item_id();
    mutate(ctx, |cart| cart.set_quantity(&id, args.quantity)).await
}

/// Move a cart item to the saved list.
pub async fn move_to_saved(args: ItemArgs, ctx: &Context) -> Result<()> {
    let id = args.item_id();
    mutate(ctx, |cart| cart.move_to_saved(&id)).await
}

/// Move a saved item back to the cart.
pub async fn move_to_cart(args: ItemArgs, ctx: &Context) -> Result<()> {
    let id = args.item_id();
    mutate(ctx, |cart| cart.move_to_cart(&id)).await
}

/// Empty the cart or the saved list.
pub async fn clear(args: ClearArgs, ctx: &Context) -> Result<()> {
    mutate(ctx, |cart| match args.target {
        ClearTarget::Cart => cart.clear_cart(),
        ClearTarget::Saved => cart.clear_saved_items(),
    })
    .await
}

/// Open the cart, run one operation, and wait for it to be persisted.
async fn mutate<F>(ctx: &Context, operation: F) -> Result<()>
where
    F: FnOnce(&mut CartManager) -> OperationResult,
{
    let mut cart = ctx.open_cart().await;
    let result = operation(&mut cart);
    cart.flush().await;

    let reported = ctx.output.operation(&result);
    exit_status(reported)
}

/// The outcome message is already printed; only signal failure.
fn exit_status(success: bool) -> Result<()> {
    if !success {
        bail!("Cart not updated");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_is_not_repeated_in_the_exit_error() {
        let rejected = OperationResult::failed("Hoodie is out of stock");
        let err = exit_status(rejected.success).unwrap_err();

        assert!(!err.to_string().contains(&rejected.message));
        assert!(exit_status(true).is_ok());
    }
}
