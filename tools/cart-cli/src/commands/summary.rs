//! Read-only commands: list, summary, codes.

use anyhow::Result;
use cart_engine::discount::DiscountValue;
use cart_engine::pricing::OrderSummary;
use cart_engine::{OperationResult, NO_SIZE};
use serde::Serialize;

use super::SummaryArgs;
use crate::context::Context;

const ITEM_WIDTHS: [usize; 4] = [28, 8, 5, 10];

/// Show cart and saved items.
pub async fn list(ctx: &Context) -> Result<()> {
    let cart = ctx.open_cart().await;

    if ctx.output.is_json() {
        #[derive(Serialize)]
        struct Listing<'a> {
            cart: &'a [cart_engine::cart::CartItem],
            saved: &'a [cart_engine::cart::SavedItem],
        }
        ctx.output.json(&Listing {
            cart: cart.cart_items(),
            saved: cart.saved_items(),
        });
        return Ok(());
    }

    ctx.output.header("Cart");
    if cart.cart_items().is_empty() {
        ctx.output.info("Your cart is empty.");
    } else {
        ctx.output
            .table_row(&["ITEM", "SIZE", "QTY", "TOTAL"], &ITEM_WIDTHS);
        for item in cart.cart_items() {
            let quantity = item.quantity.to_string();
            let total = item.line_total().display();
            ctx.output.table_row(
                &[
                    &item.name,
                    item.size.as_deref().unwrap_or(NO_SIZE),
                    &quantity,
                    &total,
                ],
                &ITEM_WIDTHS,
            );
        }
    }

    if !cart.saved_items().is_empty() {
        ctx.output.header("Saved for later");
        for saved in cart.saved_items() {
            let quantity = saved.item.quantity.to_string();
            let price = saved.item.unit_price.display();
            ctx.output.table_row(
                &[
                    &saved.item.name,
                    saved.item.size.as_deref().unwrap_or(NO_SIZE),
                    &quantity,
                    &price,
                ],
                &ITEM_WIDTHS,
            );
        }
    }

    Ok(())
}

/// Show the order summary.
pub async fn run(args: SummaryArgs, ctx: &Context) -> Result<()> {
    let mut cart = ctx.open_cart().await;

    let code_result = args
        .code
        .as_deref()
        .map(|code| cart.apply_discount_code(code));
    if let Some(result) = code_result.as_ref().filter(|r| !r.success) {
        ctx.output.warn(&result.message);
    }

    let summary = cart.summary();
    if ctx.output.is_json() {
        ctx.output.json(&SummaryReport {
            summary: &summary,
            code_result: code_result.as_ref(),
        });
        return Ok(());
    }

    print_summary(ctx, &summary);
    Ok(())
}

/// JSON form of the summary command.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryReport<'a> {
    #[serde(flatten)]
    summary: &'a OrderSummary,
    /// Outcome of `--code`, when one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    code_result: Option<&'a OperationResult>,
}

fn print_summary(ctx: &Context, summary: &OrderSummary) {
    ctx.output.header("Order summary");
    ctx.output
        .kv("Items", &summary.item_count.to_string());
    ctx.output.kv("Subtotal", &summary.subtotal.display());
    ctx.output.kv("Shipping", &summary.shipping.display());
    if let Some(discount) = &summary.applied_discount {
        ctx.output.kv(
            &format!("Discount ({})", discount.code),
            &format!("-{}", summary.discount.display()),
        );
    }
    ctx.output.kv("Tax", &summary.tax.display());
    ctx.output.kv("Total", &summary.total.display());
}

/// List available discount codes.
pub async fn codes(ctx: &Context) -> Result<()> {
    let catalog = ctx.config.discount_catalog();

    if ctx.output.is_json() {
        let rules: Vec<_> = catalog.rules().collect();
        ctx.output.json(&rules);
        return Ok(());
    }

    ctx.output.header("Discount codes");
    let widths = [12, 14, 10, 30];
    ctx.output
        .table_row(&["CODE", "VALUE", "MIN", "DESCRIPTION"], &widths);
    for rule in catalog.rules() {
        let value = match rule.value {
            DiscountValue::Percentage(_) => format!("{}% off", rule.value.amount()),
            DiscountValue::Fixed(amount) => format!("{} off", amount.display()),
            DiscountValue::Shipping => "free shipping".to_string(),
        };
        let minimum = rule.min_order.display();
        ctx.output.table_row(
            &[&rule.code, &value, &minimum, &rule.description],
            &widths,
        );
    }

    Ok(())
}
