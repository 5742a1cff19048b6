//! Cart CLI - Command line front end for the cart engine.
//!
//! Commands:
//! - `cart init` - Write a default `cart.toml`
//! - `cart add` - Add a product to the cart
//! - `cart remove` / `cart qty` - Remove or change an item
//! - `cart save` / `cart restore` - Move items between cart and saved list
//! - `cart clear` - Empty the cart or the saved list
//! - `cart list` - Show cart and saved items
//! - `cart summary` - Price the cart, optionally with a discount code
//! - `cart codes` - List discount codes

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cart_engine::config::{EngineConfig, LogFormat};
use commands::{AddArgs, ClearArgs, InitArgs, ItemArgs, QuantityArgs, SummaryArgs};

/// Cart CLI - Manage a locally persisted shopping cart
#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default cart.toml
    Init(InitArgs),

    /// Add a product to the cart
    Add(AddArgs),

    /// Remove an item from the cart
    Remove(ItemArgs),

    /// Set an item's quantity (0 removes it)
    Qty(QuantityArgs),

    /// Move a cart item to the saved list
    Save(ItemArgs),

    /// Move a saved item back to the cart
    Restore(ItemArgs),

    /// Empty the cart or the saved list
    Clear(ClearArgs),

    /// Show cart and saved items
    List,

    /// Show the order summary
    Summary(SummaryArgs),

    /// List available discount codes
    Codes,
}

fn init_tracing(config: &EngineConfig, verbose: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            "cart_engine=debug".into()
        } else {
            config.logging.filter.as_str().into()
        }
    });

    let json = config.logging.format == LogFormat::Json;
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let ctx = match context::Context::load(cli.config.as_deref(), output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };
    init_tracing(&ctx.config, cli.verbose);

    // Execute command
    let result = match cli.command {
        Commands::Init(args) => commands::init::run(args, &ctx).await,
        Commands::Add(args) => commands::items::add(args, &ctx).await,
        Commands::Remove(args) => commands::items::remove(args, &ctx).await,
        Commands::Qty(args) => commands::items::set_quantity(args, &ctx).await,
        Commands::Save(args) => commands::items::move_to_saved(args, &ctx).await,
        Commands::Restore(args) => commands::items::move_to_cart(args, &ctx).await,
        Commands::Clear(args) => commands::items::clear(args, &ctx).await,
        Commands::List => commands::summary::list(&ctx).await,
        Commands::Summary(args) => commands::summary::run(args, &ctx).await,
        Commands::Codes => commands::summary::codes(&ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
