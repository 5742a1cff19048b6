//! Write a default configuration file.

use anyhow::{bail, Context as _, Result};
use cart_engine::config::generate_default_config;

use super::InitArgs;
use crate::context::{Context, CONFIG_NAMES};

/// Run the init command.
pub async fn run(args: InitArgs, ctx: &Context) -> Result<()> {
    let path = ctx.cwd.join(CONFIG_NAMES[0]);

    if path.exists() && !args.force {
        bail!(
            "'{}' already exists (use --force to overwrite)",
            path.display()
        );
    }

    std::fs::write(&path, generate_default_config())
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    ctx.output
        .success(&format!("Wrote {}", path.display()));
    ctx.output.info("Cart state will be stored in .cart/");
    Ok(())
}
