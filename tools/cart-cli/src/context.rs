//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use cart_engine::config::EngineConfig;
use cart_engine::CartManager;

use crate::output::Output;

/// Config file names searched for, in order.
pub const CONFIG_NAMES: [&str; 3] = ["cart.toml", ".cart.toml", "cart.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Engine configuration.
    pub config: EngineConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Directory of the config file, used to resolve relative storage paths.
    pub config_dir: Option<PathBuf>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_file) = if let Some(path) = config_path {
            let path = resolve(&cwd, path);
            let config = EngineConfig::load(&path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?;
            (config, Some(path))
        } else {
            // Try to find config in current directory or parent directories
            match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (EngineConfig::default(), None),
            }
        };

        let config_dir = config_file.and_then(|p| p.parent().map(Path::to_path_buf));
        Ok(Self {
            config,
            output,
            cwd,
            config_dir,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(EngineConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = EngineConfig::load(&config_path) {
                        return Some((config, config_path));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Directory where cart state is stored.
    pub fn storage_dir(&self) -> PathBuf {
        let base = self.config_dir.as_deref().unwrap_or(&self.cwd);
        resolve(base, &self.config.storage.dir)
    }

    /// Open the cart stored in [`Context::storage_dir`].
    pub async fn open_cart(&self) -> CartManager {
        let mut config = self.config.clone();
        config.storage.dir = self.storage_dir();
        self.output
            .debug(&format!("Cart storage: {}", config.storage.dir.display()));
        CartManager::from_config(&config).await
    }
}

/// Resolve a path relative to `base`.
fn resolve(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
