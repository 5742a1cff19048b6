//! Engine configuration.
//!
//! Loaded from TOML (or JSON, by file extension). Every section is optional
//! and defaults to the standard storefront pricing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::discount::{DiscountCatalog, DiscountRule};
use crate::pricing::PricingPolicy;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML was malformed.
    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON was malformed.
    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Where cart state is persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Shipping and tax settings.
    #[serde(default)]
    pub pricing: PricingPolicy,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Discount codes. Empty means the built-in catalog.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discounts: Vec<DiscountRule>,
}

impl EngineConfig {
    /// Load config from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Self::from_toml(&content)
        }
    }

    /// Parse TOML config text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Discount catalog described by this config.
    pub fn discount_catalog(&self) -> DiscountCatalog {
        if self.discounts.is_empty() {
            DiscountCatalog::standard()
        } else {
            DiscountCatalog::with_rules(self.discounts.iter().cloned())
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `cart.json` and `savedItems.json`.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".cart")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines (for development).
    #[default]
    Text,
    /// JSON lines (for log aggregation).
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "cart_engine=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_filter(),
        }
    }
}

/// Generate a default `cart.toml`.
pub fn generate_default_config() -> String {
    r#"# Cart engine configuration

[storage]
dir = ".cart"

[pricing]
free_shipping_threshold = 75.0
flat_shipping = 9.99
tax_rate_bps = 850

[logging]
format = "text"
filter = "cart_engine=info"

# Replace the built-in discount codes. `type` is percentage, fixed or
# shipping; `value` is a percent (12.5 allowed), dollars, or 0 for shipping.
# [[discounts]]
# code = "VIP30"
# type = "percentage"
# value = 30
# minOrder = 0.0
# description = "30% off for members"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discount::{DiscountType, DiscountValue};
    use crate::money::Money;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.pricing.flat_shipping, Money::new(999));
        assert_eq!(config.storage.dir, PathBuf::from(".cart"));
        assert!(config.discount_catalog().lookup("SAVE20").is_some());
    }

    #[test]
    fn test_default_config_text_parses() {
        let config = EngineConfig::from_toml(&generate_default_config()).unwrap();
        assert_eq!(config.pricing, PricingPolicy::default());
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_partial_pricing_section() {
        let config = EngineConfig::from_toml(
            r#"
            [pricing]
            tax_rate_bps = 0

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.pricing.tax_rate_bps, 0);
        assert_eq!(config.pricing.free_shipping_threshold, Money::new(7_500));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.filter, "cart_engine=info");
    }

    #[test]
    fn test_custom_discounts_replace_catalog() {
        let config = EngineConfig::from_toml(
            r#"
            [[discounts]]
            code = "vip30"
            type = "percentage"
            value = 30
            min_order = 0.0
            description = "Members"

            [[discounts]]
            code = "SHIPIT"
            type = "shipping"
            value = 0
            minOrder = 20.0
            description = "Free shipping over $20"
            "#,
        )
        .unwrap();

        let catalog = config.discount_catalog();
        assert!(catalog.lookup("SAVE20").is_none());
        assert_eq!(
            catalog.lookup("VIP30").map(|r| r.discount_type()),
            Some(DiscountType::Percentage)
        );
        assert_eq!(
            catalog.lookup("shipit").map(|r| r.min_order),
            Some(Money::new(2_000))
        );
    }

    #[test]
    fn test_discount_values_parse_as_plain_numbers() {
        let config = EngineConfig::from_toml(
            r#"
            [[discounts]]
            code = "HALFTEN"
            type = "percentage"
            value = 12.5
            description = "12.5% off"

            [[discounts]]
            code = "SHIPFREE"
            type = "shipping"
            value = 0
            description = "Free shipping"
            "#,
        )
        .unwrap();

        let catalog = config.discount_catalog();
        assert_eq!(
            catalog.lookup("HALFTEN").map(|r| r.value),
            Some(DiscountValue::Percentage(1_250))
        );
        assert_eq!(
            catalog.lookup("SHIPFREE").map(|r| (r.value, r.min_order)),
            Some((DiscountValue::Shipping, Money::zero()))
        );
    }

    #[test]
    fn test_load_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, r#"{"storage":{"dir":"/tmp/carts"}}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.storage.dir, PathBuf::from("/tmp/carts"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load("/definitely/not/here/cart.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
