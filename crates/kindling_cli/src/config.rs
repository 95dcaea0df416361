//! Kindling configuration file handling
//!
//! `kindling.toml` holds runtime tunables and the app's mount target and
//! seed data. Every key is optional.

use anyhow::{Context, Result};
use kindling_core::RuntimeConfig;
use kindling_todo::TodoItem;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration stored in kindling.toml
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct KindlingConfig {
    #[serde(default)]
    pub runtime: RuntimeSection,
    #[serde(default)]
    pub app: AppSection,
}

/// Runtime tunables
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct RuntimeSection {
    #[serde(default)]
    pub strict_hook_order: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_passes_per_refresh: Option<u32>,
}

/// Todo app settings
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct AppSection {
    #[serde(default = "default_mount_target")]
    pub mount_target: String,
    #[serde(default = "default_items")]
    pub items: Vec<SeedItem>,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            mount_target: default_mount_target(),
            items: default_items(),
        }
    }
}

/// A todo item to preload into the store
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SeedItem {
    pub text: String,
    #[serde(default)]
    pub complete: bool,
}

fn default_mount_target() -> String {
    "root".to_string()
}

fn default_items() -> Vec<SeedItem> {
    vec![
        SeedItem {
            text: "This is complete".to_string(),
            complete: true,
        },
        SeedItem {
            text: "This is not complete".to_string(),
            complete: false,
        },
    ]
}

impl KindlingConfig {
    /// Load configuration from `path`, falling back to defaults if the file
    /// does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        let mut config = RuntimeConfig::new().strict_hook_order(self.runtime.strict_hook_order);
        if let Some(limit) = self.runtime.max_passes_per_refresh {
            config = config.max_passes_per_refresh(limit);
        }
        config
    }

    pub fn seed_items(&self) -> Vec<TodoItem> {
        self.app
            .items
            .iter()
            .map(|seed| TodoItem::new(seed.text.clone()).completed(seed.complete))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = KindlingConfig::parse("").unwrap();
        assert_eq!(config, KindlingConfig::default());
        assert_eq!(config.app.mount_target, "root");
        assert_eq!(config.seed_items().len(), 2);
    }

    #[test]
    fn test_parse_full_file() {
        let config = KindlingConfig::parse(
            r#"
            [runtime]
            strict_hook_order = true
            max_passes_per_refresh = 16

            [app]
            mount_target = "app"

            [[app.items]]
            text = "Water plants"

            [[app.items]]
            text = "Pay rent"
            complete = true
            "#,
        )
        .unwrap();

        let runtime = config.runtime_config();
        assert!(runtime.strict_hook_order);
        assert_eq!(runtime.max_passes_per_refresh, Some(16));
        assert_eq!(config.app.mount_target, "app");

        let items = config.seed_items();
        assert_eq!(items[0].text, "Water plants");
        assert!(!items[0].complete);
        assert!(items[1].complete);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(KindlingConfig::parse("[runtime]\nstrict_hook_order = 3").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = KindlingConfig::load(Path::new("does/not/exist/kindling.toml")).unwrap();
        assert_eq!(config, KindlingConfig::default());
    }

    #[test]
    fn test_toml_output_parses_back() {
        let config = KindlingConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(KindlingConfig::parse(&text).unwrap(), config);
    }
}
