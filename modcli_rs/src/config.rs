//! Configuration file support for modcli.
//!
//! Loads optional `.modcli/config.toml` from the project root.

use serde::Deserialize;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModcliConfig {
    pub resolve: ResolveConfig,
    pub docs: DocsConfig,
}

/// Module specifier resolution settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Extensions probed, in order, when a specifier has none.
    pub extensions: Vec<String>,
    /// Basenames tried when a specifier points at a directory.
    pub index_files: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            extensions: ["js", "mjs", "cjs", "ts", "mts", "cts", "jsx", "tsx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            index_files: vec!["index".to_string()],
        }
    }
}

/// Documentation block settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Tag names (without `@`) that declare a parameter.
    pub param_tags: Vec<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            param_tags: vec!["param".into(), "arg".into(), "argument".into()],
        }
    }
}

impl ModcliConfig {
    /// Load config from `.modcli/config.toml` in the given root directory.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(".modcli").join("config.toml");
        Self::load_from_path(&config_path)
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
