//! Package manifest lookup: find the entry module of a package directory.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::ResolveConfig;
use crate::resolver::SpecifierResolver;

/// Fields consulted, in order, for the entry module.
const ENTRY_FIELDS: [&str; 2] = ["module", "main"];

/// Locate the entry module of the package rooted at `dir`.
///
/// Reads `package.json` (`module`, then `main`) and falls back to an index
/// file in `dir` itself.
pub fn locate_entry(dir: &Path, config: &ResolveConfig) -> Option<PathBuf> {
    locate_entry_with(dir, &SpecifierResolver::new(config))
}

pub(crate) fn locate_entry_with(dir: &Path, resolver: &SpecifierResolver) -> Option<PathBuf> {
    if let Some(manifest) = load_manifest(dir) {
        for field in ENTRY_FIELDS {
            let Some(entry) = manifest.get(field).and_then(|v| v.as_str()) else {
                continue;
            };
            if let Some(found) = resolver.probe(&dir.join(entry)) {
                return Some(found);
            }
            tracing::debug!(
                "package.json `{}` points at missing {}",
                field,
                dir.join(entry).display()
            );
        }
    }
    resolver.probe(dir)
}

fn load_manifest(dir: &Path) -> Option<Value> {
    let path = dir.join("package.json");
    let content = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("failed to parse {}: {}", path.display(), e);
            None
        }
    }
}
