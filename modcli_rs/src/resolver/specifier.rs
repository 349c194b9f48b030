//! Module specifier resolution (`./utils`, `../lib/index.js`, `some-package`).

use std::path::{Path, PathBuf};

use crate::config::ResolveConfig;
use crate::error::{Error, Result};
use crate::manifest;

/// Resolves import/export specifiers to canonical file paths.
#[derive(Debug, Clone)]
pub(crate) struct SpecifierResolver {
    extensions: Vec<String>,
    index_files: Vec<String>,
}

impl SpecifierResolver {
    pub(crate) fn new(config: &ResolveConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            index_files: config.index_files.clone(),
        }
    }

    /// Resolve `spec` as written in `from_file`.
    pub(crate) fn resolve(&self, from_file: &Path, spec: &str) -> Result<PathBuf> {
        let base = from_file.parent().unwrap_or_else(|| Path::new("."));

        let found = if spec.starts_with('.') || Path::new(spec).is_absolute() {
            self.probe(&base.join(spec))
        } else {
            self.resolve_bare(base, spec)
        };

        found.ok_or_else(|| Error::FileNotFound(base.join(spec)))
    }

    /// Try `candidate` as a file, with each extension appended, with a
    /// TypeScript source standing in for a `.js` specifier, then as a
    /// directory holding an index file.
    pub(crate) fn probe(&self, candidate: &Path) -> Option<PathBuf> {
        if candidate.is_file() {
            return canonical(candidate);
        }

        for ext in &self.extensions {
            let with_ext = append_extension(candidate, ext);
            if with_ext.is_file() {
                return canonical(&with_ext);
            }
        }

        // ESM TypeScript imports name the emitted `.js` file
        if let Some(stem) = js_stem(candidate) {
            for ext in ["ts", "tsx", "mts"] {
                let swapped = append_extension(&stem, ext);
                if swapped.is_file() {
                    return canonical(&swapped);
                }
            }
        }

        if candidate.is_dir() {
            for index in &self.index_files {
                for ext in &self.extensions {
                    let index_candidate = candidate.join(format!("{index}.{ext}"));
                    if index_candidate.is_file() {
                        return canonical(&index_candidate);
                    }
                }
            }
        }
        None
    }

    /// Walk up from `base` looking for `node_modules/<package>`.
    fn resolve_bare(&self, base: &Path, spec: &str) -> Option<PathBuf> {
        let (package, subpath) = split_package(spec);
        let mut current = Some(base);
        while let Some(dir) = current {
            let package_dir = dir.join("node_modules").join(package);
            if package_dir.is_dir() {
                return match subpath {
                    Some(sub) => self.probe(&package_dir.join(sub)),
                    None => manifest::locate_entry_with(&package_dir, self),
                };
            }
            current = dir.parent();
        }
        None
    }
}

/// `@scope/pkg/sub/path` -> (`@scope/pkg`, Some(`sub/path`))
fn split_package(spec: &str) -> (&str, Option<&str>) {
    let mut parts = spec.splitn(if spec.starts_with('@') { 3 } else { 2 }, '/');
    let first = parts.next().unwrap_or(spec);
    let package_len = if spec.starts_with('@') {
        first.len() + parts.next().map(|p| p.len() + 1).unwrap_or(0)
    } else {
        first.len()
    };
    let package = &spec[..package_len];
    let subpath = spec.get(package_len + 1..).filter(|s| !s.is_empty());
    (package, subpath)
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".");
    os.push(ext);
    PathBuf::from(os)
}

fn js_stem(path: &Path) -> Option<PathBuf> {
    let ext = path.extension()?.to_str()?;
    matches!(ext, "js" | "jsx" | "mjs").then(|| path.with_extension(""))
}

fn canonical(path: &Path) -> Option<PathBuf> {
    path.canonicalize().ok()
}
