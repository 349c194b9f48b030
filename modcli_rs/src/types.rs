use std::path::{Path, PathBuf};

use modcli_common::Documentation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One externally visible name, resolved to the file that really defines it.
///
/// Re-export chains are flattened: `defining_file` is never an intermediate
/// barrel, only the original declaration's file (or, for a default export,
/// the file holding the `export default` statement).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportBinding {
    pub name: String,
    pub defining_file: PathBuf,
    /// Byte offset of the defining statement; `None` when it could not be located.
    pub position: Option<u32>,
    pub documentation: Option<Documentation>,
}

impl ExportBinding {
    pub fn new(name: impl Into<String>, defining_file: impl Into<PathBuf>, position: Option<u32>) -> Self {
        Self {
            name: name.into(),
            defining_file: defining_file.into(),
            position,
            documentation: None,
        }
    }
}

/// The resolved, documented command surface of one entry module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliDescriptor {
    /// Entry file name without its extension.
    pub name: String,
    pub entry_file: PathBuf,
    pub exports: Vec<ExportBinding>,
}

impl CliDescriptor {
    pub fn new(entry_file: &Path, exports: Vec<ExportBinding>) -> Self {
        let name = entry_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            name,
            entry_file: entry_file.to_path_buf(),
            exports,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ExportBinding> {
        self.exports.iter().find(|e| e.name == name)
    }

    pub fn command_names(&self) -> Vec<String> {
        self.exports.iter().map(|e| e.name.clone()).collect()
    }
}

/// Arguments ready to be passed, in order, to the chosen export.
///
/// `None` stands for a parameter left undefined. Trailing `None`s are trimmed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundInvocation {
    pub command: String,
    pub values: Vec<Option<Value>>,
}
