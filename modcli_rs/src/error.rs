//! Error taxonomy shared by resolution and binding.
//!
//! Every variant is terminal for the operation that raised it. Failures are
//! deterministic functions of the input, so nothing is retried.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("module not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("export `{name}` not found in {}", .file.display())]
    ExportNotFound { name: String, file: PathBuf },

    #[error("failed to parse {}: {message}", .file.display())]
    Parse { file: PathBuf, message: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown command `{command}` (available: {})", .available.join(", "))]
    UnknownCommand {
        command: String,
        available: Vec<String>,
    },

    #[error("value `{value}` for <{parameter}> looks like an option; a required argument is probably missing")]
    AmbiguousArguments { parameter: String, value: String },

    #[error("unknown argument: {0}")]
    UnknownArgument(String),

    #[error("invalid boolean: `{0}`")]
    InvalidBoolean(String),

    #[error("invalid number: `{0}`")]
    InvalidNumber(String),

    #[error("invalid literal `{text}`: {message}")]
    InvalidLiteral { text: String, message: String },

    #[error("missing required arguments: {}", .0.join(", "))]
    MissingArguments(Vec<String>),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn export_not_found(name: &str, file: impl Into<PathBuf>) -> Self {
        Self::ExportNotFound {
            name: name.to_string(),
            file: file.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
