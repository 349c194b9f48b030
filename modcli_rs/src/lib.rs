//! # modcli
//!
//! **Turn a JavaScript/TypeScript module into a command line.** modcli reads
//! the exports of an entry module, follows its re-export chains, keeps the
//! exports that carry a JSDoc block and binds command-line tokens to their
//! documented parameters.
//!
//! ## Features
//!
//! - **Export Graph Resolution** - `export *`, named and aliased re-exports,
//!   flattened in textual order with local declarations shadowing re-exports
//! - **JSDoc Contracts** - `@param` tags with types, optional `[name]` markers
//!   and dotted `opts.field` paths become the command's parameters
//! - **Argument Binding** - positional required values, `--option` keywords,
//!   `--no-flag` negation, repeated arrays and merged objects
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,no_run
//! use modcli::{ExportGraphResolver, ModcliConfig, bind};
//! use std::path::Path;
//!
//! let resolver = ExportGraphResolver::new(&ModcliConfig::default());
//! let descriptor = resolver.resolve_blocking(Path::new("cli.js")).unwrap();
//!
//! let tokens: Vec<String> = vec!["greet".into(), "world".into(), "--loud".into()];
//! let invocation = bind(&descriptor, &tokens).unwrap();
//! println!("{} {:?}", invocation.command, invocation.values);
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! modcli --describe cli.js        # Print the command descriptor
//! modcli cli.js greet world --loud
//! ```

pub mod binder;
pub mod config;
pub mod docs;
pub mod error;
pub mod manifest;
pub mod resolver;
pub mod syntax;
pub mod types;

pub use binder::{bind, get_value};
pub use config::ModcliConfig;
pub use error::{Error, Result};
pub use modcli_common::{Documentation, ParameterTag};
pub use resolver::{ExportGraphResolver, SourceModule};
pub use syntax::{OxcSyntaxProvider, SyntaxProvider};
pub use types::{BoundInvocation, CliDescriptor, ExportBinding};
