//! Syntax provider boundary.
//!
//! The resolver never touches a concrete parser. It asks a [`SyntaxProvider`]
//! for a [`ModuleSyntax`]: the module's top-level export constructs, local
//! declarations, import bindings and the comment stream, all with byte
//! offsets into the source text.
//!
//! - `oxc`: the shipped provider, backed by the OXC parser

mod oxc;

use std::path::Path;

use crate::error::Result;

pub use oxc::OxcSyntaxProvider;

/// Parses module source text into the constructs the resolver consumes.
///
/// Implementations must be pure functions of the source text. The path only
/// selects the dialect (TypeScript, JSX) and is used in error messages.
pub trait SyntaxProvider {
    fn parse_module(&self, path: &Path, source: &str) -> Result<ModuleSyntax>;
}

/// Everything the resolver needs to know about one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSyntax {
    /// Top-level export constructs in textual order.
    pub exports: Vec<ExportConstruct>,
    /// Top-level declarations, exported or not.
    pub declarations: Vec<LocalDeclaration>,
    pub imports: Vec<ImportBinding>,
    /// Comments sorted by start offset.
    pub comments: Vec<CommentBlock>,
}

impl ModuleSyntax {
    pub fn declaration(&self, name: &str) -> Option<&LocalDeclaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    pub fn import(&self, local: &str) -> Option<&ImportBinding> {
        self.imports.iter().find(|i| i.local == local)
    }

    /// Start of the `export default` statement, if the module has one.
    pub fn default_export(&self) -> Option<u32> {
        self.exports.iter().find_map(|e| match e {
            ExportConstruct::Default { start } => Some(*start),
            _ => None,
        })
    }
}

/// One top-level export statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportConstruct {
    /// `export * from './x'`, or `export * as ns from './x'` when `alias` is set.
    ReexportAll {
        source: String,
        alias: Option<String>,
        start: u32,
    },
    /// `export function f() {}`, `export const a = 1, b = 2`
    Declaration { names: Vec<String>, start: u32 },
    /// `export { a, b as c }`, optionally `from './x'`.
    List {
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
        start: u32,
    },
    /// `export default ...`
    Default { start: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSpecifier {
    /// Name inside the module that owns the value.
    pub local: String,
    /// Name it is visible under.
    pub exported: String,
}

/// A top-level binding declared in the module itself.
///
/// `start` is the start of the whole statement, including a leading `export`,
/// so documentation written above `export function f` is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDeclaration {
    pub name: String,
    pub start: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local: String,
    pub source: String,
    pub imported: ImportedName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedName {
    Named(String),
    Default,
    Namespace,
}

/// A comment with its byte span and raw text (delimiters included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBlock {
    pub start: u32,
    pub end: u32,
    pub text: String,
}

impl CommentBlock {
    /// `/** ... */` blocks carry documentation; `/* */` and `//` do not.
    pub fn is_doc(&self) -> bool {
        self.text.starts_with("/**") && !self.text.starts_with("/**/")
    }
}
