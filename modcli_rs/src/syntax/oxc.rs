//! OXC-backed syntax provider.
//!
//! Walks the top-level statements of a JS/TS module and records:
//! - Re-exports: `export * from './x'`, `export * as ns from './x'`
//! - Named exports: `export const x = 1;`, `export function foo() {}`
//! - Export lists: `export { foo, bar as baz }`, `export { foo } from './bar'`
//! - Default exports: `export default function () {}`
//! - Local declarations and import bindings, so export lists can be followed
//!
//! Type-only exports and imports are skipped: nothing can be invoked through them.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::error::{Error, Result};

use super::{
    CommentBlock, ExportConstruct, ExportSpecifier, ImportBinding, ImportedName,
    LocalDeclaration, ModuleSyntax, SyntaxProvider,
};

/// Parses modules with `oxc_parser`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OxcSyntaxProvider;

impl SyntaxProvider for OxcSyntaxProvider {
    fn parse_module(&self, path: &Path, source: &str) -> Result<ModuleSyntax> {
        let allocator = Allocator::default();

        // JSX only for .jsx/.tsx: `<T>(x: T) => x` is a generic arrow elsewhere
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let is_jsx_file = ext == "tsx" || ext == "jsx";
        let source_type = SourceType::from_path(path)
            .unwrap_or_default()
            .with_typescript(true)
            .with_jsx(is_jsx_file);

        let ret = Parser::new(&allocator, source, source_type).parse();
        if ret.panicked || !ret.errors.is_empty() {
            let message = ret
                .errors
                .first()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unrecoverable syntax error".to_string());
            return Err(Error::Parse {
                file: path.to_path_buf(),
                message,
            });
        }

        let mut collector = ModuleCollector::default();
        for stmt in &ret.program.body {
            collector.handle_statement(stmt);
        }

        let mut comments: Vec<CommentBlock> = ret
            .program
            .comments
            .iter()
            .map(|c| CommentBlock {
                start: c.span.start,
                end: c.span.end,
                text: source[c.span.start as usize..c.span.end as usize].to_string(),
            })
            .collect();
        comments.sort_by_key(|c| c.start);

        tracing::trace!(
            "parsed {}: {} exports, {} declarations, {} comments",
            path.display(),
            collector.syntax.exports.len(),
            collector.syntax.declarations.len(),
            comments.len()
        );

        collector.syntax.comments = comments;
        Ok(collector.syntax)
    }
}

#[derive(Default)]
struct ModuleCollector {
    syntax: ModuleSyntax,
}

impl ModuleCollector {
    fn handle_statement(&mut self, stmt: &Statement<'_>) {
        match stmt {
            Statement::ImportDeclaration(decl) => self.handle_import_declaration(decl),
            Statement::ExportAllDeclaration(decl) => self.handle_export_all_declaration(decl),
            Statement::ExportNamedDeclaration(decl) => self.handle_export_named_declaration(decl),
            Statement::ExportDefaultDeclaration(decl) => {
                self.handle_export_default_declaration(decl)
            }
            Statement::FunctionDeclaration(f) => {
                if let Some(id) = &f.id {
                    self.declare(id.name.to_string(), f.span.start);
                }
            }
            Statement::ClassDeclaration(c) => {
                if let Some(id) = &c.id {
                    self.declare(id.name.to_string(), c.span.start);
                }
            }
            Statement::VariableDeclaration(var) => {
                for name in variable_names(var) {
                    self.declare(name, var.span.start);
                }
            }
            _ => {}
        }
    }

    fn declare(&mut self, name: String, start: u32) {
        self.syntax
            .declarations
            .push(LocalDeclaration { name, start });
    }

    fn handle_import_declaration(&mut self, decl: &ImportDeclaration<'_>) {
        if matches!(decl.import_kind, ImportOrExportKind::Type) {
            return;
        }
        let Some(specifiers) = &decl.specifiers else {
            // Side-effect import
            return;
        };
        let source = decl.source.value.to_string();

        for spec in specifiers {
            let (local, imported) = match spec {
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                    (s.local.name.to_string(), ImportedName::Default)
                }
                ImportDeclarationSpecifier::ImportSpecifier(s) => {
                    if matches!(s.import_kind, ImportOrExportKind::Type) {
                        continue;
                    }
                    let name = export_name(&s.imported);
                    let imported = if name == "default" {
                        ImportedName::Default
                    } else {
                        ImportedName::Named(name)
                    };
                    (s.local.name.to_string(), imported)
                }
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                    (s.local.name.to_string(), ImportedName::Namespace)
                }
            };
            self.syntax.imports.push(ImportBinding {
                local,
                source: source.clone(),
                imported,
            });
        }
    }

    fn handle_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'_>) {
        if matches!(decl.export_kind, ImportOrExportKind::Type) {
            return;
        }
        self.syntax.exports.push(ExportConstruct::ReexportAll {
            source: decl.source.value.to_string(),
            alias: decl.exported.as_ref().map(export_name),
            start: decl.span.start,
        });
    }

    fn handle_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'_>) {
        if matches!(decl.export_kind, ImportOrExportKind::Type) {
            return;
        }
        let start = decl.span.start;

        if let Some(declaration) = &decl.declaration {
            let names = match declaration {
                Declaration::VariableDeclaration(var) => variable_names(var),
                Declaration::FunctionDeclaration(f) => {
                    f.id.iter().map(|id| id.name.to_string()).collect()
                }
                Declaration::ClassDeclaration(c) => {
                    c.id.iter().map(|id| id.name.to_string()).collect()
                }
                // Interfaces, type aliases, enums and namespaces are not callable
                _ => Vec::new(),
            };
            if names.is_empty() {
                return;
            }
            for name in &names {
                self.declare(name.clone(), start);
            }
            self.syntax
                .exports
                .push(ExportConstruct::Declaration { names, start });
            return;
        }

        let specifiers: Vec<ExportSpecifier> = decl
            .specifiers
            .iter()
            .filter(|spec| !matches!(spec.export_kind, ImportOrExportKind::Type))
            .map(|spec| ExportSpecifier {
                local: export_name(&spec.local),
                exported: export_name(&spec.exported),
            })
            .collect();
        if specifiers.is_empty() {
            return;
        }
        self.syntax.exports.push(ExportConstruct::List {
            specifiers,
            source: decl.source.as_ref().map(|s| s.value.to_string()),
            start,
        });
    }

    fn handle_export_default_declaration(&mut self, decl: &ExportDefaultDeclaration<'_>) {
        let start = decl.span.start;
        // A named default function/class is also a module-scope binding
        let local_name = match &decl.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(f) => {
                f.id.as_ref().map(|id| id.name.to_string())
            }
            ExportDefaultDeclarationKind::ClassDeclaration(c) => {
                c.id.as_ref().map(|id| id.name.to_string())
            }
            ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => return,
            _ => None,
        };
        if let Some(name) = local_name {
            self.declare(name, start);
        }
        self.syntax.exports.push(ExportConstruct::Default { start });
    }
}

fn variable_names(var: &VariableDeclaration<'_>) -> Vec<String> {
    var.declarations
        .iter()
        .filter_map(|d| match &d.id {
            BindingPattern::BindingIdentifier(id) => Some(id.name.to_string()),
            _ => None,
        })
        .collect()
}

fn export_name(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.to_string(),
        ModuleExportName::IdentifierReference(id) => id.name.to_string(),
        ModuleExportName::StringLiteral(str) => str.value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str, file: &str) -> ModuleSyntax {
        OxcSyntaxProvider
            .parse_module(Path::new(file), content)
            .expect("valid module")
    }

    #[test]
    fn collects_export_constructs_in_order() {
        let content = r#"
            import { helper } from "./helper";
            export * from "./all";
            export const a = 1, b = () => 2;
            export function run() {}
            export { helper as help, local };
            export { remote as renamed } from "./remote";
            export default class {}
            const local = 3;
        "#;

        let syntax = parse(content, "src/index.js");
        assert_eq!(syntax.exports.len(), 6);

        assert!(matches!(
            &syntax.exports[0],
            ExportConstruct::ReexportAll { source, alias: None, .. } if source == "./all"
        ));
        match &syntax.exports[1] {
            ExportConstruct::Declaration { names, .. } => {
                assert_eq!(names, &vec!["a".to_string(), "b".to_string()])
            }
            other => panic!("unexpected {:?}", other),
        }
        match &syntax.exports[3] {
            ExportConstruct::List {
                specifiers, source, ..
            } => {
                assert!(source.is_none());
                assert_eq!(specifiers[0].local, "helper");
                assert_eq!(specifiers[0].exported, "help");
                assert_eq!(specifiers[1].exported, "local");
            }
            other => panic!("unexpected {:?}", other),
        }
        match &syntax.exports[4] {
            ExportConstruct::List { source, .. } => {
                assert_eq!(source.as_deref(), Some("./remote"))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(syntax.default_export().is_some());
    }

    #[test]
    fn declaration_start_includes_export_keyword() {
        let content = "/** doc */\nexport function run() {}\n";
        let syntax = parse(content, "mod.js");
        let decl = syntax.declaration("run").expect("run declared");
        assert_eq!(decl.start as usize, content.find("export").unwrap());
    }

    #[test]
    fn records_local_declarations_and_imports() {
        let content = r#"
            import def, { x as y } from "./dep";
            import * as ns from "./ns";
            function hidden() {}
            class Thing {}
            let counter = 0;
        "#;
        let syntax = parse(content, "mod.ts");

        assert!(syntax.declaration("hidden").is_some());
        assert!(syntax.declaration("Thing").is_some());
        assert!(syntax.declaration("counter").is_some());

        assert_eq!(syntax.import("def").unwrap().imported, ImportedName::Default);
        assert_eq!(
            syntax.import("y").unwrap().imported,
            ImportedName::Named("x".to_string())
        );
        assert_eq!(syntax.import("ns").unwrap().imported, ImportedName::Namespace);
        assert_eq!(syntax.import("ns").unwrap().source, "./ns");
    }

    #[test]
    fn skips_type_only_exports() {
        let content = r#"
            export type Id = string;
            export interface Shape { w: number }
            export type { Other } from "./other";
            export function area(s: Shape): number { return s.w; }
        "#;
        let syntax = parse(content, "shapes.ts");
        assert_eq!(syntax.exports.len(), 1);
    }

    #[test]
    fn collects_comments_with_spans() {
        let content = "// line\n/** doc */\nexport const x = 1;\n";
        let syntax = parse(content, "x.js");
        assert_eq!(syntax.comments.len(), 2);
        assert_eq!(syntax.comments[1].text, "/** doc */");
        assert!(syntax.comments[1].is_doc());
        assert!(syntax.comments[0].end <= syntax.comments[1].start);
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = OxcSyntaxProvider
            .parse_module(Path::new("bad.js"), "export function (")
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn star_as_namespace_keeps_alias() {
        let syntax = parse("export * as tools from './tools';", "i.js");
        assert!(matches!(
            &syntax.exports[0],
            ExportConstruct::ReexportAll { alias: Some(a), .. } if a == "tools"
        ));
    }
}
