//! Export graph resolution.
//!
//! Walks an entry module's export constructs, follows re-export chains across
//! files and produces the flat, de-duplicated, documented export list of a
//! [`CliDescriptor`].
//!
//! # Module Structure
//!
//! - `cache`: per-run parsed module cache
//! - `collision`: duplicate export name policy
//! - `specifier`: module specifier to file path resolution
//!
//! Sub-resolutions run concurrently on one thread. Their results land in
//! slots indexed by the construct that requested them, so the output order is
//! the textual order of the entry module with `export *` expansions inlined,
//! whatever order the work completes in.

mod cache;
mod collision;
mod specifier;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, join_all, try_join_all};

use crate::config::ModcliConfig;
use crate::docs::{DocParser, match_documentation};
use crate::error::{Error, Result};
use crate::syntax::{ExportConstruct, ImportedName, OxcSyntaxProvider, SyntaxProvider};
use crate::types::{CliDescriptor, ExportBinding};

pub use cache::SourceModule;
pub(crate) use specifier::SpecifierResolver;

use cache::SourceCache;
use collision::apply_collision_policy;

/// Resolve `entry` with the OXC provider and default configuration.
pub async fn resolve(entry: &Path) -> Result<CliDescriptor> {
    ExportGraphResolver::new(&ModcliConfig::default())
        .resolve(entry)
        .await
}

/// Builds [`CliDescriptor`]s from entry modules.
pub struct ExportGraphResolver<P = OxcSyntaxProvider> {
    provider: P,
    specifiers: SpecifierResolver,
    docs: DocParser,
}

impl ExportGraphResolver<OxcSyntaxProvider> {
    pub fn new(config: &ModcliConfig) -> Self {
        Self::with_provider(OxcSyntaxProvider, config)
    }
}

impl<P: SyntaxProvider> ExportGraphResolver<P> {
    pub fn with_provider(provider: P, config: &ModcliConfig) -> Self {
        Self {
            provider,
            specifiers: SpecifierResolver::new(&config.resolve),
            docs: DocParser::new(&config.docs),
        }
    }

    /// Resolve the export surface of `entry`.
    ///
    /// Fails with [`Error::FileNotFound`] or [`Error::NotAFile`] when the
    /// entry path is missing or a directory.
    pub async fn resolve(&self, entry: &Path) -> Result<CliDescriptor> {
        let entry = check_entry(entry).await?;
        tracing::debug!("resolving exports of {}", entry.display());

        let run = ResolutionRun {
            resolver: self,
            cache: SourceCache::default(),
            entry,
        };
        run.resolve().await
    }

    /// Drive [`resolve`](Self::resolve) on a fresh current-thread runtime.
    ///
    /// Must not be called from inside another tokio runtime.
    pub fn resolve_blocking(&self, entry: &Path) -> Result<CliDescriptor> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::io(entry, e))?;
        runtime.block_on(self.resolve(entry))
    }
}

async fn check_entry(entry: &Path) -> Result<PathBuf> {
    let metadata = match tokio::fs::metadata(entry).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::FileNotFound(entry.to_path_buf()));
        }
        Err(e) => return Err(Error::io(entry, e)),
    };
    if metadata.is_dir() {
        return Err(Error::NotAFile(entry.to_path_buf()));
    }
    tokio::fs::canonicalize(entry)
        .await
        .map_err(|e| Error::io(entry, e))
}

/// Where a name is really defined.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Location {
    file: PathBuf,
    position: Option<u32>,
}

impl Location {
    fn at(file: &Path, position: u32) -> Self {
        Self {
            file: file.to_path_buf(),
            position: Some(position),
        }
    }

    fn unlocated(file: &Path) -> Self {
        Self {
            file: file.to_path_buf(),
            position: None,
        }
    }
}

/// State of one `resolve` call.
struct ResolutionRun<'r, P> {
    resolver: &'r ExportGraphResolver<P>,
    cache: SourceCache,
    entry: PathBuf,
}

impl<P: SyntaxProvider> ResolutionRun<'_, P> {
    async fn resolve(&self) -> Result<CliDescriptor> {
        let flattened = self.collect(self.entry.clone(), Vec::new()).await?;
        let unique = apply_collision_policy(flattened, &self.entry);

        let documented = try_join_all(
            unique
                .into_iter()
                .map(|binding| self.attach_documentation(binding)),
        )
        .await?;

        let exports: Vec<ExportBinding> = documented
            .into_iter()
            .filter(|binding| {
                let keep = binding.position.is_some() && binding.documentation.is_some();
                if !keep {
                    tracing::debug!("dropping undocumented export `{}`", binding.name);
                }
                keep
            })
            .collect();

        Ok(CliDescriptor::new(&self.entry, exports))
    }

    async fn load(&self, path: &Path) -> Result<Rc<SourceModule>> {
        self.cache.load(&self.resolver.provider, path).await
    }

    /// Flattened bindings of `file`, in textual order.
    ///
    /// `stack` holds the files whose `export *` led here, for cycle detection.
    fn collect(
        &self,
        file: PathBuf,
        stack: Vec<PathBuf>,
    ) -> LocalBoxFuture<'_, Result<Vec<ExportBinding>>> {
        async move {
            let module = self.load(&file).await?;
            let mut stack = stack;
            stack.push(file);

            // One slot per construct, filled concurrently, flattened in order
            let slots = try_join_all(
                module
                    .syntax
                    .exports
                    .iter()
                    .map(|construct| self.expand(&module, construct, &stack)),
            )
            .await?;
            Ok(slots.into_iter().flatten().collect())
        }
        .boxed_local()
    }

    async fn expand(
        &self,
        module: &SourceModule,
        construct: &ExportConstruct,
        stack: &[PathBuf],
    ) -> Result<Vec<ExportBinding>> {
        let file = module.path.as_path();
        match construct {
            ExportConstruct::ReexportAll {
                source,
                alias: None,
                ..
            } => {
                let target = self.resolver.specifiers.resolve(file, source)?;
                if stack.contains(&target) {
                    tracing::warn!(
                        "skipping cyclic `export * from '{}'` in {}",
                        source,
                        file.display()
                    );
                    return Ok(Vec::new());
                }
                let bindings = self.collect(target, stack.to_vec()).await?;
                // `export *` never forwards a default export
                Ok(bindings.into_iter().filter(|b| b.name != "default").collect())
            }
            ExportConstruct::ReexportAll {
                source,
                alias: Some(alias),
                ..
            } => {
                let target = self.resolver.specifiers.resolve(file, source)?;
                Ok(vec![ExportBinding::new(alias.clone(), target, None)])
            }
            ExportConstruct::Declaration { names, start } => Ok(names
                .iter()
                .map(|name| ExportBinding::new(name.clone(), file, Some(*start)))
                .collect()),
            ExportConstruct::List {
                specifiers,
                source: Some(source),
                ..
            } => {
                let target = self.resolver.specifiers.resolve(file, source)?;
                let located = try_join_all(
                    specifiers
                        .iter()
                        .map(|spec| self.locate(target.clone(), spec.local.clone(), Vec::new())),
                )
                .await?;
                Ok(specifiers
                    .iter()
                    .zip(located)
                    .map(|(spec, loc)| ExportBinding::new(spec.exported.clone(), loc.file, loc.position))
                    .collect())
            }
            ExportConstruct::List {
                specifiers,
                source: None,
                ..
            } => {
                let located = join_all(specifiers.iter().map(|spec| async move {
                    match self.follow_local(module, &spec.local, Vec::new()).await {
                        Ok(loc) => loc,
                        Err(e) => {
                            tracing::warn!(
                                "cannot locate `{}` exported from {}: {}",
                                spec.local,
                                file.display(),
                                e
                            );
                            Location::unlocated(file)
                        }
                    }
                }))
                .await;
                Ok(specifiers
                    .iter()
                    .zip(located)
                    .map(|(spec, loc)| ExportBinding::new(spec.exported.clone(), loc.file, loc.position))
                    .collect())
            }
            ExportConstruct::Default { start } => {
                Ok(vec![ExportBinding::new("default", file, Some(*start))])
            }
        }
    }

    /// Find the declaration `name` refers to inside `file`.
    ///
    /// Checks, in order: the default export, a top-level declaration, an
    /// export list entry, a namespace re-export, then every `export *`.
    fn locate(
        &self,
        file: PathBuf,
        name: String,
        visited: Vec<(PathBuf, String)>,
    ) -> LocalBoxFuture<'_, Result<Location>> {
        async move {
            let key = (file.clone(), name.clone());
            if visited.contains(&key) {
                return Err(Error::export_not_found(&name, &file));
            }
            let mut visited = visited;
            visited.push(key);

            let module = self.load(&file).await?;
            let syntax = &module.syntax;

            if name == "default" {
                if let Some(start) = syntax.default_export() {
                    return Ok(Location::at(&file, start));
                }
            }
            if let Some(decl) = syntax.declaration(&name) {
                return Ok(Location::at(&file, decl.start));
            }

            for construct in &syntax.exports {
                match construct {
                    ExportConstruct::List {
                        specifiers, source, ..
                    } => {
                        let Some(spec) = specifiers.iter().find(|s| s.exported == name) else {
                            continue;
                        };
                        return match source {
                            Some(source) => {
                                let target = self.resolver.specifiers.resolve(&file, source)?;
                                self.locate(target, spec.local.clone(), visited).await
                            }
                            None => self.follow_local(&module, &spec.local, visited).await,
                        };
                    }
                    ExportConstruct::ReexportAll {
                        source,
                        alias: Some(alias),
                        ..
                    } if *alias == name => {
                        let target = self.resolver.specifiers.resolve(&file, source)?;
                        return Ok(Location::unlocated(&target));
                    }
                    _ => {}
                }
            }

            if name != "default" {
                for construct in &syntax.exports {
                    let ExportConstruct::ReexportAll {
                        source,
                        alias: None,
                        ..
                    } = construct
                    else {
                        continue;
                    };
                    let target = self.resolver.specifiers.resolve(&file, source)?;
                    match self.locate(target, name.clone(), visited.clone()).await {
                        Ok(loc) => return Ok(loc),
                        Err(Error::ExportNotFound { .. }) => continue,
                        Err(e) => return Err(e),
                    }
                }
            }

            Err(Error::export_not_found(&name, &file))
        }
        .boxed_local()
    }

    /// Resolve a module-local name: a declaration, or an import followed to
    /// the file that defines it.
    async fn follow_local(
        &self,
        module: &SourceModule,
        local: &str,
        visited: Vec<(PathBuf, String)>,
    ) -> Result<Location> {
        let syntax = &module.syntax;
        if let Some(decl) = syntax.declaration(local) {
            return Ok(Location::at(&module.path, decl.start));
        }
        let Some(import) = syntax.import(local) else {
            return Ok(Location::unlocated(&module.path));
        };

        let target = self.resolver.specifiers.resolve(&module.path, &import.source)?;
        match &import.imported {
            ImportedName::Named(name) => self.locate(target, name.clone(), visited).await,
            ImportedName::Default => self.locate(target, "default".to_string(), visited).await,
            ImportedName::Namespace => Ok(Location::unlocated(&target)),
        }
    }

    async fn attach_documentation(&self, mut binding: ExportBinding) -> Result<ExportBinding> {
        let Some(position) = binding.position else {
            return Ok(binding);
        };
        let module = self.load(&binding.defining_file).await?;
        binding.documentation = match_documentation(&module.syntax.comments, position)
            .map(|block| self.resolver.docs.parse(&block.text));
        Ok(binding)
    }
}
