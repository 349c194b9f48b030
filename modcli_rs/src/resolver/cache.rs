//! Per-run source cache.
//!
//! Each file is read and parsed at most once per resolution run, even when
//! several in-flight tasks ask for it at the same time: they all wait on the
//! same cell.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tokio::sync::OnceCell;

use crate::error::{Error, Result};
use crate::syntax::{ModuleSyntax, SyntaxProvider};

/// A parsed module, immutable after creation.
#[derive(Debug)]
pub struct SourceModule {
    pub path: PathBuf,
    pub syntax: ModuleSyntax,
}

#[derive(Default)]
pub(crate) struct SourceCache {
    cells: RefCell<HashMap<PathBuf, Rc<OnceCell<Rc<SourceModule>>>>>,
}

impl SourceCache {
    pub(crate) async fn load<P: SyntaxProvider>(
        &self,
        provider: &P,
        path: &Path,
    ) -> Result<Rc<SourceModule>> {
        let cell = Rc::clone(self.cells.borrow_mut().entry(path.to_path_buf()).or_default());
        let module = cell
            .get_or_try_init(|| async {
                let source = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| Error::io(path, e))?;
                tracing::debug!("parsing {}", path.display());
                let syntax = provider.parse_module(path, &source)?;
                Ok::<_, Error>(Rc::new(SourceModule {
                    path: path.to_path_buf(),
                    syntax,
                }))
            })
            .await?;
        Ok(Rc::clone(module))
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.cells.borrow().len()
    }
}
