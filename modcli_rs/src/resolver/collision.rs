//! Export name collision policy.
//!
//! When several bindings share a name:
//! 1. If exactly one of them is defined in the entry file, it wins.
//! 2. Otherwise the last one in flattened order wins.
//!
//! Winners keep their own position; losers are dropped.

use std::collections::HashMap;
use std::path::Path;

use crate::types::ExportBinding;

pub(crate) fn apply_collision_policy(
    bindings: Vec<ExportBinding>,
    entry_file: &Path,
) -> Vec<ExportBinding> {
    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, binding) in bindings.iter().enumerate() {
        by_name.entry(binding.name.as_str()).or_default().push(idx);
    }

    let mut keep = vec![false; bindings.len()];
    for (name, indices) in &by_name {
        let local: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&idx| bindings[idx].defining_file == entry_file)
            .collect();
        let winner = match local.as_slice() {
            [only] => Some(*only),
            _ => indices.last().copied(),
        };
        match winner {
            Some(idx) => {
                if indices.len() > 1 {
                    tracing::debug!(
                        "export `{}` defined {} times, keeping {}",
                        name,
                        indices.len(),
                        bindings[idx].defining_file.display()
                    );
                }
                keep[idx] = true;
            }
            None => tracing::debug!("export `{}` has no surviving binding", name),
        }
    }

    bindings
        .into_iter()
        .zip(keep)
        .filter_map(|(binding, kept)| kept.then_some(binding))
        .collect()
}
