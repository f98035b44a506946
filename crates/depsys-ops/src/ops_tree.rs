//! Operation: display the resolved element tree.

use std::fmt::Write;
use std::path::Path;

use depsys_resolver::ResolvedTree;
use depsys_util::errors::DepsysResult;

use crate::load_system;

/// Options for `depsys tree`.
#[derive(Debug, Default)]
pub struct TreeOptions {
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
    /// Show dependents instead of dependencies.
    pub inverted: bool,
    /// Show how an identity (or `id@version`) gets pulled in.
    pub why: Option<String>,
}

/// Resolve `path` and print its tree.
pub fn tree(path: &Path, opts: &TreeOptions) -> DepsysResult<()> {
    print!("{}", render(path, opts)?);
    Ok(())
}

pub fn render(path: &Path, opts: &TreeOptions) -> DepsysResult<String> {
    let mut loaded = load_system(path, None)?;
    loaded.system.resolve_with(false)?;
    let tree = ResolvedTree::from_system(&loaded.system);
    tracing::debug!("Tree has {} resolved elements", tree.len());

    if let Some(target) = &opts.why {
        return Ok(why(&tree, target, opts.inverted));
    }

    if opts.inverted {
        let inverted = tree.print_full_inverted_tree();
        if inverted.is_empty() {
            return Ok("No dependencies.\n".to_string());
        }
        return Ok(inverted);
    }

    if tree.is_empty() {
        return Ok("Nothing resolved.\n".to_string());
    }
    Ok(tree.print_tree(opts.depth))
}

fn why(tree: &ResolvedTree, target: &str, inverted: bool) -> String {
    if inverted {
        let output = tree.print_inverted_tree(target);
        if output.is_empty() {
            return format!("'{target}' is not resolved.\n");
        }
        return output;
    }

    let Some(path) = tree.find_path(target) else {
        return format!("'{target}' is not resolved.\n");
    };
    let mut out = format!("Path to {target}:\n");
    for (i, node) in path.iter().enumerate() {
        let indent = "  ".repeat(i);
        let _ = writeln!(out, "{indent}{node}");
    }
    out
}
