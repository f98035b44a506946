//! Operation: resolve one universe, move it incrementally to another, and
//! report what the second resolve changed.

use std::collections::BTreeMap;
use std::path::Path;

use depsys_core::universe::{ElementSpec, Universe};
use depsys_resolver::ResolutionDelta;
use depsys_util::errors::DepsysResult;
use depsys_util::progress;

use crate::load_system;

/// Resolve `old`, apply the differences to `new`, resolve again and print
/// the second delta.
pub fn diff(old: &Path, new: &Path) -> DepsysResult<()> {
    print!("{}", render(old, new)?);
    Ok(())
}

pub fn render(old: &Path, new: &Path) -> DepsysResult<String> {
    let delta = run(old, new)?;
    Ok(if delta.is_empty() {
        format!("{delta}\n")
    } else {
        delta.to_string()
    })
}

/// The delta produced by moving the resolved `old` universe to `new`.
///
/// Elements are matched by `id@version`; an entry whose content changed is
/// removed and added back. Resolver settings always come from `old`.
pub fn run(old: &Path, new: &Path) -> DepsysResult<ResolutionDelta> {
    let mut loaded = load_system(old, None)?;
    loaded.system.resolve()?;
    progress::status(
        "Resolved",
        &format!("{} ({} elements)", old.display(), loaded.system.resolved().len()),
    );

    let target = Universe::from_path(new)?;
    if target.resolver_config() != loaded.config {
        progress::status_warn(
            "Ignoring",
            &format!("resolver settings of {}", new.display()),
        );
    }

    let before = by_key(&loaded.universe);
    let after = by_key(&target);

    let mut removed = 0usize;
    for (key, spec) in &before {
        if after.get(key) != Some(spec) {
            loaded.system.remove_element(&spec.to_element()?);
            removed += 1;
        }
    }
    let mut added = 0usize;
    for (key, spec) in &after {
        if before.get(key) != Some(spec) {
            loaded.system.add_element(spec.to_element()?);
            added += 1;
        }
    }
    tracing::debug!("Applying {removed} removals and {added} additions");
    progress::status_info("Updating", &format!("{removed} removed, {added} added"));

    let delta = loaded.system.resolve()?;
    progress::status("Resolved", &format!("{} ({} changes)", new.display(), delta.len()));
    Ok(delta)
}

fn by_key(universe: &Universe) -> BTreeMap<String, &ElementSpec> {
    universe
        .elements
        .iter()
        .map(|spec| (spec.key(), spec))
        .collect()
}
