//! Operation: resolve a universe file and report the outcome.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use depsys_core::element::Element;
use depsys_resolver::ResolutionDelta;
use depsys_util::errors::{DepsysError, DepsysResult};
use depsys_util::progress;

use crate::load_system;

/// Options for `depsys resolve`.
#[derive(Debug, Default)]
pub struct ResolveOptions {
    /// Emit `{ resolved, delta }` as JSON instead of text.
    pub json: bool,
    /// Resolve without recording a delta.
    pub no_delta: bool,
    /// Resolver settings file overriding the universe's `[resolver]` table.
    pub config: Option<PathBuf>,
}

#[derive(Serialize)]
struct ResolvedEntry<'a> {
    id: &'a str,
    version: &'a str,
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    resolved: Vec<ResolvedEntry<'a>>,
    delta: &'a ResolutionDelta,
}

/// Resolve `path` and print the resolved elements and the delta.
pub fn resolve(path: &Path, opts: &ResolveOptions) -> DepsysResult<()> {
    print!("{}", render(path, opts)?);
    Ok(())
}

/// The text `resolve` prints.
pub fn render(path: &Path, opts: &ResolveOptions) -> DepsysResult<String> {
    let mut loaded = load_system(path, opts.config.as_deref())?;
    if !opts.json {
        progress::status("Resolving", &path.display().to_string());
    }

    let produce_delta = loaded.config.produce_delta && !opts.no_delta;
    let delta = loaded.system.resolve_with(produce_delta)?;
    let resolved = loaded.system.resolved();
    let total = loaded.universe.elements.len();

    if opts.json {
        return to_json(&resolved, &delta);
    }

    progress::status(
        "Resolved",
        &format!("{} of {total} elements", resolved.len()),
    );
    if resolved.len() < total {
        progress::status_warn(
            "Unresolved",
            &format!("{} elements (run `depsys status` for details)", total - resolved.len()),
        );
    }

    let mut out = String::new();
    for element in &resolved {
        let _ = writeln!(out, "{element}");
    }
    if produce_delta {
        let _ = writeln!(out);
        let _ = write!(out, "{delta}");
        if delta.is_empty() {
            let _ = writeln!(out);
        }
    }
    Ok(out)
}

fn to_json(resolved: &[Element], delta: &ResolutionDelta) -> DepsysResult<String> {
    let report = ResolveReport {
        resolved: resolved
            .iter()
            .map(|e| ResolvedEntry {
                id: e.id(),
                version: e.version(),
            })
            .collect(),
        delta,
    };
    let mut json = serde_json::to_string_pretty(&report).map_err(|e| DepsysError::Generic {
        message: format!("Failed to serialize resolve report: {e}"),
    })?;
    json.push('\n');
    Ok(json)
}
