pub mod ops_diff;
pub mod ops_resolve;
pub mod ops_status;
pub mod ops_tree;

use std::path::Path;

use depsys_core::config::ResolverConfig;
use depsys_core::universe::Universe;
use depsys_resolver::DependencySystem;
use depsys_util::errors::DepsysResult;

/// A universe file loaded into a fresh, not yet resolved, system.
#[derive(Debug)]
pub struct LoadedSystem {
    pub system: DependencySystem,
    pub universe: Universe,
    pub config: ResolverConfig,
}

/// Parse `path` and add every element it lists to a new system.
///
/// Resolver settings come from `config_path` when given, else from the
/// universe's `[resolver]` table.
pub fn load_system(path: &Path, config_path: Option<&Path>) -> DepsysResult<LoadedSystem> {
    let universe = Universe::from_path(path)?;
    let config = match config_path {
        Some(config_path) => ResolverConfig::load(config_path)?,
        None => universe.resolver_config(),
    };
    tracing::debug!(
        "Loaded {} elements from {} ({:?} ordering, {:?} policy)",
        universe.elements.len(),
        path.display(),
        config.comparator,
        config.policy
    );

    let mut system = DependencySystem::with_config(&config);
    system.add_elements(universe.elements()?);
    Ok(LoadedSystem {
        system,
        universe,
        config,
    })
}
