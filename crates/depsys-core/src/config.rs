use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use depsys_util::errors::DepsysError;

use crate::comparator::{MavenOrdering, SemverOrdering, VersionComparator};

/// Resolver settings, read from a standalone TOML file or from the
/// `[resolver]` table of a universe file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolverConfig {
    #[serde(default)]
    pub comparator: ComparatorKind,

    #[serde(default)]
    pub policy: PolicyKind,

    #[serde(default = "default_produce_delta")]
    pub produce_delta: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            comparator: ComparatorKind::default(),
            policy: PolicyKind::default(),
            produce_delta: default_produce_delta(),
        }
    }
}

fn default_produce_delta() -> bool {
    true
}

/// Built-in version orderings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparatorKind {
    #[default]
    Maven,
    Semver,
}

/// Built-in selection policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// Keep every satisfied version; the highest one for singleton sets.
    #[default]
    AllSatisfied,
    /// Keep only the highest satisfied version.
    Highest,
}

impl FromStr for ComparatorKind {
    type Err = DepsysError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maven" => Ok(Self::Maven),
            "semver" => Ok(Self::Semver),
            other => Err(DepsysError::Config {
                message: format!("unknown comparator '{other}' (expected maven or semver)"),
            }),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = DepsysError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all-satisfied" => Ok(Self::AllSatisfied),
            "highest" => Ok(Self::Highest),
            other => Err(DepsysError::Config {
                message: format!("unknown policy '{other}' (expected all-satisfied or highest)"),
            }),
        }
    }
}

impl ResolverConfig {
    /// Load a config file, or return defaults if it doesn't exist.
    pub fn load(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            tracing::debug!("No resolver config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| DepsysError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content).map_err(Into::into)
    }

    pub fn parse_toml(content: &str) -> Result<Self, DepsysError> {
        toml::from_str(content).map_err(|e| DepsysError::Config {
            message: format!("Failed to parse resolver config: {e}"),
        })
    }

    pub fn comparator(&self) -> Arc<dyn VersionComparator> {
        match self.comparator {
            ComparatorKind::Maven => Arc::new(MavenOrdering),
            ComparatorKind::Semver => Arc::new(SemverOrdering),
        }
    }
}
