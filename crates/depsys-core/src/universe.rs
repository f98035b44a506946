//! TOML description of a set of elements to feed into a dependency system.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use depsys_util::errors::DepsysError;

use crate::config::ResolverConfig;
use crate::dependency::Dependency;
use crate::element::Element;
use crate::match_rule;

/// Rule used when a dependency names a version but no `match`.
pub const DEFAULT_MATCH_RULE: &str = "compatible";

/// The parsed representation of a universe file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Universe {
    #[serde(default)]
    pub resolver: Option<ResolverConfig>,

    #[serde(default, rename = "element")]
    pub elements: Vec<ElementSpec>,
}

/// One `[[element]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub singleton: bool,
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
}

/// A dependency entry inside an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    pub id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, rename = "match")]
    pub rule: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

impl Universe {
    /// Load and validate a universe file.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DepsysError::Universe {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse_toml(&content).map_err(Into::into)
    }

    /// Parse and validate universe TOML.
    pub fn parse_toml(content: &str) -> Result<Self, DepsysError> {
        let universe: Universe = toml::from_str(content).map_err(|e| DepsysError::Universe {
            message: format!("Failed to parse universe: {e}"),
        })?;
        universe.validate()?;
        Ok(universe)
    }

    fn validate(&self) -> Result<(), DepsysError> {
        let mut seen = BTreeSet::new();
        for spec in &self.elements {
            if !seen.insert(spec.key()) {
                return Err(DepsysError::Universe {
                    message: format!("duplicate element {}", spec.key()),
                });
            }
            for dep in &spec.dependencies {
                dep.rule()?;
            }
        }
        Ok(())
    }

    /// Resolver settings from the `[resolver]` table, or defaults.
    pub fn resolver_config(&self) -> ResolverConfig {
        self.resolver.clone().unwrap_or_default()
    }

    /// Build engine elements, in file order.
    pub fn elements(&self) -> Result<Vec<Element>, DepsysError> {
        self.elements.iter().map(ElementSpec::to_element).collect()
    }

    pub fn find(&self, key: &str) -> Option<&ElementSpec> {
        self.elements.iter().find(|spec| spec.key() == key)
    }
}

impl ElementSpec {
    /// `id@version`, unique within a universe.
    pub fn key(&self) -> String {
        format!("{}@{}", self.id, self.version)
    }

    pub fn to_element(&self) -> Result<Element, DepsysError> {
        let dependencies = self
            .dependencies
            .iter()
            .map(DependencySpec::to_dependency)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Element::new(
            self.id.clone(),
            self.version.clone(),
            dependencies,
            self.singleton,
        ))
    }
}

impl DependencySpec {
    fn rule(&self) -> Result<match_rule::SharedRule, DepsysError> {
        let name = self.rule.as_deref().unwrap_or(DEFAULT_MATCH_RULE);
        match_rule::by_name(name).ok_or_else(|| DepsysError::Universe {
            message: format!("unknown match rule '{name}' on dependency '{}'", self.id),
        })
    }

    pub fn to_dependency(&self) -> Result<Dependency, DepsysError> {
        Ok(Dependency::new(
            self.id.clone(),
            self.rule()?,
            self.version.clone(),
            self.optional,
        ))
    }
}
