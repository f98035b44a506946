use std::fmt;
use std::sync::Arc;

use crate::comparator::VersionComparator;
use crate::match_rule::{self, AnyVersion, SharedRule};

/// A constraint from one element to another identity.
///
/// When no version is required the match rule is forced to
/// [`AnyVersion`]: the existence of some version is enough.
#[derive(Debug, Clone)]
pub struct Dependency {
    required_id: String,
    required_version: Option<String>,
    match_rule: SharedRule,
    optional: bool,
}

impl Dependency {
    pub fn new(
        required_id: impl Into<String>,
        match_rule: SharedRule,
        required_version: Option<String>,
        optional: bool,
    ) -> Self {
        let match_rule = if required_version.is_some() {
            match_rule
        } else {
            match_rule::any()
        };
        Self {
            required_id: required_id.into(),
            required_version,
            match_rule,
            optional,
        }
    }

    /// Mandatory dependency on any version of `required_id`.
    pub fn on(required_id: impl Into<String>) -> Self {
        Self::new(required_id, Arc::new(AnyVersion), None, false)
    }

    /// Mandatory dependency on `required_id` at `version` under `rule`.
    pub fn versioned(
        required_id: impl Into<String>,
        version: impl Into<String>,
        rule: SharedRule,
    ) -> Self {
        Self::new(required_id, rule, Some(version.into()), false)
    }

    /// The same dependency, but optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn required_id(&self) -> &str {
        &self.required_id
    }

    pub fn required_version(&self) -> Option<&str> {
        self.required_version.as_deref()
    }

    pub fn match_rule(&self) -> &SharedRule {
        &self.match_rule
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether `available` (a version of the required identity) satisfies this dependency.
    pub fn matches(&self, available: &str, cmp: &dyn VersionComparator) -> bool {
        match &self.required_version {
            Some(required) => self.match_rule.is_satisfied(required, available, cmp),
            None => true,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.required_id)?;
        if let Some(version) = &self.required_version {
            write!(f, " {} {version}", self.match_rule.name())?;
        }
        if self.optional {
            f.write_str(" (optional)")?;
        }
        Ok(())
    }
}
