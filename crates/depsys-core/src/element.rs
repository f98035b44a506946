use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::dependency::Dependency;

/// One version of an identity, with the dependencies it declares.
///
/// Elements are immutable and cheap to clone: clones share the same
/// underlying data. Equality and hashing use `id@version` only; use
/// [`Element::is_same`] to ask whether two handles are the very same element.
#[derive(Clone)]
pub struct Element {
    inner: Arc<ElementData>,
}

#[derive(Debug)]
struct ElementData {
    id: String,
    version: String,
    dependencies: Vec<Dependency>,
    singleton: bool,
}

impl Element {
    pub fn new(
        id: impl Into<String>,
        version: impl Into<String>,
        dependencies: Vec<Dependency>,
        singleton: bool,
    ) -> Self {
        Self {
            inner: Arc::new(ElementData {
                id: id.into(),
                version: version.into(),
                dependencies,
                singleton,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn version(&self) -> &str {
        &self.inner.version
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.inner.dependencies
    }

    /// A singleton forbids other versions of its identity from being
    /// selected at the same time.
    pub fn is_singleton(&self) -> bool {
        self.inner.singleton
    }

    pub fn is_same(&self, other: &Element) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id() && self.version() == other.version()
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
        self.version().hash(state);
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.inner.id)
            .field("version", &self.inner.version)
            .field("dependencies", &self.inner.dependencies)
            .field("singleton", &self.inner.singleton)
            .finish()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id(), self.version())
    }
}
