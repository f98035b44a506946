use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all depsys operations.
#[derive(Debug, Error, Diagnostic)]
pub enum DepsysError {
    /// The resolve walk could not account for every element set.
    ///
    /// Snapshots computed by phases that completed before the failure are
    /// left in place; the system is not rolled back.
    #[error("Cyclic dependency detected: {}", describe_cycles(.cycles, .unvisited))]
    #[diagnostic(
        code(depsys::cyclic_dependency),
        help("Break the cycle by removing a dependency or making it optional")
    )]
    CyclicDependency {
        cycles: Vec<Vec<String>>,
        unvisited: Vec<String>,
    },

    /// Invalid or malformed universe file.
    #[error("Universe error: {message}")]
    #[diagnostic(help("Check the universe file for syntax errors"))]
    Universe { message: String },

    /// Unknown comparator, policy or other configuration value.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

impl DepsysError {
    pub fn is_cyclic(&self) -> bool {
        matches!(self, DepsysError::CyclicDependency { .. })
    }
}

fn describe_cycles(cycles: &[Vec<String>], unvisited: &[String]) -> String {
    if cycles.is_empty() {
        return format!("unreachable element sets [{}]", unvisited.join(", "));
    }
    cycles
        .iter()
        .map(|cycle| {
            let mut chain = cycle.clone();
            if let Some(first) = cycle.first() {
                chain.push(first.clone());
            }
            chain.join(" -> ")
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias for `miette::Result<T>`.
pub type DepsysResult<T> = miette::Result<T>;
