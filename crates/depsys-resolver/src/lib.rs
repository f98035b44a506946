//! Incremental dependency resolution over element sets.
//!
//! A [`DependencySystem`] holds every known version of every identity and
//! resolves them in three walks: satisfaction, selection and resolution.
//! Each resolve only recomputes sets touched since the previous one and
//! reports what changed as a [`ResolutionDelta`].

pub mod delta;
pub mod element_set;
pub mod graph;
pub mod mark;
pub mod policy;
pub mod system;
mod visitor;

pub use delta::{ElementChange, ElementStatus, ResolutionDelta};
pub use element_set::{Edges, ElementSet, ResolvedDependency};
pub use graph::{ResolvedTree, SetGraph};
pub use mark::{Mark, Phase};
pub use policy::{AllSatisfied, HighestOnly, SelectionPolicy};
pub use system::DependencySystem;
