//! Core value types for depsys.
//!
//! This crate defines what the resolver works on: elements and the
//! dependencies they declare, match rules, version comparators, resolver
//! configuration and the universe file format.
//!
//! It holds no resolution logic; see `depsys-resolver` for the engine.

pub mod comparator;
pub mod config;
pub mod dependency;
pub mod element;
pub mod match_rule;
pub mod universe;
pub mod version;
