//! Shared utilities for depsys.
//!
//! This crate provides the cross-cutting concerns used by the other depsys
//! crates: the unified error type and Cargo-style terminal status lines.

pub mod errors;
pub mod progress;
