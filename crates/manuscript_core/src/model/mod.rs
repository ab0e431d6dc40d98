//! Domain model for manuscript projects.
//!
//! # Responsibility
//! - Define canonical data structures used by the store and request surface.
//!
//! # Invariants
//! - Every project is identified by a stable `ProjectId`.
//! - Chapters never outlive their project.
//! - Deletion is a hard delete; there are no tombstones.

pub mod chapter;
pub mod project;
