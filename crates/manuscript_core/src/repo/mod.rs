//! Repository layer abstractions and storage implementations.
//!
//! # Responsibility
//! - Define the storage contract behind the project store.
//! - Keep in-memory and SQLite details away from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Project::validate()` before storing.
//! - Repository APIs return semantic errors (`NotFound`, `Duplicate`) in
//!   addition to backend errors.

pub mod memory_repo;
pub mod project_repo;
pub mod sqlite_repo;
