//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the project store contract.
//! - Keep the request surface decoupled from storage details.

pub mod project_service;
pub mod strategy;
