//! Core orchestration logic.
//!
//! This module contains:
//! - Stage: the error-containment contract every pipeline stage implements
//! - Orchestrator: three-stage short-circuiting pipeline
//! - DedupStore: durable record of artifact ids already fully delivered

pub mod dedup;
pub mod orchestrator;
pub mod stage;

// Re-export commonly used types
pub use dedup::{DedupError, DedupStore};
pub use orchestrator::Orchestrator;
pub use stage::Stage;
