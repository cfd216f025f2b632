//! Domain types for the voxum pipeline.
//!
//! This module contains the core data structures:
//! - RemoteArtifact: an audio file discovered in the external store
//! - StageOutcome / PipelineOutcome: stage and pipeline results
//! - DeliveryRecord: what a fully successful run produced

pub mod artifact;
pub mod outcome;

// Re-export commonly used types
pub use artifact::{Attachment, DeliveryRecord, RemoteArtifact};
pub use outcome::{PipelineOutcome, StageOutcome};
