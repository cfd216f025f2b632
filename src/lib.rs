//! voxum - voice meeting summarizer
//!
//! Watches a Google Drive folder for audio recordings, runs each one
//! through a three-stage pipeline (transcribe → summarize → deliver),
//! and records delivered artifacts so nothing is processed twice across
//! polls or restarts.
//!
//! # Architecture
//!
//! ```text
//! Drive folder → DriveWatcher → (filter via DedupStore)
//!                    → Orchestrator → [transcribe → summarize → deliver]
//!                    → DedupStore commit (on full success only)
//! ```
//!
//! - Every stage contains its own failures: collaborator errors become
//!   `StageOutcome::Failure`, never panics or raw errors.
//! - The pipeline short-circuits: once a stage fails, later stages do
//!   not run.
//! - The dedup store is an append-only JSONL set; an artifact id is
//!   committed only after transcription, summarization, and delivery
//!   all succeeded.
//!
//! # Modules
//!
//! - `adapters`: external collaborators (OpenAI, Google Drive, Resend)
//! - `core`: orchestration logic (Stage, Orchestrator, DedupStore)
//! - `stages`: the three concrete pipeline stages
//! - `watcher`: the polling loop
//! - `domain`: data structures (RemoteArtifact, outcomes, DeliveryRecord)
//! - `cli`: command-line interface

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod stages;
pub mod watcher;

// Re-export main types at crate root for convenience
pub use config::{Config, ConfigError};
pub use crate::core::{DedupStore, Orchestrator, Stage};
pub use domain::{Attachment, DeliveryRecord, PipelineOutcome, RemoteArtifact, StageOutcome};
pub use watcher::{DriveWatcher, TickReport};
