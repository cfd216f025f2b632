//! Concrete pipeline stages.
//!
//! Each stage wraps one collaborator call behind the `Stage` contract:
//!
//! ```text
//! audio path → TranscribeStage → transcript
//! transcript → SummarizeStage  → summary
//! summary    → DeliverStage    → DeliveryRecord (upload + notification)
//! ```

pub mod deliver;
pub mod summarize;
pub mod transcribe;

// Re-export stage types
pub use deliver::{summary_filename, DeliverStage, DeliveryRequest};
pub use summarize::SummarizeStage;
pub use transcribe::TranscribeStage;
