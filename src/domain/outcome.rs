//! Stage and pipeline results.
//!
//! Both types encode "success with a value or failure with a reason" as an
//! enum, so a partially populated result cannot be constructed.

use super::artifact::DeliveryRecord;

/// Result of executing a single pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    /// The stage completed and produced a value
    Success(T),

    /// The stage failed; the string is a short human-readable summary
    /// (full diagnostic detail goes to the log, not here)
    Failure(String),
}

impl<T> StageOutcome<T> {
    /// Create a failure outcome
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The failure reason, if this outcome is a failure
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(reason) => Some(reason),
        }
    }

    /// Convert into a plain Result
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(reason) => Err(reason),
        }
    }
}

/// Terminal result of one artifact's traversal through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// All three stages succeeded
    Delivered(DeliveryRecord),

    /// Some stage failed; the reason carries the stage prefix
    /// (e.g. "Transcription failed: ...")
    Failed { reason: String },
}

impl PipelineOutcome {
    /// Create a failed outcome
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }

    /// The failure reason, if the pipeline failed
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Delivered(_) => None,
            Self::Failed { reason } => Some(reason),
        }
    }

    /// The delivery record, if the pipeline fully succeeded
    pub fn delivery(&self) -> Option<&DeliveryRecord> {
        match self {
            Self::Delivered(record) => Some(record),
            Self::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_outcome_accessors() {
        let ok: StageOutcome<i32> = StageOutcome::Success(42);
        assert!(ok.is_success());
        assert_eq!(ok.failure_reason(), None);
        assert_eq!(ok.into_result(), Ok(42));

        let failed: StageOutcome<i32> = StageOutcome::failure("backend unavailable");
        assert!(!failed.is_success());
        assert_eq!(failed.failure_reason(), Some("backend unavailable"));
    }

    #[test]
    fn test_pipeline_outcome_accessors() {
        let record = DeliveryRecord {
            remote_file_id: None,
            notification_id: Some("msg-1".to_string()),
            summary_filename: "Meeting_2024-01-15_summary.txt".to_string(),
        };

        let delivered = PipelineOutcome::Delivered(record.clone());
        assert!(delivered.is_success());
        assert_eq!(delivered.delivery(), Some(&record));

        let failed = PipelineOutcome::failed("Transcription failed: boom");
        assert!(!failed.is_success());
        assert_eq!(
            failed.failure_reason(),
            Some("Transcription failed: boom")
        );
        assert!(failed.delivery().is_none());
    }
}
