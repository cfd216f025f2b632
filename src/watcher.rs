//! Drive folder watcher.
//!
//! On a fixed interval, lists audio artifacts in the watched folder,
//! drops the ones already committed to the dedup store, and feeds the
//! rest through the pipeline one at a time. An artifact is committed
//! only after a fully successful run, so a failed artifact stays
//! eligible on every subsequent tick (no backoff, no dead-letter).
//!
//! Every listing is a full listing: filtering by modification time would
//! hide artifacts that failed on an earlier tick, and the dedup store
//! already keeps delivered ones out.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, instrument, warn};

use crate::adapters::StorageProvider;
use crate::config::Config;
use crate::core::{DedupStore, Orchestrator};
use crate::domain::{PipelineOutcome, RemoteArtifact};

/// What one tick of the poll loop did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Artifacts returned by the listing call
    pub listed: usize,

    /// Artifacts skipped because they were already delivered
    pub skipped: usize,

    /// Artifacts fully delivered and committed this tick
    pub delivered: usize,

    /// Artifacts attempted but not delivered (eligible again next tick)
    pub failed: usize,
}

/// Polls the external store and drives artifacts through the pipeline
pub struct DriveWatcher {
    folder_id: String,
    storage: Arc<dyn StorageProvider>,
    orchestrator: Orchestrator,
    dedup: DedupStore,
}

impl DriveWatcher {
    pub fn new(
        config: &Config,
        storage: Arc<dyn StorageProvider>,
        orchestrator: Orchestrator,
        dedup: DedupStore,
    ) -> Self {
        Self {
            folder_id: config.drive_folder_id.clone(),
            storage,
            orchestrator,
            dedup,
        }
    }

    /// One listing-filter-process pass.
    ///
    /// Artifacts are processed strictly sequentially, in the order the
    /// store returned them. A single artifact's failure never aborts the
    /// batch; a listing failure aborts only this tick.
    #[instrument(skip(self))]
    pub async fn tick(&mut self) -> Result<TickReport> {
        let artifacts = self
            .storage
            .list(&self.folder_id, None)
            .await
            .context("Failed to list artifacts")?;

        let mut report = TickReport {
            listed: artifacts.len(),
            ..Default::default()
        };

        if artifacts.is_empty() {
            return Ok(report);
        }

        for artifact in &artifacts {
            if self
                .dedup
                .contains(&artifact.id)
                .await
                .context("Failed to read dedup store")?
            {
                report.skipped += 1;
                continue;
            }

            info!(file = %artifact.name, artifact_id = %artifact.id, "Processing artifact");

            match self.process_artifact(artifact).await {
                Ok(outcome) if outcome.is_success() => {
                    self.dedup
                        .insert(&artifact.id)
                        .await
                        .context("Failed to commit to dedup store")?;
                    info!(file = %artifact.name, "Successfully processed");
                    report.delivered += 1;
                }
                Ok(outcome) => {
                    // Stays uncommitted: retried on the next tick
                    error!(
                        file = %artifact.name,
                        reason = outcome.failure_reason().unwrap_or("unknown"),
                        "Failed to process artifact"
                    );
                    report.failed += 1;
                }
                Err(e) => {
                    error!(file = %artifact.name, error = ?e, "Error processing artifact");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Download to scratch, run the pipeline, and release the scratch copy
    /// regardless of outcome (the TempPath removes the file on drop).
    async fn process_artifact(&self, artifact: &RemoteArtifact) -> Result<PipelineOutcome> {
        let scratch = self
            .storage
            .download(&artifact.id, &artifact.name)
            .await
            .context("Failed to download artifact")?;

        let outcome = self
            .orchestrator
            .process_file(&scratch, &artifact.name, Some(&artifact.id))
            .await;

        Ok(outcome)
    }

    /// Run the poll loop until the process is interrupted.
    ///
    /// The first tick fires immediately; ticks do not overlap (a tick that
    /// overruns the interval delays the next one). Tick-level errors are
    /// logged and the loop continues.
    pub async fn run(&mut self, poll_interval: Duration) -> Result<()> {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = poll_interval.as_secs(),
            folder = %self.folder_id,
            "Watcher started"
        );

        loop {
            ticker.tick().await;

            match self.tick().await {
                Ok(report) if report.listed == report.skipped => {
                    info!(listed = report.listed, "No new files found");
                }
                Ok(report) => {
                    info!(
                        listed = report.listed,
                        skipped = report.skipped,
                        delivered = report.delivered,
                        failed = report.failed,
                        "Tick complete"
                    );
                }
                Err(e) => {
                    warn!(error = ?e, "Tick failed; will retry on next interval");
                }
            }
        }
    }
}
