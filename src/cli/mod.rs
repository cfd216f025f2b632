//! Command-line interface for voxum.
//!
//! Commands for processing a local file, watching the Drive folder,
//! authenticating, and inspecting configuration and state.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{DriveClient, OpenAiClient, ResendClient};
use crate::config::{redact, Config};
use crate::core::{DedupStore, Orchestrator};

/// voxum - voice meeting summarizer
#[derive(Parser, Debug)]
#[command(name = "voxum")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a local audio file through the pipeline
    Process {
        /// Path to the audio file
        file: PathBuf,
    },

    /// Watch the Drive folder for new audio files
    Watch,

    /// Authenticate with Google Drive (manual code flow)
    Auth,

    /// Show current configuration
    Config,

    /// Show dedup store status
    Status,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = Config::from_env().context("Configuration error")?;

        match self.command {
            Commands::Process { file } => execute_process(&config, file).await,
            Commands::Watch => execute_watch(&config).await,
            Commands::Auth => execute_auth(&config).await,
            Commands::Config => execute_config(&config),
            Commands::Status => execute_status(&config).await,
        }
    }
}

/// Wire the orchestrator from the concrete collaborators
async fn build_pipeline(config: &Config) -> Result<(Orchestrator, Arc<DriveClient>)> {
    let openai = Arc::new(OpenAiClient::new(config.openai_api_key.clone()));
    let drive = Arc::new(
        DriveClient::new(&config.client_secrets_path, config.token_path())
            .await
            .context("Failed to set up Drive client")?,
    );
    let resend = Arc::new(ResendClient::new(
        config.resend_api_key.clone(),
        config.email_from.clone(),
        config.email_to.clone(),
    ));

    let orchestrator = Orchestrator::new(
        config,
        openai.clone(),
        openai,
        drive.clone(),
        resend,
    );

    Ok((orchestrator, drive))
}

/// Process a single local file
async fn execute_process(config: &Config, file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }

    let original_filename = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .context("Input path has no file name")?;

    println!("Processing: {}", original_filename);

    let (orchestrator, _drive) = build_pipeline(config).await?;
    let outcome = orchestrator.process_file(&file, &original_filename, None).await;

    match outcome.delivery() {
        Some(record) => {
            println!("✅ Processing complete");
            println!("  Summary file: {}", record.summary_filename);
            if let Some(file_id) = &record.remote_file_id {
                println!("  Drive file ID: {}", file_id);
            }
            if let Some(email_id) = &record.notification_id {
                println!("  Email sent: {}", email_id);
            }
            Ok(())
        }
        None => {
            anyhow::bail!(
                "Processing failed: {}",
                outcome.failure_reason().unwrap_or("unknown")
            );
        }
    }
}

/// Run the poll loop until Ctrl+C
async fn execute_watch(config: &Config) -> Result<()> {
    let (orchestrator, drive) = build_pipeline(config).await?;
    let dedup = DedupStore::open(config.processed_log_path()).await?;

    let mut watcher = crate::watcher::DriveWatcher::new(config, drive, orchestrator, dedup);

    println!("👁️  Watching folder: {}", config.drive_folder_id);
    println!("    Poll interval: {}s", config.poll_interval_secs);
    println!("    Press Ctrl+C to stop");
    println!();

    tokio::select! {
        result = watcher.run(config.poll_interval()) => result,
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("🛑 Stopping watcher...");
            Ok(())
        }
    }
}

/// Run the manual OAuth code flow
async fn execute_auth(config: &Config) -> Result<()> {
    let drive = DriveClient::new(&config.client_secrets_path, config.token_path())
        .await
        .context("Failed to set up Drive client")?;

    println!("Open this URL in your browser and grant access:");
    println!();
    println!("  {}", drive.authorize_url());
    println!();
    print!("Paste the authorization code here: ");
    io::stdout().flush()?;

    let mut code = String::new();
    io::stdin()
        .lock()
        .read_line(&mut code)
        .context("Failed to read authorization code")?;

    drive.exchange_code(code.trim()).await?;

    println!("✅ Authentication successful");
    println!("  Token saved to: {}", config.token_path().display());
    Ok(())
}

/// Print the resolved configuration (secrets redacted)
fn execute_config(config: &Config) -> Result<()> {
    println!("Current configuration:");
    println!("  Drive folder:        {}", config.drive_folder_id);
    println!(
        "  Client secrets:      {}",
        config.client_secrets_path.display()
    );
    println!("  State dir:           {}", config.state_dir.display());
    println!("  Transcription model: {}", config.transcription_model);
    println!("  Summarization model: {}", config.summarization_model);
    println!("  Summary language:    {}", config.summary_language);
    println!("  Poll interval:       {}s", config.poll_interval_secs);
    println!("  Email to:            {}", config.email_to);
    println!("  Email from:          {}", config.email_from);
    println!("  OpenAI API key:      {}", redact(&config.openai_api_key));
    println!("  Resend API key:      {}", redact(&config.resend_api_key));
    Ok(())
}

/// Show dedup store summary
async fn execute_status(config: &Config) -> Result<()> {
    let dedup = DedupStore::new(config.processed_log_path());
    let records = dedup.records().await?;

    println!();
    println!("Processed artifacts: {}", records.len());
    println!("Log file: {}", config.processed_log_path().display());

    if !records.is_empty() {
        println!();
        println!("Recent:");
        for record in records.iter().rev().take(5) {
            println!(
                "  {} (committed {})",
                record.id,
                record.committed_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }

    println!();
    Ok(())
}
