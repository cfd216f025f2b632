//! Pipeline integration tests
//!
//! Exercises the orchestrator with mock collaborators: short-circuiting,
//! failure reason prefixes, and end-to-end pass-through of transcript and
//! summary into the delivered notification.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tempfile::{NamedTempFile, TempPath};

use voxum::adapters::{
    NotificationError, NotificationService, StorageError, StorageProvider, SummarizationError,
    SummarizationService, TranscriptionError, TranscriptionService,
};
use voxum::core::Orchestrator;
use voxum::domain::{Attachment, RemoteArtifact};
use voxum::stages::{DeliverStage, SummarizeStage, TranscribeStage};

struct MockTranscription {
    response: Option<String>,
    calls: AtomicUsize,
}

impl MockTranscription {
    fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            response: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptionService for MockTranscription {
    async fn transcribe(
        &self,
        _audio_path: &Path,
        _model: &str,
    ) -> Result<String, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .clone()
            .ok_or_else(|| TranscriptionError::Api("backend unavailable".to_string()))
    }
}

struct MockSummarization {
    response: Option<String>,
    calls: AtomicUsize,
    last_transcript: Mutex<Option<String>>,
}

impl MockSummarization {
    fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Some(text.to_string()),
            calls: AtomicUsize::new(0),
            last_transcript: Mutex::new(None),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            response: None,
            calls: AtomicUsize::new(0),
            last_transcript: Mutex::new(None),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SummarizationService for MockSummarization {
    async fn summarize(
        &self,
        transcript: &str,
        _language: &str,
        _model: &str,
    ) -> Result<String, SummarizationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_transcript.lock().unwrap() = Some(transcript.to_string());
        self.response
            .clone()
            .ok_or_else(|| SummarizationError::Api("model overloaded".to_string()))
    }
}

#[derive(Default)]
struct MockStorage {
    /// (folder_id, filename, content) per upload
    uploads: Mutex<Vec<(String, String, String)>>,
    marked: Mutex<Vec<String>>,
}

#[async_trait]
impl StorageProvider for MockStorage {
    async fn list(
        &self,
        _folder_id: &str,
        _since: Option<DateTime<Utc>>,
    ) -> Result<Vec<RemoteArtifact>, StorageError> {
        Ok(Vec::new())
    }

    async fn download(&self, _id: &str, _filename: &str) -> Result<TempPath, StorageError> {
        Ok(NamedTempFile::new()?.into_temp_path())
    }

    async fn upload(
        &self,
        folder_id: &str,
        filename: &str,
        content: &str,
    ) -> Result<String, StorageError> {
        self.uploads.lock().unwrap().push((
            folder_id.to_string(),
            filename.to_string(),
            content.to_string(),
        ));
        Ok("uploaded-1".to_string())
    }

    async fn mark_processed(&self, id: &str) -> Result<(), StorageError> {
        self.marked.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

struct SentEmail {
    subject: String,
    body: String,
    attachments: Vec<Attachment>,
}

#[derive(Default)]
struct MockNotifier {
    sent: Mutex<Vec<SentEmail>>,
    fail: bool,
}

impl MockNotifier {
    fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        })
    }
}

#[async_trait]
impl NotificationService for MockNotifier {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        attachments: &[Attachment],
    ) -> Result<String, NotificationError> {
        if self.fail {
            return Err(NotificationError::Api("delivery endpoint down".to_string()));
        }
        self.sent.lock().unwrap().push(SentEmail {
            subject: subject.to_string(),
            body: body.to_string(),
            attachments: attachments.to_vec(),
        });
        Ok("msg-1".to_string())
    }
}

fn build_orchestrator(
    transcription: Arc<MockTranscription>,
    summarization: Arc<MockSummarization>,
    storage: Arc<MockStorage>,
    notifier: Arc<MockNotifier>,
    upload_folder: Option<&str>,
) -> Orchestrator {
    Orchestrator::from_stages(
        TranscribeStage::new(transcription, "whisper-1".to_string()),
        SummarizeStage::new(summarization, "gpt-4o-mini".to_string(), "en".to_string()),
        DeliverStage::new(storage, notifier, upload_folder.map(String::from)),
    )
}

fn test_audio_file() -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), b"fake audio bytes").unwrap();
    file
}

#[tokio::test]
async fn test_end_to_end_pass_through() {
    let transcription = MockTranscription::ok("Hello world");
    let summarization = MockSummarization::ok("Summary text");
    let storage = Arc::new(MockStorage::default());
    let notifier = Arc::new(MockNotifier::default());

    let orchestrator = build_orchestrator(
        transcription,
        summarization.clone(),
        storage.clone(),
        notifier.clone(),
        Some("folder-123"),
    );

    let audio = test_audio_file();
    let outcome = orchestrator
        .process_file(audio.path(), "Meeting.mp3", Some("remote-9"))
        .await;

    let record = outcome.delivery().expect("pipeline should succeed");
    assert_eq!(record.notification_id.as_deref(), Some("msg-1"));
    assert_eq!(record.remote_file_id.as_deref(), Some("uploaded-1"));
    assert!(record.summary_filename.starts_with("Meeting_"));
    assert!(record.summary_filename.ends_with("_summary.txt"));

    // Summarizer received the literal transcript
    assert_eq!(
        summarization.last_transcript.lock().unwrap().as_deref(),
        Some("Hello world")
    );

    // Uploaded summary content and filename line up with the record
    let uploads = storage.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, "folder-123");
    assert_eq!(uploads[0].1, record.summary_filename);
    assert_eq!(uploads[0].2, "Summary text");

    // Notification body is the summary; attachments include the transcript
    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Meeting Summary: Meeting.mp3");
    assert_eq!(sent[0].body, "Summary text");
    assert!(sent[0]
        .attachments
        .iter()
        .any(|a| a.content == "Hello world"));
    assert!(sent[0]
        .attachments
        .iter()
        .any(|a| a.content == "Summary text"));

    // Remote-side marker was signalled for the originating artifact
    assert_eq!(*storage.marked.lock().unwrap(), vec!["remote-9".to_string()]);
}

#[tokio::test]
async fn test_transcription_failure_short_circuits() {
    let transcription = MockTranscription::failing();
    let summarization = MockSummarization::ok("Summary text");
    let storage = Arc::new(MockStorage::default());
    let notifier = Arc::new(MockNotifier::default());

    let orchestrator = build_orchestrator(
        transcription.clone(),
        summarization.clone(),
        storage.clone(),
        notifier.clone(),
        Some("folder-123"),
    );

    let audio = test_audio_file();
    let outcome = orchestrator
        .process_file(audio.path(), "Meeting.mp3", None)
        .await;

    assert!(!outcome.is_success());
    assert!(outcome
        .failure_reason()
        .unwrap()
        .starts_with("Transcription failed:"));

    // Later stages never ran
    assert_eq!(transcription.call_count(), 1);
    assert_eq!(summarization.call_count(), 0);
    assert!(storage.uploads.lock().unwrap().is_empty());
    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_summarization_failure_short_circuits() {
    let transcription = MockTranscription::ok("Hello world");
    let summarization = MockSummarization::failing();
    let storage = Arc::new(MockStorage::default());
    let notifier = Arc::new(MockNotifier::default());

    let orchestrator = build_orchestrator(
        transcription.clone(),
        summarization.clone(),
        storage.clone(),
        notifier.clone(),
        Some("folder-123"),
    );

    let audio = test_audio_file();
    let outcome = orchestrator
        .process_file(audio.path(), "Meeting.mp3", None)
        .await;

    assert!(!outcome.is_success());
    assert!(outcome
        .failure_reason()
        .unwrap()
        .starts_with("Summarization failed:"));

    assert_eq!(transcription.call_count(), 1);
    assert_eq!(summarization.call_count(), 1);

    // Delivery never ran
    assert!(storage.uploads.lock().unwrap().is_empty());
    assert!(notifier.sent.lock().unwrap().is_empty());
    assert!(storage.marked.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_delivery_failure_is_reported() {
    let transcription = MockTranscription::ok("Hello world");
    let summarization = MockSummarization::ok("Summary text");
    let storage = Arc::new(MockStorage::default());
    let notifier = MockNotifier::failing();

    let orchestrator = build_orchestrator(
        transcription,
        summarization,
        storage,
        notifier,
        None,
    );

    let audio = test_audio_file();
    let outcome = orchestrator
        .process_file(audio.path(), "Meeting.mp3", None)
        .await;

    assert!(!outcome.is_success());
    assert!(outcome
        .failure_reason()
        .unwrap()
        .starts_with("Delivery failed:"));
    assert!(outcome.delivery().is_none());
}

#[tokio::test]
async fn test_upload_skipped_without_destination() {
    let transcription = MockTranscription::ok("Hello world");
    let summarization = MockSummarization::ok("Summary text");
    let storage = Arc::new(MockStorage::default());
    let notifier = Arc::new(MockNotifier::default());

    let orchestrator = build_orchestrator(
        transcription,
        summarization,
        storage.clone(),
        notifier,
        None,
    );

    let audio = test_audio_file();
    let outcome = orchestrator
        .process_file(audio.path(), "Meeting.mp3", None)
        .await;

    let record = outcome.delivery().expect("pipeline should succeed");
    assert!(record.remote_file_id.is_none());
    assert!(storage.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_orchestrator_is_reusable_across_artifacts() {
    let transcription = MockTranscription::ok("Hello world");
    let summarization = MockSummarization::ok("Summary text");
    let storage = Arc::new(MockStorage::default());
    let notifier = Arc::new(MockNotifier::default());

    let orchestrator = build_orchestrator(
        transcription,
        summarization,
        storage,
        notifier.clone(),
        None,
    );

    let first = test_audio_file();
    let second = test_audio_file();

    let outcome1 = orchestrator
        .process_file(first.path(), "First.mp3", None)
        .await;
    let outcome2 = orchestrator
        .process_file(second.path(), "Second.m4a", None)
        .await;

    assert!(outcome1.is_success());
    assert!(outcome2.is_success());
    assert_eq!(notifier.sent.lock().unwrap().len(), 2);
}
