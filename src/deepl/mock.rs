/*!
 * Mock DeepL API for testing.
 *
 * Simulates the upload -> poll -> download protocol without the network:
 * - `MockApi::working()` - every job succeeds immediately
 * - `MockApi::job_error(msg)` - every job reaches the terminal `error` status
 * - `MockApi::fail_upload_at(n)` - the n-th upload (0-based) is rejected
 * - `MockApi::size_limited()` - every upload is rejected with the size-limit message
 * - `MockApi::never_done()` - jobs stay `translating` forever
 *
 * A "translated" document is the uploaded SRT with every entry's text
 * suffixed with the target language, so pipeline tests can tell the
 * result apart from the input.
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use async_trait::async_trait;

use crate::deepl::{DocumentApi, DocumentHandle, DocumentStatus, JobStatus, UsageStats};
use crate::errors::DeepLError;
use crate::subtitle_processor::{serialize_entries, SubtitleCollection};

/// Behavior mode for the mock API
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Jobs complete on the first status poll
    Working,
    /// Jobs spend this many polls in `translating` before completing
    SlowJob { polls_until_done: usize },
    /// Jobs reach the terminal `error` status on the first poll
    JobError { message: Option<String> },
    /// The n-th upload (0-based) is rejected; earlier ones succeed
    FailUploadAt { index: usize },
    /// Every upload is rejected with the service's size-limit message
    SizeLimited,
    /// Jobs never leave the `translating` state
    NeverDone,
}

#[derive(Debug)]
struct MockJob {
    content: String,
    target_lang: String,
    polls: usize,
}

/// Scripted DeepL API for driving the pipeline in tests
#[derive(Debug)]
pub struct MockApi {
    behavior: MockBehavior,
    uploads: AtomicUsize,
    jobs: Mutex<HashMap<String, MockJob>>,
    uploaded_paths: Mutex<Vec<PathBuf>>,
    usage: UsageStats,
    usage_fails: bool,
}

impl MockApi {
    fn with_behavior(behavior: MockBehavior) -> Self {
        MockApi {
            behavior,
            uploads: AtomicUsize::new(0),
            jobs: Mutex::new(HashMap::new()),
            uploaded_paths: Mutex::new(Vec::new()),
            usage: UsageStats {
                character_count: 1234,
                character_limit: 500_000,
            },
            usage_fails: false,
        }
    }

    /// Mock where every job succeeds on the first poll
    pub fn working() -> Self {
        Self::with_behavior(MockBehavior::Working)
    }

    /// Mock where jobs take `polls_until_done` polls to finish
    pub fn slow(polls_until_done: usize) -> Self {
        Self::with_behavior(MockBehavior::SlowJob { polls_until_done })
    }

    /// Mock where every job fails with the given service message
    pub fn job_error(message: impl Into<String>) -> Self {
        Self::with_behavior(MockBehavior::JobError {
            message: Some(message.into()),
        })
    }

    /// Mock where every job fails without a service message
    pub fn job_error_blank() -> Self {
        Self::with_behavior(MockBehavior::JobError { message: None })
    }

    /// Mock where the `index`-th upload (0-based) is rejected
    pub fn fail_upload_at(index: usize) -> Self {
        Self::with_behavior(MockBehavior::FailUploadAt { index })
    }

    /// Mock where every upload trips the size-limit rejection
    pub fn size_limited() -> Self {
        Self::with_behavior(MockBehavior::SizeLimited)
    }

    /// Mock where jobs never reach a terminal state
    pub fn never_done() -> Self {
        Self::with_behavior(MockBehavior::NeverDone)
    }

    /// Mock whose usage endpoint always fails
    pub fn usage_unavailable() -> Self {
        let mut api = Self::with_behavior(MockBehavior::Working);
        api.usage_fails = true;
        api
    }

    /// Number of uploads attempted so far
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    /// Paths of all documents that were uploaded
    pub fn uploaded_paths(&self) -> Vec<PathBuf> {
        self.uploaded_paths.lock().unwrap().clone()
    }

    // The mock's "translation": suffix every entry's text with the target
    // language so results are distinguishable from inputs
    fn translate_content(content: &str, target_lang: &str) -> String {
        match SubtitleCollection::parse_srt_string(content) {
            Ok(mut entries) => {
                for entry in &mut entries {
                    entry.text = format!("{} [{}]", entry.text, target_lang);
                }
                serialize_entries(&entries)
            }
            Err(_) => content.to_string(),
        }
    }
}

#[async_trait]
impl DocumentApi for MockApi {
    async fn upload(
        &self,
        path: &Path,
        _source_lang: &str,
        target_lang: &str,
    ) -> Result<DocumentHandle, DeepLError> {
        let upload_index = self.uploads.fetch_add(1, Ordering::SeqCst);
        self.uploaded_paths.lock().unwrap().push(path.to_path_buf());

        match &self.behavior {
            MockBehavior::FailUploadAt { index } if *index == upload_index => {
                return Err(DeepLError::SubmissionFailed {
                    status: 400,
                    message: format!("upload {} rejected by mock", upload_index),
                });
            }
            MockBehavior::SizeLimited => {
                return Err(DeepLError::SizeLimitExceeded {
                    message: "Document exceeds the size limit".to_string(),
                });
            }
            _ => {}
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| DeepLError::RequestFailed(format!("mock read failed: {}", e)))?;

        let id = format!("mock-job-{}", upload_index);
        self.jobs.lock().unwrap().insert(
            id.clone(),
            MockJob {
                content,
                target_lang: target_lang.to_string(),
                polls: 0,
            },
        );

        Ok(DocumentHandle {
            document_id: id.clone(),
            document_key: format!("key-{}", id),
        })
    }

    async fn status(&self, handle: &DocumentHandle) -> Result<DocumentStatus, DeepLError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs.get_mut(&handle.document_id).ok_or_else(|| {
            DeepLError::RequestFailed(format!("unknown mock job {}", handle.document_id))
        })?;
        job.polls += 1;

        let status = match &self.behavior {
            MockBehavior::JobError { message } => {
                return Ok(DocumentStatus {
                    status: JobStatus::Error,
                    seconds_remaining: None,
                    error_message: message.clone(),
                });
            }
            MockBehavior::NeverDone => JobStatus::Translating,
            MockBehavior::SlowJob { polls_until_done } if job.polls <= *polls_until_done => {
                JobStatus::Translating
            }
            _ => JobStatus::Done,
        };

        Ok(DocumentStatus {
            status,
            seconds_remaining: None,
            error_message: None,
        })
    }

    async fn download(&self, handle: &DocumentHandle, output: &Path) -> Result<(), DeepLError> {
        let jobs = self.jobs.lock().unwrap();
        let job = jobs.get(&handle.document_id).ok_or_else(|| {
            DeepLError::RequestFailed(format!("unknown mock job {}", handle.document_id))
        })?;

        let translated = Self::translate_content(&job.content, &job.target_lang);
        std::fs::write(output, translated)
            .map_err(|e| DeepLError::RequestFailed(format!("mock write failed: {}", e)))?;

        Ok(())
    }

    async fn usage(&self) -> Result<UsageStats, DeepLError> {
        if self.usage_fails {
            return Err(DeepLError::RequestFailed(
                "mock usage endpoint unavailable".to_string(),
            ));
        }
        Ok(self.usage.clone())
    }
}
