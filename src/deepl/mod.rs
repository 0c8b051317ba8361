/*!
 * DeepL document-translation API surface.
 *
 * This module defines the `DocumentApi` trait that the translation
 * pipeline is written against, the wire types shared by implementations,
 * and two implementations:
 * - `client::DeepLClient` - the real HTTP client
 * - `mock::MockApi` - a scripted implementation for tests
 */

use std::fmt::Debug;
use std::path::Path;
use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::DeepLError;

/// Identifies one submitted document at the service: the job id plus the
/// job secret the service hands back on upload
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentHandle {
    /// Service-assigned job identifier
    pub document_id: String,

    /// Job secret required by every follow-up call
    pub document_key: String,
}

/// Job status reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting for a translation slot
    Queued,
    /// Translation in progress
    Translating,
    /// Terminal: result ready for download
    Done,
    /// Terminal: translation failed
    Error,
}

impl JobStatus {
    /// Whether the job can still make progress
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }
}

/// One status-poll response
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentStatus {
    /// Current job state
    pub status: JobStatus,

    /// Service estimate until completion, when provided
    #[serde(default)]
    pub seconds_remaining: Option<u64>,

    /// Failure description, populated for the `error` status
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Account quota as reported by the usage endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageStats {
    /// Characters consumed in the current billing period
    #[serde(default)]
    pub character_count: u64,

    /// Characters available in the current billing period
    #[serde(default)]
    pub character_limit: u64,
}

/// The document-translation protocol the pipeline depends on.
///
/// One translation is upload -> poll until terminal -> download. Keeping
/// this behind a trait lets tests drive the pipeline with a scripted
/// service instead of the network.
#[async_trait]
pub trait DocumentApi: Send + Sync + Debug {
    /// Upload a document for translation, returning its job handle
    async fn upload(
        &self,
        path: &Path,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<DocumentHandle, DeepLError>;

    /// Query the current status of a submitted job
    async fn status(&self, handle: &DocumentHandle) -> Result<DocumentStatus, DeepLError>;

    /// Download the translated result to `output`, once the job is done
    async fn download(&self, handle: &DocumentHandle, output: &Path) -> Result<(), DeepLError>;

    /// Fetch account quota
    async fn usage(&self) -> Result<UsageStats, DeepLError>;
}

pub mod client;
pub mod mock;
