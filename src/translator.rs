/*!
 * Document translation pipeline.
 *
 * `DocumentTranslator` drives the DeepL document protocol for a single
 * file (upload, poll until terminal, download) and the large-document
 * pipeline on top of it: plan chunks, materialize each as a temporary
 * SRT beside the source, translate the chunks strictly in order,
 * reassemble and renumber the results, and clean up every temporary on
 * success and on every failure path.
 */

use std::path::{Path, PathBuf};
use std::time::Duration;
use log::{debug, info, warn};

use crate::chunk_planner::ChunkPlanner;
use crate::deepl::{DocumentApi, JobStatus, UsageStats};
use crate::errors::TranslationError;
use crate::file_utils::FileManager;
use crate::subtitle_processor::{serialize_entries, SubtitleCollection, SubtitleEntry};

/// Default delay between status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default cap on status polls (10 minutes at the default interval).
/// `None` restores the wait-forever contract.
pub const DEFAULT_MAX_POLL_ATTEMPTS: Option<u32> = Some(120);

/// Prefix of every temporary chunk file the pipeline creates
pub const TEMP_CHUNK_PREFIX: &str = "temp_chunk_";

/// Drives single- and large-document translation against a `DocumentApi`
#[derive(Debug)]
pub struct DocumentTranslator<A: DocumentApi> {
    /// The translation service
    api: A,
    /// Chunk ceilings for the large-document path
    planner: ChunkPlanner,
    /// Delay between status polls
    poll_interval: Duration,
    /// Poll cap; `None` means poll until terminal
    max_poll_attempts: Option<u32>,
}

impl<A: DocumentApi> DocumentTranslator<A> {
    /// Create a translator with default chunk ceilings and polling
    pub fn new(api: A) -> Self {
        DocumentTranslator {
            api,
            planner: ChunkPlanner::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }

    /// Access the underlying API client
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Override the chunk planner
    pub fn with_planner(mut self, planner: ChunkPlanner) -> Self {
        self.planner = planner;
        self
    }

    /// Override the delay between status polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the poll cap; `None` polls until the job is terminal
    pub fn with_max_poll_attempts(mut self, attempts: Option<u32>) -> Self {
        self.max_poll_attempts = attempts;
        self
    }

    /// Translate one document through upload -> poll -> download.
    ///
    /// Returns the translated file's path, derived from the source path
    /// by replacing a `.{source_lang}` stem suffix with `.{target_lang}`.
    pub async fn translate_document(
        &self,
        path: &Path,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<PathBuf, TranslationError> {
        let handle = self.api.upload(path, source_lang, target_lang).await?;

        let mut attempts: u32 = 0;
        loop {
            let status = self.api.status(&handle).await?;

            match status.status {
                JobStatus::Done => break,
                JobStatus::Error => {
                    return Err(TranslationError::JobFailed {
                        message: status
                            .error_message
                            .unwrap_or_else(|| "Translation failed".to_string()),
                    });
                }
                JobStatus::Queued | JobStatus::Translating => {
                    attempts += 1;
                    if let Some(max) = self.max_poll_attempts {
                        if attempts >= max {
                            return Err(TranslationError::PollTimeout { attempts });
                        }
                    }
                    if let Some(secs) = status.seconds_remaining {
                        debug!(
                            "Job {} still {:?}, ~{}s remaining",
                            handle.document_id, status.status, secs
                        );
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }

        let output = FileManager::translated_file_path(path, source_lang, target_lang);
        self.api.download(&handle, &output).await?;

        Ok(output)
    }

    /// Translate a document too large for one request by splitting it into
    /// valid SRT parts, translating them sequentially, and reassembling.
    ///
    /// Chunks are processed strictly in order, never concurrently, so the
    /// output preserves the source's entry order and the service never
    /// sees more than one in-flight request. Every temporary file is
    /// deleted before this returns, on success and on failure alike.
    pub async fn translate_large_document(
        &self,
        path: &Path,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<PathBuf, TranslationError> {
        let content = std::fs::read_to_string(path).map_err(|e| TranslationError::File {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!(
            "Processing SRT file of {}KB in large-document mode",
            content.len() / 1024
        );

        let entries = SubtitleCollection::parse_srt_string(&content)?;
        info!("The file contains {} subtitles", entries.len());

        let ranges = self.planner.plan(&entries);
        info!("Split into {} part(s) for translation", ranges.len());

        let temp_paths = self.write_chunk_files(path, &entries, &ranges)?;

        let mut translated_entries: Vec<SubtitleEntry> = Vec::with_capacity(entries.len());
        for (i, temp_path) in temp_paths.iter().enumerate() {
            info!("Translating part {} of {}...", i + 1, temp_paths.len());

            match self
                .translate_chunk(temp_path, source_lang, target_lang)
                .await
            {
                Ok(chunk_entries) => translated_entries.extend(chunk_entries),
                Err(e) => {
                    warn!("Part {} failed, cleaning up {} temporary file(s)", i + 1, temp_paths.len());
                    Self::cleanup_temporaries(&temp_paths, source_lang, target_lang);
                    return Err(TranslationError::ChunkFailed {
                        index: i,
                        source: Box::new(e),
                    });
                }
            }
        }

        // Per-chunk numbering is meaningless across chunk boundaries
        let mut result = SubtitleCollection::new(path.to_path_buf());
        result.entries = translated_entries;
        result.renumber();

        let output = FileManager::translated_file_path(path, source_lang, target_lang);
        if let Err(e) = result.write_to_srt(&output) {
            Self::cleanup_temporaries(&temp_paths, source_lang, target_lang);
            return Err(TranslationError::File {
                path: output.display().to_string(),
                message: e.to_string(),
            });
        }

        info!(
            "Assembled {} translated subtitles into {:?}",
            result.entries.len(),
            output
        );
        Ok(output)
    }

    /// Fetch account quota. Fails soft: usage reporting is advisory, so
    /// any error yields zeroed stats instead of propagating.
    pub async fn usage_stats(&self) -> UsageStats {
        match self.api.usage().await {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Failed to fetch DeepL usage stats: {}", e);
                UsageStats::default()
            }
        }
    }

    // Materialize each planned chunk as a temporary SRT beside the source.
    // Names carry the chunk index and a millisecond timestamp so unrelated
    // invocations sharing the directory cannot collide.
    fn write_chunk_files(
        &self,
        source_path: &Path,
        entries: &[SubtitleEntry],
        ranges: &[std::ops::Range<usize>],
    ) -> Result<Vec<PathBuf>, TranslationError> {
        let dir = source_path.parent().unwrap_or_else(|| Path::new("."));
        let stamp = chrono::Utc::now().timestamp_millis();

        let mut temp_paths = Vec::with_capacity(ranges.len());
        for (i, range) in ranges.iter().enumerate() {
            let chunk_content = serialize_entries(&entries[range.clone()]);
            let temp_path = dir.join(format!("{}{}_{}.srt", TEMP_CHUNK_PREFIX, i, stamp));

            debug!(
                "Part {}: {} subtitles, {}KB -> {:?}",
                i + 1,
                range.len(),
                chunk_content.len() / 1024,
                temp_path
            );

            if let Err(e) = std::fs::write(&temp_path, &chunk_content) {
                for created in &temp_paths {
                    FileManager::remove_file_if_exists(created);
                }
                return Err(TranslationError::File {
                    path: temp_path.display().to_string(),
                    message: e.to_string(),
                });
            }
            temp_paths.push(temp_path);
        }

        Ok(temp_paths)
    }

    // Translate one temporary chunk and consume its result: parse the
    // translated counterpart and delete both files immediately.
    async fn translate_chunk(
        &self,
        temp_path: &Path,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<SubtitleEntry>, TranslationError> {
        let translated_path = self
            .translate_document(temp_path, source_lang, target_lang)
            .await?;

        let translated_content =
            std::fs::read_to_string(&translated_path).map_err(|e| TranslationError::File {
                path: translated_path.display().to_string(),
                message: e.to_string(),
            })?;
        let chunk_entries = SubtitleCollection::parse_srt_string(&translated_content)?;

        FileManager::remove_file_if_exists(temp_path);
        FileManager::remove_file_if_exists(&translated_path);

        Ok(chunk_entries)
    }

    // Best-effort deletion of every temporary chunk and any translated
    // counterpart still on disk. Idempotent; failures are logged inside
    // `remove_file_if_exists` and never replace the triggering error.
    fn cleanup_temporaries(temp_paths: &[PathBuf], source_lang: &str, target_lang: &str) {
        for temp_path in temp_paths {
            FileManager::remove_file_if_exists(temp_path);
            let translated = FileManager::translated_file_path(temp_path, source_lang, target_lang);
            FileManager::remove_file_if_exists(&translated);
        }
    }
}
