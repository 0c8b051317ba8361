use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::app_config::Config;
use crate::chunk_planner::ChunkPlanner;
use crate::deepl::client::DeepLClient;
use crate::deepl::UsageStats;
use crate::file_utils::FileManager;
use crate::media_extractor::MediaExtractor;
use crate::plex::PlexClient;
use crate::translator::DocumentTranslator;

// @module: Application controller wiring CLI commands to the pipeline

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    fn build_translator(&self) -> DocumentTranslator<DeepLClient> {
        let client = DeepLClient::new(
            self.config.deepl.api_key.clone(),
            self.config.deepl.endpoint.clone(),
        );
        let planner = ChunkPlanner::new(
            self.config.deepl.chunk_char_budget,
            self.config.deepl.chunk_file_size_limit,
        );
        DocumentTranslator::new(client)
            .with_planner(planner)
            .with_poll_interval(Duration::from_secs(self.config.deepl.polling_interval_secs))
            .with_max_poll_attempts(self.config.deepl.max_poll_attempts)
    }

    /// Translate one subtitle file, choosing between the single-document
    /// and large-document paths.
    ///
    /// A file already over the per-request byte limit goes straight to the
    /// chunked path; a smaller file tries the single-document path first
    /// and falls back to chunking if the service still reports a size
    /// rejection.
    pub async fn run_translate(&self, input_file: &Path) -> Result<PathBuf> {
        self.config.validate()?;

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Subtitle file not found: {:?}", input_file));
        }

        let source_lang = &self.config.source_language;
        let target_lang = &self.config.target_language;
        let translator = self.build_translator();

        let file_size = std::fs::metadata(input_file)
            .with_context(|| format!("Failed to stat {:?}", input_file))?
            .len() as usize;

        let spinner = Self::spinner(&format!(
            "Translating {:?} from {} to {}",
            input_file.file_name().unwrap_or_default(),
            source_lang,
            target_lang
        ));

        let result = if file_size > self.config.deepl.chunk_file_size_limit {
            info!(
                "File is {}KB, over the {}KB per-request limit; using large-document mode",
                file_size / 1024,
                self.config.deepl.chunk_file_size_limit / 1024
            );
            translator
                .translate_large_document(input_file, source_lang, target_lang)
                .await
        } else {
            match translator
                .translate_document(input_file, source_lang, target_lang)
                .await
            {
                Err(e) if e.is_size_limit() => {
                    warn!("Service rejected the document for size; retrying in large-document mode");
                    translator
                        .translate_large_document(input_file, source_lang, target_lang)
                        .await
                }
                other => other,
            }
        };

        spinner.finish_and_clear();
        let output = result?;
        info!("Translated subtitle written to {:?}", output);

        self.maybe_refresh_plex().await;

        Ok(output)
    }

    /// Extract an embedded subtitle track to `{stem}.{language}.srt`
    pub async fn run_extract(
        &self,
        video_file: &Path,
        language: Option<&str>,
    ) -> Result<PathBuf> {
        let language = language.unwrap_or(&self.config.source_language);
        crate::language_utils::validate_language_code(language)?;

        let stem = video_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| anyhow!("Video path has no file name: {:?}", video_file))?;
        let output = video_file.with_file_name(format!("{}.{}.srt", stem, language.to_lowercase()));

        let spinner = Self::spinner(&format!("Extracting {} subtitles", language));
        let result = MediaExtractor::extract_preferred(video_file, language, output.as_path()).await;
        spinner.finish_and_clear();
        result?;

        info!("Extracted subtitle written to {:?}", output);
        Ok(output)
    }

    /// List subtitle and video files under a directory. Each video is
    /// probed for its embedded subtitle language ("unknown" when the
    /// probe fails or no track is tagged).
    pub async fn run_scan(&self, dir: &Path) -> Result<(Vec<PathBuf>, Vec<(PathBuf, String)>)> {
        if !dir.is_dir() {
            return Err(anyhow!("Not a directory: {:?}", dir));
        }
        let subtitles = FileManager::find_subtitle_files(dir)?;
        let mut videos = Vec::new();
        for video in FileManager::find_video_files(dir)? {
            let language = MediaExtractor::detect_subtitle_language(&video).await;
            videos.push((video, language));
        }
        Ok((subtitles, videos))
    }

    /// Fetch quota from the service; advisory, zeroed on any failure
    pub async fn run_usage(&self) -> UsageStats {
        self.build_translator().usage_stats().await
    }

    // Plex refresh is best-effort: a translated file on disk is a success
    // even if the media server cannot be reached
    async fn maybe_refresh_plex(&self) {
        let Some(plex_config) = &self.config.plex else {
            return;
        };
        let plex = PlexClient::new(plex_config);
        if let Err(e) = plex.refresh_library().await {
            warn!("Plex library refresh failed: {}", e);
        } else {
            info!("Plex library refresh triggered");
        }
    }

    fn spinner(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }
}
