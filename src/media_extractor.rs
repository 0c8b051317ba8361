use std::path::Path;
use anyhow::{anyhow, Context, Result};
use log::{debug, error, warn};
use serde_json::{from_str, Value};
use tokio::process::Command;

use crate::language_utils;

// @module: Embedded subtitle extraction via ffmpeg/ffprobe

/// One subtitle stream found in a video container
#[derive(Debug, Clone)]
pub struct SubtitleTrack {
    /// Stream index in the container
    pub index: usize,
    /// Codec name as reported by ffprobe
    pub codec_name: String,
    /// Language tag, when present
    pub language: Option<String>,
    /// Title tag, when present
    pub title: Option<String>,
}

/// Extracts embedded subtitle tracks from video containers
pub struct MediaExtractor;

impl MediaExtractor {
    /// List subtitle tracks in a video file
    pub async fn list_subtitle_tracks<P: AsRef<Path>>(video_path: P) -> Result<Vec<SubtitleTrack>> {
        let video_path = video_path.as_ref();

        if !video_path.exists() {
            return Err(anyhow!("Video file not found: {:?}", video_path));
        }

        // Timeout prevents hanging on problematic files
        let ffprobe_future = Command::new("ffprobe")
            .args([
                "-v", "quiet",
                "-print_format", "json",
                "-show_streams",
                "-select_streams", "s",
                video_path.to_str().unwrap_or(""),
            ])
            .output();

        let timeout_duration = std::time::Duration::from_secs(60);
        let output = tokio::select! {
            result = ffprobe_future => {
                result.map_err(|e| anyhow!("Failed to execute ffprobe command: {}", e))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(anyhow!("ffprobe command timed out after 60 seconds"));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("ffprobe failed: {}", stderr);
            return Err(anyhow!("ffprobe command failed: {}", stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_ffprobe_streams(&stdout)
    }

    /// Parse ffprobe `-show_streams` JSON into subtitle track descriptors.
    /// Missing tags are tolerated; a missing `streams` array yields an
    /// empty list.
    pub fn parse_ffprobe_streams(output: &str) -> Result<Vec<SubtitleTrack>> {
        if output.trim().is_empty() {
            return Ok(Vec::new());
        }

        let json: Value = from_str(output).context("Failed to parse ffprobe JSON output")?;

        let mut tracks = Vec::new();
        if let Some(streams) = json.get("streams").and_then(|s| s.as_array()) {
            for stream in streams {
                let index = stream
                    .get("index")
                    .and_then(|v| v.as_u64())
                    .map(|v| v as usize)
                    .unwrap_or(0);

                let codec_name = stream
                    .get("codec_name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown");

                let language = stream
                    .get("tags")
                    .and_then(|t| t.get("language"))
                    .and_then(|l| l.as_str())
                    .map(|s| s.to_string());

                let title = stream
                    .get("tags")
                    .and_then(|t| t.get("title"))
                    .and_then(|l| l.as_str())
                    .map(|s| s.to_string());

                tracks.push(SubtitleTrack {
                    index,
                    codec_name: codec_name.to_string(),
                    language,
                    title,
                });
            }
        }

        Ok(tracks)
    }

    /// Probe the language of the first tagged subtitle stream, or "unknown"
    pub async fn detect_subtitle_language<P: AsRef<Path>>(video_path: P) -> String {
        match Self::list_subtitle_tracks(video_path).await {
            Ok(tracks) => tracks
                .into_iter()
                .find_map(|t| t.language)
                .unwrap_or_else(|| "unknown".to_string()),
            Err(e) => {
                warn!("Failed to probe subtitle language: {}", e);
                "unknown".to_string()
            }
        }
    }

    /// Check if a subtitle codec is bitmap-based (cannot be converted to text SRT)
    pub fn is_bitmap_codec(codec_name: &str) -> bool {
        matches!(
            codec_name,
            "hdmv_pgs_subtitle" | "dvd_subtitle" | "dvb_subtitle" | "xsub"
        )
    }

    /// Select a subtitle track matching the preferred language, falling back
    /// to English, falling back to the first track
    pub fn select_track(tracks: &[SubtitleTrack], preferred_language: &str) -> Option<usize> {
        if tracks.is_empty() {
            return None;
        }

        for track in tracks {
            if let Some(track_lang) = &track.language {
                if language_utils::language_codes_match(track_lang, preferred_language) {
                    return Some(track.index);
                }
            }

            // Some containers only carry the language in the title tag
            if let Some(title) = &track.title {
                let title_lower = title.to_lowercase();
                if let Ok(name) = language_utils::get_language_name(preferred_language) {
                    if title_lower.contains(&name.to_lowercase()) {
                        return Some(track.index);
                    }
                }
                if title_lower.contains(&preferred_language.to_lowercase()) {
                    return Some(track.index);
                }
            }
        }

        if !language_utils::language_codes_match(preferred_language, "en") {
            for track in tracks {
                if let Some(lang) = &track.language {
                    if language_utils::language_codes_match(lang, "en") {
                        return Some(track.index);
                    }
                }
                if let Some(title) = &track.title {
                    if title.to_lowercase().contains("english") {
                        return Some(track.index);
                    }
                }
            }
        }

        tracks.first().map(|t| t.index)
    }

    /// Extract one subtitle track to an SRT file
    pub async fn extract_track<P: AsRef<Path>>(
        video_path: P,
        track_index: usize,
        output_path: P,
    ) -> Result<()> {
        let video_path = video_path.as_ref();
        let output_path = output_path.as_ref();

        if !video_path.exists() {
            return Err(anyhow!("Video file does not exist: {:?}", video_path));
        }

        let ffmpeg_future = Command::new("ffmpeg")
            .args([
                "-y",
                "-i", video_path.to_str().unwrap_or_default(),
                "-map", &format!("0:{}", track_index),
                "-c:s", "srt",
                output_path.to_str().unwrap_or_default(),
            ])
            .output();

        let timeout_duration = std::time::Duration::from_secs(120);
        let result = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| anyhow!("Failed to execute ffmpeg for subtitle extraction: {}", e))?
            },
            _ = tokio::time::sleep(timeout_duration) => {
                return Err(anyhow!("ffmpeg command timed out after 2 minutes"));
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let filtered = Self::filter_ffmpeg_stderr(&stderr);
            error!("Subtitle extraction failed: {}", filtered);
            return Err(anyhow!(
                "No embedded subtitles could be extracted from track {}: {}",
                track_index,
                filtered
            ));
        }

        let file_size = std::fs::metadata(output_path)?.len();
        if file_size == 0 {
            return Err(anyhow!(
                "Extracted file is empty, no subtitles found in track {}",
                track_index
            ));
        }

        debug!(
            "Extracted track {} to {:?} ({} bytes)",
            track_index, output_path, file_size
        );
        Ok(())
    }

    /// Extract the best track for a preferred language, rejecting videos
    /// whose subtitle streams are all bitmap-based
    pub async fn extract_preferred<P: AsRef<Path>>(
        video_path: P,
        preferred_language: &str,
        output_path: P,
    ) -> Result<()> {
        let video_path_ref = video_path.as_ref();
        let tracks = Self::list_subtitle_tracks(video_path_ref).await?;

        if tracks.is_empty() {
            return Err(anyhow!("No subtitle tracks found in the video"));
        }

        let text_tracks: Vec<SubtitleTrack> = tracks
            .iter()
            .filter(|t| !Self::is_bitmap_codec(&t.codec_name))
            .cloned()
            .collect();

        if text_tracks.is_empty() {
            let codec_list: Vec<String> = tracks
                .iter()
                .map(|t| {
                    let lang = t.language.as_deref().unwrap_or("?");
                    format!("track {} ({}, {})", t.index, lang, t.codec_name)
                })
                .collect();
            return Err(anyhow!(
                "All subtitle tracks are bitmap-based (image) and cannot be converted to text SRT. \
                 Found: {}. Bitmap subtitles (PGS/VobSub) require OCR to convert to text.",
                codec_list.join(", ")
            ));
        }

        let bitmap_count = tracks.len() - text_tracks.len();
        if bitmap_count > 0 {
            warn!(
                "Skipping {} bitmap subtitle track(s): only text-based tracks can be extracted",
                bitmap_count
            );
        }

        let track_index = Self::select_track(&text_tracks, preferred_language).ok_or_else(|| {
            anyhow!(
                "No text-based subtitle track found for language: {}",
                preferred_language
            )
        })?;

        Self::extract_track(video_path_ref, track_index, output_path.as_ref()).await
    }

    /// Filter ffmpeg stderr to only show meaningful error lines, stripping the
    /// version banner, build configuration, and stream metadata noise.
    pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
        let dominated_prefixes = [
            "ffmpeg version",
            "  built with",
            "  configuration:",
            "  lib",
            "Input #",
            "  Metadata:",
            "  Duration:",
            "  Chapter",
            "    Chapter",
            "  Stream #",
            "      Metadata:",
            "        title",
            "        BPS",
            "        DURATION",
            "        NUMBER_OF",
            "        _STATISTICS",
            "Output #",
            "Stream mapping:",
            "Press [q]",
        ];

        let meaningful: Vec<&str> = stderr
            .lines()
            .filter(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return false;
                }
                !dominated_prefixes.iter().any(|p| line.starts_with(p) || trimmed.starts_with(p))
            })
            .collect();

        if meaningful.is_empty() {
            "unknown ffmpeg error (stderr was empty after filtering)".to_string()
        } else {
            meaningful.join("\n")
        }
    }
}
