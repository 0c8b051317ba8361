use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use log::warn;
use walkdir::WalkDir;

// @module: File and directory utilities

/// Video container extensions the scanner recognizes
const VIDEO_EXTENSIONS: [&str; 6] = ["mkv", "mp4", "avi", "mov", "m4v", "webm"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    /// Derive the translated counterpart's path for a subtitle file.
    ///
    /// Given `name.ext`, a trailing `.{source_lang}` on the stem is
    /// stripped (case-insensitively) and replaced by `.{target_lang}`;
    /// the extension and directory are preserved. So `myfile.en.srt`
    /// translated to ES becomes `myfile.es.srt`, and `myfile.srt`
    /// becomes `myfile.es.srt`.
    pub fn translated_file_path<P: AsRef<Path>>(
        path: P,
        source_lang: &str,
        target_lang: &str,
    ) -> PathBuf {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_string());

        let source_suffix = format!(".{}", source_lang.to_lowercase());
        let base = stem
            .strip_suffix(&source_suffix)
            // suffix match is ASCII-case-insensitive; compare the original
            // tail so multi-byte case folds cannot shift the split point
            .or_else(|| {
                let split = stem.len().checked_sub(source_suffix.len())?;
                (stem.is_char_boundary(split)
                    && stem[split..].eq_ignore_ascii_case(&source_suffix))
                .then(|| &stem[..split])
            })
            .unwrap_or(&stem);

        let new_name = match extension {
            Some(ext) => format!("{}.{}.{}", base, target_lang.to_lowercase(), ext),
            None => format!("{}.{}", base, target_lang.to_lowercase()),
        };

        path.with_file_name(new_name)
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let target_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(target_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Find subtitle files in a directory, recursively
    pub fn find_subtitle_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        Self::find_files(dir, "srt")
    }

    /// Find video files in a directory, recursively
    pub fn find_video_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    let ext = ext.to_string_lossy().to_lowercase();
                    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Delete a file if it exists. Deleting an already-absent file is not
    /// an error; other failures are logged and reported as `false` so
    /// cleanup paths never mask the error that triggered them.
    pub fn remove_file_if_exists<P: AsRef<Path>>(path: P) -> bool {
        let path = path.as_ref();
        match fs::remove_file(path) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                warn!("Failed to delete {:?}: {}", path, e);
                false
            }
        }
    }
}
