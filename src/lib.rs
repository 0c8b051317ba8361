/*!
 * # deepsub - DeepL-powered subtitle translation
 *
 * A Rust library and CLI for translating SRT subtitle files with the
 * DeepL document API.
 *
 * ## Features
 *
 * - Translate SRT files of any size: files over DeepL's per-request
 *   limits are split into valid SRT parts, translated sequentially
 *   through the upload/poll/download protocol, and reassembled in
 *   source order with renumbered entries
 * - Extract embedded subtitle tracks from video containers via ffmpeg
 * - Probe subtitle track languages via ffprobe
 * - Scan a media directory for subtitle and video files
 * - Report DeepL quota usage
 * - Trigger a Plex library refresh after translation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT document model (parse/serialize/renumber)
 * - `chunk_planner`: Partitioning entries under the service's size ceilings
 * - `deepl`: DeepL document API (`DocumentApi` trait, HTTP client, test mock)
 * - `translator`: Single- and large-document translation pipeline
 * - `file_utils`: File system operations and derived output paths
 * - `media_extractor`: ffmpeg/ffprobe subtitle extraction
 * - `plex`: Media-server library refresh
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod chunk_planner;
pub mod deepl;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod media_extractor;
pub mod plex;
pub mod subtitle_processor;
pub mod translator;

// Re-export main types for easier usage
pub use app_config::Config;
pub use chunk_planner::ChunkPlanner;
pub use errors::{AppError, DeepLError, SubtitleError, TranslationError};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use translator::DocumentTranslator;
