// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::app_config::Config;
use crate::app_controller::Controller;

mod app_config;
mod app_controller;
mod chunk_planner;
mod deepl;
mod errors;
mod file_utils;
mod language_utils;
mod media_extractor;
mod plex;
mod subtitle_processor;
mod translator;

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate an SRT subtitle file with DeepL
    Translate {
        /// Subtitle file to translate
        #[arg(value_name = "SUBTITLE_FILE")]
        input_file: PathBuf,

        /// Source language code (e.g., 'en')
        #[arg(short, long)]
        source_language: Option<String>,

        /// Target language code (e.g., 'es')
        #[arg(short, long)]
        target_language: Option<String>,
    },

    /// Extract an embedded subtitle track from a video file
    Extract {
        /// Video file to extract from
        #[arg(value_name = "VIDEO_FILE")]
        video_file: PathBuf,

        /// Language of the track to extract (defaults to the configured source language)
        #[arg(long)]
        language: Option<String>,
    },

    /// List subtitle and video files under a directory
    Scan {
        /// Directory to scan
        #[arg(value_name = "DIRECTORY")]
        directory: PathBuf,
    },

    /// Show DeepL character quota usage
    Usage,

    /// Generate shell completions for deepsub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// deepsub - DeepL-powered subtitle translation
///
/// Translates SRT subtitle files with the DeepL document API. Files over
/// DeepL's per-request size limits are split into valid SRT parts,
/// translated sequentially, and reassembled in order.
#[derive(Parser, Debug)]
#[command(name = "deepsub")]
#[command(version = "1.0.0")]
#[command(about = "DeepL-powered subtitle translation tool")]
#[command(long_about = "deepsub translates SRT subtitle files using the DeepL document API,
splitting files that exceed DeepL's per-request limits into valid SRT
parts and reassembling the translated results in order.

EXAMPLES:
    deepsub translate show.s01e01.en.srt            # en -> es per config
    deepsub translate -s en -t fr movie.en.srt      # override languages
    deepsub extract movie.mkv                       # extract embedded subtitles
    deepsub extract --language fr movie.mkv         # extract the French track
    deepsub scan /media/tv                          # list subtitle/video files
    deepsub usage                                   # DeepL quota
    deepsub completions bash > deepsub.bash         # shell completions

CONFIGURATION:
    Configuration is stored in conf.json by default (override with
    --config-path). The DeepL API key comes from 'deepl.api_key' in the
    config or the DEEPL_API_KEY environment variable.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize at info; the level is raised or lowered once the config
    // and CLI flags are known
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "deepsub", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = load_config(&cli.config_path)?;

    if let Some(cmd_log_level) = &cli.log_level {
        config.log_level = cmd_log_level.clone().into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    match cli.command {
        Commands::Translate {
            input_file,
            source_language,
            target_language,
        } => {
            if let Some(source) = source_language {
                config.source_language = source;
            }
            if let Some(target) = target_language {
                config.target_language = target;
            }
            let controller = Controller::with_config(config)?;
            let output = controller.run_translate(&input_file).await?;
            println!("{}", output.display());
        }
        Commands::Extract {
            video_file,
            language,
        } => {
            let controller = Controller::with_config(config)?;
            let output = controller
                .run_extract(&video_file, language.as_deref())
                .await?;
            println!("{}", output.display());
        }
        Commands::Scan { directory } => {
            let controller = Controller::with_config(config)?;
            let (subtitles, videos) = controller.run_scan(&directory).await?;
            println!("Subtitle files ({}):", subtitles.len());
            for path in subtitles {
                println!("  {}", path.display());
            }
            println!("Video files ({}):", videos.len());
            for (path, language) in videos {
                println!("  {} [subtitles: {}]", path.display(), language);
            }
        }
        Commands::Usage => {
            let controller = Controller::with_config(config)?;
            let stats = controller.run_usage().await;
            println!(
                "Characters used: {} / {}",
                stats.character_count, stats.character_limit
            );
        }
        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

// Load the config file, or start from defaults when it does not exist.
// The API key may come from the environment; core components only ever
// see the explicit config value.
fn load_config(config_path: &str) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        Config::from_file(config_path)?
    } else {
        info!("No config file at {}, using defaults", config_path);
        Config::default()
    };

    if config.deepl.api_key.is_empty() {
        if let Ok(key) = std::env::var("DEEPL_API_KEY") {
            config.deepl.api_key = key;
        }
    }

    Ok(config)
}
