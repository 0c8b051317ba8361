/*!
 * Directory scan tests: file discovery plus the embedded-subtitle
 * language probe on each video.
 */

use std::path::Path;
use deepsub::app_config::Config;
use deepsub::app_controller::Controller;
use crate::common;

/// Scan separates subtitles from videos and probes each video's
/// embedded subtitle language, reporting "unknown" for files ffprobe
/// cannot inspect
#[tokio::test]
async fn test_run_scan_withMixedDirectory_shouldListFilesAndProbeLanguage() {
    common::init_logging();
    let dir = tempfile::tempdir().unwrap();
    let subtitle = common::write_srt(dir.path(), "movie.en.srt", &common::sample_srt());
    let video = dir.path().join("movie.mkv");
    std::fs::write(&video, b"not a real container").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

    let controller = Controller::with_config(Config::default()).unwrap();
    let (subtitles, videos) = controller.run_scan(dir.path()).await.unwrap();

    assert_eq!(subtitles, vec![subtitle]);
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].0, video);
    assert_eq!(videos[0].1, "unknown");
}

#[tokio::test]
async fn test_run_scan_withMissingDirectory_shouldFail() {
    let controller = Controller::with_config(Config::default()).unwrap();
    let result = controller
        .run_scan(Path::new("/definitely/not/here"))
        .await;

    assert!(result.is_err());
}
