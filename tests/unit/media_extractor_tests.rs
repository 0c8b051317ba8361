/*!
 * Unit tests for media extraction: ffprobe JSON parsing, track
 * selection, codec classification, and ffmpeg stderr filtering. None of
 * these require ffmpeg/ffprobe to be installed.
 */

use deepsub::media_extractor::{MediaExtractor, SubtitleTrack};

fn track(index: usize, codec: &str, language: Option<&str>, title: Option<&str>) -> SubtitleTrack {
    SubtitleTrack {
        index,
        codec_name: codec.to_string(),
        language: language.map(|s| s.to_string()),
        title: title.map(|s| s.to_string()),
    }
}

/// A realistic ffprobe -show_streams payload parses into tracks
#[test]
fn test_parse_ffprobe_streams_withTaggedStreams_shouldExtractAllFields() {
    let json = r#"{
        "streams": [
            {
                "index": 2,
                "codec_name": "subrip",
                "tags": { "language": "eng", "title": "English (SDH)" }
            },
            {
                "index": 3,
                "codec_name": "hdmv_pgs_subtitle",
                "tags": { "language": "spa" }
            }
        ]
    }"#;

    let tracks = MediaExtractor::parse_ffprobe_streams(json).unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].index, 2);
    assert_eq!(tracks[0].codec_name, "subrip");
    assert_eq!(tracks[0].language.as_deref(), Some("eng"));
    assert_eq!(tracks[0].title.as_deref(), Some("English (SDH)"));
    assert_eq!(tracks[1].index, 3);
    assert_eq!(tracks[1].language.as_deref(), Some("spa"));
    assert_eq!(tracks[1].title, None);
}

/// Streams without tags still parse, with language and title absent
#[test]
fn test_parse_ffprobe_streams_withMissingTags_shouldTolerateThem() {
    let json = r#"{ "streams": [ { "index": 1, "codec_name": "ass" } ] }"#;

    let tracks = MediaExtractor::parse_ffprobe_streams(json).unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].codec_name, "ass");
    assert_eq!(tracks[0].language, None);
    assert_eq!(tracks[0].title, None);
}

/// Empty output and a missing streams array both mean "no tracks"
#[test]
fn test_parse_ffprobe_streams_withNoStreams_shouldReturnEmpty() {
    assert!(MediaExtractor::parse_ffprobe_streams("").unwrap().is_empty());
    assert!(MediaExtractor::parse_ffprobe_streams("  \n").unwrap().is_empty());
    assert!(MediaExtractor::parse_ffprobe_streams("{}").unwrap().is_empty());
}

/// Garbage that is not JSON is an error, not an empty list
#[test]
fn test_parse_ffprobe_streams_withInvalidJson_shouldFail() {
    assert!(MediaExtractor::parse_ffprobe_streams("not json").is_err());
}

#[test]
fn test_is_bitmap_codec_shouldClassifyKnownCodecs() {
    assert!(MediaExtractor::is_bitmap_codec("hdmv_pgs_subtitle"));
    assert!(MediaExtractor::is_bitmap_codec("dvd_subtitle"));
    assert!(MediaExtractor::is_bitmap_codec("dvb_subtitle"));
    assert!(MediaExtractor::is_bitmap_codec("xsub"));
    assert!(!MediaExtractor::is_bitmap_codec("subrip"));
    assert!(!MediaExtractor::is_bitmap_codec("ass"));
    assert!(!MediaExtractor::is_bitmap_codec("mov_text"));
}

/// The preferred language wins, matching across ISO 639 forms
#[test]
fn test_select_track_withLanguageTag_shouldPreferRequestedLanguage() {
    let tracks = vec![
        track(2, "subrip", Some("eng"), None),
        track(3, "subrip", Some("spa"), None),
    ];

    assert_eq!(MediaExtractor::select_track(&tracks, "es"), Some(3));
    assert_eq!(MediaExtractor::select_track(&tracks, "en"), Some(2));
}

/// Containers that only carry the language in the title tag still match
#[test]
fn test_select_track_withLanguageInTitle_shouldMatchByTitle() {
    let tracks = vec![
        track(2, "subrip", None, Some("Forced")),
        track(3, "subrip", None, Some("Spanish (Latin America)")),
    ];

    assert_eq!(MediaExtractor::select_track(&tracks, "es"), Some(3));
}

/// With no track in the requested language, English is the fallback
#[test]
fn test_select_track_withNoRequestedLanguage_shouldFallBackToEnglish() {
    let tracks = vec![
        track(2, "subrip", Some("ger"), None),
        track(3, "subrip", Some("eng"), None),
    ];

    assert_eq!(MediaExtractor::select_track(&tracks, "fr"), Some(3));
}

/// With neither the requested language nor English, take the first track
#[test]
fn test_select_track_withNoMatches_shouldFallBackToFirst() {
    let tracks = vec![
        track(4, "subrip", Some("ger"), None),
        track(5, "subrip", Some("ita"), None),
    ];

    assert_eq!(MediaExtractor::select_track(&tracks, "ja"), Some(4));
}

#[test]
fn test_select_track_withNoTracks_shouldReturnNone() {
    assert_eq!(MediaExtractor::select_track(&[], "en"), None);
}

/// The version banner and stream metadata are noise; the error line stays
#[test]
fn test_filter_ffmpeg_stderr_withBannerAndError_shouldKeepOnlyTheError() {
    let stderr = [
        "ffmpeg version 6.0 Copyright (c) 2000-2023",
        "  built with gcc 12",
        "  configuration: --enable-gpl",
        "Input #0, matroska,webm, from 'movie.mkv':",
        "  Metadata:",
        "  Duration: 01:30:00.00",
        "Stream mapping:",
        "Subtitle encoding currently only possible from text to text or bitmap to bitmap",
    ]
    .join("\n");

    let filtered = MediaExtractor::filter_ffmpeg_stderr(&stderr);

    assert_eq!(
        filtered,
        "Subtitle encoding currently only possible from text to text or bitmap to bitmap"
    );
}

/// Nothing meaningful left after filtering yields a fixed explanation
#[test]
fn test_filter_ffmpeg_stderr_withOnlyNoise_shouldExplainEmptiness() {
    let stderr = "ffmpeg version 6.0\n  built with gcc 12\n";

    let filtered = MediaExtractor::filter_ffmpeg_stderr(stderr);

    assert!(filtered.contains("unknown ffmpeg error"));
}
