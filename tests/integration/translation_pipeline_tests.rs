/*!
 * End-to-end translation pipeline tests against the mock DeepL API.
 *
 * These drive `DocumentTranslator` exactly as the CLI does, but with a
 * scripted service, a scratch directory, and millisecond polling.
 */

use std::time::Duration;
use deepsub::chunk_planner::ChunkPlanner;
use deepsub::deepl::mock::MockApi;
use deepsub::errors::{DeepLError, TranslationError};
use deepsub::subtitle_processor::{serialize_entries, SubtitleCollection};
use deepsub::translator::DocumentTranslator;
use crate::common;

fn fast_translator(api: MockApi) -> DocumentTranslator<MockApi> {
    DocumentTranslator::new(api).with_poll_interval(Duration::from_millis(1))
}

/// Single-document happy path: translated file lands at the derived path
#[tokio::test]
async fn test_translate_document_withWorkingService_shouldWriteDerivedPath() {
    common::init_logging();
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_srt(dir.path(), "movie.en.srt", &common::sample_srt());

    let translator = fast_translator(MockApi::working());
    let output = translator
        .translate_document(&source, "EN", "ES")
        .await
        .unwrap();

    assert_eq!(output, dir.path().join("movie.es.srt"));
    let translated = SubtitleCollection::from_file(&output).unwrap();
    assert_eq!(translated.entries.len(), 3);
    assert!(translated.entries[0].text.ends_with("[ES]"));
}

/// A job that needs several polls still completes
#[tokio::test]
async fn test_translate_document_withSlowJob_shouldPollUntilDone() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_srt(dir.path(), "movie.en.srt", &common::sample_srt());

    let translator = fast_translator(MockApi::slow(3));
    let output = translator
        .translate_document(&source, "en", "es")
        .await
        .unwrap();

    assert!(output.exists());
}

/// Terminal `error` status surfaces the service's exact message
#[tokio::test]
async fn test_translate_document_withJobError_shouldCarryServiceMessage() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_srt(dir.path(), "movie.en.srt", &common::sample_srt());

    let translator = fast_translator(MockApi::job_error("bad language pair"));
    let err = translator
        .translate_document(&source, "en", "es")
        .await
        .unwrap_err();

    match err {
        TranslationError::JobFailed { message } => assert_eq!(message, "bad language pair"),
        other => panic!("expected JobFailed, got {:?}", other),
    }
}

/// A terminal error without a service message gets the generic fallback
#[tokio::test]
async fn test_translate_document_withBlankJobError_shouldUseGenericMessage() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_srt(dir.path(), "movie.en.srt", &common::sample_srt());

    let translator = fast_translator(MockApi::job_error_blank());
    let err = translator
        .translate_document(&source, "en", "es")
        .await
        .unwrap_err();

    match err {
        TranslationError::JobFailed { message } => assert_eq!(message, "Translation failed"),
        other => panic!("expected JobFailed, got {:?}", other),
    }
}

/// The bounded poll loop gives up with PollTimeout
#[tokio::test]
async fn test_translate_document_withStuckJob_shouldTimeOut() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_srt(dir.path(), "movie.en.srt", &common::sample_srt());

    let translator = fast_translator(MockApi::never_done()).with_max_poll_attempts(Some(3));
    let err = translator
        .translate_document(&source, "en", "es")
        .await
        .unwrap_err();

    assert!(matches!(err, TranslationError::PollTimeout { attempts: 3 }));
}

/// The size-limit rejection is distinguishable from generic failures
#[tokio::test]
async fn test_translate_document_withSizeLimitedService_shouldBeRecognizable() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_srt(dir.path(), "movie.en.srt", &common::sample_srt());

    let translator = fast_translator(MockApi::size_limited());
    let err = translator
        .translate_document(&source, "en", "es")
        .await
        .unwrap_err();

    assert!(err.is_size_limit());
    assert!(matches!(
        err,
        TranslationError::Api(DeepLError::SizeLimitExceeded { .. })
    ));
}

/// Large-document happy path: multiple chunks, order preserved, entries
/// renumbered 1..N, and no temporary files left behind
#[tokio::test]
async fn test_translate_large_document_withMultipleChunks_shouldReassembleInOrder() {
    common::init_logging();
    let dir = tempfile::tempdir().unwrap();

    // Non-contiguous source numbering; 8 entries forced into 4 chunks of 2
    let mut entries = common::make_entries(8, 100);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.seq_num = (i + 1) * 10;
        entry.text = format!("subtitle number {:02} {}", i, entry.text);
    }
    let source = common::write_srt(dir.path(), "large.en.srt", &serialize_entries(&entries));

    let per_chunk = entries[0].serialized_len() * 2 + 10;
    let api = MockApi::working();
    let translator = fast_translator(api).with_planner(ChunkPlanner::new(per_chunk, 1_000_000));

    let output = translator
        .translate_large_document(&source, "EN", "ES")
        .await
        .unwrap();

    assert_eq!(output, dir.path().join("large.es.srt"));

    let translated = SubtitleCollection::from_file(&output).unwrap();
    assert_eq!(translated.entries.len(), 8);
    for (i, entry) in translated.entries.iter().enumerate() {
        // Renumbered 1..N regardless of the source's numbering
        assert_eq!(entry.seq_num, i + 1);
        // Source order preserved across chunk boundaries
        assert!(entry.text.starts_with(&format!("subtitle number {:02}", i)));
        assert!(entry.text.ends_with("[ES]"));
    }

    // Cleanup invariant: no temporary chunk files remain
    assert!(common::temp_chunk_files(dir.path()).is_empty());
}

/// A document that fits in one chunk still goes through the pipeline whole
#[tokio::test]
async fn test_translate_large_document_withSmallFile_shouldUseSingleChunk() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_srt(dir.path(), "small.en.srt", &common::sample_srt());

    let api = MockApi::working();
    let translator = fast_translator(api);
    let output = translator
        .translate_large_document(&source, "en", "es")
        .await
        .unwrap();

    let translated = SubtitleCollection::from_file(&output).unwrap();
    assert_eq!(translated.entries.len(), 3);
    assert!(common::temp_chunk_files(dir.path()).is_empty());
}

/// Chunk 2 of 4 failing aborts the rest, cleans every temporary, and
/// reports the failing chunk
#[tokio::test]
async fn test_translate_large_document_withFailingChunk_shouldCleanUpAndStop() {
    common::init_logging();
    let dir = tempfile::tempdir().unwrap();

    let entries = common::make_entries(8, 100);
    let source = common::write_srt(dir.path(), "large.en.srt", &serialize_entries(&entries));

    let per_chunk = entries[0].serialized_len() * 2 + 10;
    let translator = fast_translator(MockApi::fail_upload_at(1))
        .with_planner(ChunkPlanner::new(per_chunk, 1_000_000));

    let err = translator
        .translate_large_document(&source, "en", "es")
        .await
        .unwrap_err();

    match &err {
        TranslationError::ChunkFailed { index, .. } => assert_eq!(*index, 1),
        other => panic!("expected ChunkFailed, got {:?}", other),
    }

    // Chunks 3 and 4 were never submitted
    assert_eq!(translator_upload_count(&translator), 2);

    // All temporaries and any translated counterparts are gone
    assert!(common::temp_chunk_files(dir.path()).is_empty());
    // No final output was produced
    assert!(!dir.path().join("large.es.srt").exists());
    // The source is untouched
    assert!(source.exists());
}

/// Malformed input fails before anything is uploaded
#[tokio::test]
async fn test_translate_large_document_withMalformedInput_shouldFailFast() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_srt(dir.path(), "bad.en.srt", "not an srt document");

    let translator = fast_translator(MockApi::working());
    let err = translator
        .translate_large_document(&source, "en", "es")
        .await
        .unwrap_err();

    assert!(matches!(err, TranslationError::Subtitle(_)));
    assert_eq!(translator_upload_count(&translator), 0);
    assert!(common::temp_chunk_files(dir.path()).is_empty());
}

/// Usage reporting fails soft: a dead endpoint yields zeroed stats
#[test]
fn test_usage_stats_withFailingService_shouldReturnZeroedStats() {
    let translator = fast_translator(MockApi::usage_unavailable());
    let stats = tokio_test::block_on(translator.usage_stats());

    assert_eq!(stats.character_count, 0);
    assert_eq!(stats.character_limit, 0);
}

/// Usage reporting passes the service's numbers through when available
#[test]
fn test_usage_stats_withWorkingService_shouldReturnServiceNumbers() {
    let translator = fast_translator(MockApi::working());
    let stats = tokio_test::block_on(translator.usage_stats());

    assert_eq!(stats.character_count, 1234);
    assert_eq!(stats.character_limit, 500_000);
}

// The translator owns its API; expose the mock's upload counter through it
fn translator_upload_count(translator: &DocumentTranslator<MockApi>) -> usize {
    translator.api().upload_count()
}
