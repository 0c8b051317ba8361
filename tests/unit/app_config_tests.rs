/*!
 * Tests for configuration loading, defaults, and validation
 */

use deepsub::app_config::{Config, LogLevel};

/// Defaults carry the documented DeepL limits and polling cadence
#[test]
fn test_default_config_shouldCarryDocumentedDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "es");
    assert_eq!(config.deepl.endpoint, "https://api-free.deepl.com/v2");
    assert_eq!(config.deepl.polling_interval_secs, 5);
    assert_eq!(config.deepl.max_poll_attempts, Some(120));
    assert_eq!(config.deepl.chunk_char_budget, 400_000);
    assert_eq!(config.deepl.chunk_file_size_limit, 130 * 1024);
    assert!(config.plex.is_none());
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Save then load round-trips the configuration
#[test]
fn test_config_save_and_from_file_shouldRoundTrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.target_language = "fr".to_string();
    config.deepl.api_key = "test-key".to_string();
    config.deepl.max_poll_attempts = None;
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.target_language, "fr");
    assert_eq!(loaded.deepl.api_key, "test-key");
    assert_eq!(loaded.deepl.max_poll_attempts, None);
}

/// A partial config file fills missing fields from defaults
#[test]
fn test_from_file_withPartialJson_shouldFillDefaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, r#"{ "target_language": "de" }"#).unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.target_language, "de");
    assert_eq!(config.source_language, "en");
    assert_eq!(config.deepl.polling_interval_secs, 5);
}

/// Validation rejects a missing API key
#[test]
fn test_validate_withoutApiKey_shouldFail() {
    let config = Config::default();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("API key"));
}

/// Validation rejects identical source and target languages
#[test]
fn test_validate_withSameLanguages_shouldFail() {
    let mut config = Config::default();
    config.deepl.api_key = "k".to_string();
    config.target_language = "en".to_string();
    assert!(config.validate().is_err());
}

/// Validation rejects non-ISO language codes
#[test]
fn test_validate_withBogusLanguage_shouldFail() {
    let mut config = Config::default();
    config.deepl.api_key = "k".to_string();
    config.source_language = "zz".to_string();
    assert!(config.validate().is_err());
}

/// A fully populated config validates
#[test]
fn test_validate_withCompleteConfig_shouldPass() {
    let mut config = Config::default();
    config.deepl.api_key = "k".to_string();
    assert!(config.validate().is_ok());
}
