use anyhow::{anyhow, Result};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// DeepL takes ISO 639-1 (2-letter) codes; embedded subtitle tracks are
/// usually tagged with ISO 639-2 (3-letter) codes. This module validates
/// the former and matches across both for track selection.

/// Validate a 2-letter ISO 639-1 language code, as used by DeepL
pub fn validate_language_code(code: &str) -> Result<Language> {
    let normalized = code.trim().to_lowercase();
    Language::from_639_1(&normalized)
        .ok_or_else(|| anyhow!("Invalid ISO 639-1 language code: {}", code))
}

/// English name of a language, from its 2- or 3-letter code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = code.trim().to_lowercase();
    let language = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(&normalized),
        _ => None,
    };
    language
        .map(|l| l.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Whether two language codes name the same language, across ISO 639-1
/// and ISO 639-2 forms (e.g. `en` matches `eng`)
pub fn language_codes_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a == b {
        return true;
    }

    let resolve = |code: &str| {
        // Common ISO 639-2/B tags seen in video containers, mapped to /T
        let code = match code {
            "fre" => "fra",
            "ger" => "deu",
            "dut" => "nld",
            "gre" => "ell",
            "chi" => "zho",
            "cze" => "ces",
            other => other,
        };
        match code.len() {
            2 => Language::from_639_1(code),
            3 => Language::from_639_3(code),
            _ => None,
        }
    };

    match (resolve(&a), resolve(&b)) {
        (Some(la), Some(lb)) => la == lb,
        _ => false,
    }
}
