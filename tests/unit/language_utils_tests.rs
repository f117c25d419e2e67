/*!
 * Tests for language hint normalization
 */

use audio_to_subs::language_utils::{get_language_name, normalize_language_hint};

/// Test that all accepted code shapes normalize to ISO 639-1
#[test]
fn test_normalizeLanguageHint_withVariousCodes_shouldReturnPart1() {
    assert_eq!(normalize_language_hint("en").unwrap(), "en");
    assert_eq!(normalize_language_hint("eng").unwrap(), "en");
    assert_eq!(normalize_language_hint("spa").unwrap(), "es");
    assert_eq!(normalize_language_hint("dut").unwrap(), "nl");
    assert_eq!(normalize_language_hint("JA").unwrap(), "ja");
}

/// Test that invalid hints are rejected with the code in the message
#[test]
fn test_normalizeLanguageHint_withInvalidCode_shouldNameIt() {
    let err = normalize_language_hint("qqq").unwrap_err();
    assert!(err.to_string().contains("qqq"));
    assert!(normalize_language_hint("").is_err());
}

/// Test that names resolve for log output
#[test]
fn test_getLanguageName_withKnownCodes_shouldReturnNames() {
    assert_eq!(get_language_name("fr").unwrap(), "French");
    assert_eq!(get_language_name("ger").unwrap(), "German");
}
