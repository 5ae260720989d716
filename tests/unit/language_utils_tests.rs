/*!
 * Tests for ISO language code handling
 */

use subtitler::language_utils::{get_language_name, normalize_to_part1_or_part2t, validate_language_code};

#[test]
fn test_validateLanguageCode_shouldAcceptPart1AndPart2Codes() {
    for code in ["es", "en", "EN", "spa", "eng", "fre", "fra", "ger", "deu"] {
        assert!(validate_language_code(code).is_ok(), "{} should be valid", code);
    }
}

#[test]
fn test_validateLanguageCode_shouldRejectUnknownCodes() {
    for code in ["", "x", "zz", "qqq", "english"] {
        assert!(validate_language_code(code).is_err(), "{} should be invalid", code);
    }
}

#[test]
fn test_normalize_shouldPreferTwoLetterCodes() {
    assert_eq!(normalize_to_part1_or_part2t("eng").unwrap(), "en");
    assert_eq!(normalize_to_part1_or_part2t("fre").unwrap(), "fr");
    assert_eq!(normalize_to_part1_or_part2t("es").unwrap(), "es");
}

#[test]
fn test_normalize_withoutPart1Code_shouldFallBackToThreeLetters() {
    // Hawaiian has no ISO 639-1 code
    assert_eq!(normalize_to_part1_or_part2t("haw").unwrap(), "haw");
}

#[test]
fn test_getLanguageName_shouldResolveEnglishNames() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("deu").unwrap(), "German");
    assert_eq!(get_language_name("fre").unwrap(), "French");
}
