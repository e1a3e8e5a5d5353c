// Script detection helpers shared by the correction passes

use crate::models::{select_profile, DocumentClass};

/// True for code points in the Arabic block, its supplements and the
/// presentation-form blocks.
pub fn is_arabic_char(c: char) -> bool {
    matches!(c,
        '\u{0600}'..='\u{06FF}'
        | '\u{0750}'..='\u{077F}'
        | '\u{08A0}'..='\u{08FF}'
        | '\u{FB50}'..='\u{FDFF}'
        | '\u{FE70}'..='\u{FEFC}')
}

/// Fraction of non-whitespace code points that are Arabic. Zero for empty or
/// whitespace-only input.
pub fn detect_script_ratio(text: &str) -> f64 {
    let mut arabic = 0usize;
    let mut total = 0usize;

    for c in text.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if is_arabic_char(c) {
            arabic += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }
    arabic as f64 / total as f64
}

pub fn detect_profile(text: &str) -> DocumentClass {
    select_profile(detect_script_ratio(text))
}

/// ISO 639-3 code of the dominant language, when the detector is confident.
pub fn detect_language(text: &str) -> Option<String> {
    let info = whatlang::detect(text)?;
    if !info.is_reliable() {
        return None;
    }
    Some(info.lang().code().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_ratio_is_zero() {
        assert_eq!(detect_script_ratio(""), 0.0);
        assert_eq!(detect_script_ratio("   \n\t "), 0.0);
    }

    #[test]
    fn test_pure_scripts() {
        assert_eq!(detect_script_ratio("الجريدة الرسمية"), 1.0);
        assert_eq!(detect_script_ratio("Journal officiel"), 0.0);
    }

    #[test]
    fn test_mixed_ratio_ignores_whitespace() {
        // 5 Arabic letters, 5 Latin letters
        let ratio = detect_script_ratio("قانون abcde");
        assert!((ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_presentation_forms_count_as_arabic() {
        assert_eq!(detect_script_ratio("\u{FEDF}\u{FEE0}\u{FEFB}"), 1.0);
        assert!(!is_arabic_char('\u{FEFF}'));
    }

    #[test]
    fn test_profile_selection_is_stable() {
        let text = "مرسوم تنفيذي رقم 05 du Journal officiel";
        let first = detect_profile(text);
        for _ in 0..5 {
            assert_eq!(detect_profile(text), first);
        }
    }
}
