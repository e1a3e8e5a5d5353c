// Heuristic repair of Arabic lines whose tokens were captured in visual
// (left-to-right) order instead of logical order.

use crate::correction::pipeline::CorrectionPass;
use crate::correction::script::is_arabic_char;
use crate::models::{CorrectionKind, CorrectionRecord, PassOutput};
use crate::utils::OcrError;

const REVERSAL_CONFIDENCE: f64 = 0.7;
const OPENING_CONFIDENCE: f64 = 0.8;
const NUMBER_SWAP_CONFIDENCE: f64 = 0.7;

/// Words that open the operative clause of a decree.
const OPENING_WORDS: &[&str] = &["إن", "بمقتضى", "وبمقتضى", "يرسم", "يقرر", "يأمر"];

/// Prepositions and conjunctions that cannot end a clause.
const FUNCTION_WORDS: &[&str] = &[
    "في", "من", "على", "إلى", "الى", "عن", "مع", "و", "أو", "ثم", "بين", "حتى", "منذ", "لدى",
    "عند", "التي", "الذي", "الذين", "أن", "لكن", "بل", "قد", "لم", "لن",
];

const NUMBER_KEYWORD: &str = "رقم";

const TERMINAL_PUNCTUATION: &[char] = &['.', '!', '?', '؟'];

pub struct DirectionCorrector {
    arabic_threshold: f64,
}

impl Default for DirectionCorrector {
    fn default() -> Self {
        DirectionCorrector {
            arabic_threshold: 0.7,
        }
    }
}

impl DirectionCorrector {
    pub fn new(arabic_threshold: f64) -> Self {
        DirectionCorrector { arabic_threshold }
    }

    pub fn correct_direction(&self, text: &str) -> PassOutput {
        let mut lines = Vec::new();
        let mut corrections = Vec::new();
        let mut line_start = 0;

        for line in text.split('\n') {
            let corrected = if self.is_arabic_line(line) {
                self.correct_line(line, line_start, &mut corrections)
            } else {
                None
            };
            lines.push(corrected.unwrap_or_else(|| line.to_string()));
            line_start += line.chars().count() + 1;
        }

        if corrections.is_empty() {
            return PassOutput::unchanged(text);
        }

        log::debug!("reordered {} line(s)", corrections.len());
        PassOutput {
            text: lines.join("\n"),
            corrections,
        }
    }

    fn is_arabic_line(&self, line: &str) -> bool {
        let mut total = 0usize;
        let mut arabic = 0usize;
        for c in line.chars().filter(|c| !c.is_whitespace()) {
            total += 1;
            if is_arabic_char(c) {
                arabic += 1;
            }
        }
        total > 0 && arabic as f64 / total as f64 > self.arabic_threshold
    }

    fn correct_line(&self, line: &str, position: usize, corrections: &mut Vec<CorrectionRecord>) -> Option<String> {
        let mut tokens: Vec<&str> = line.split_whitespace().collect();
        let mut current = line.to_string();
        let mut changed = false;

        if let Some((reordered, description, confidence)) = reorder_tokens(&tokens) {
            let corrected = reordered.join(" ");
            corrections.push(record(&current, &corrected, position, description, confidence));
            current = corrected;
            tokens = reordered;
            changed = true;
        }

        if let Some(swapped) = swap_trailing_number(&tokens) {
            let corrected = swapped.join(" ");
            corrections.push(record(
                &current,
                &corrected,
                position,
                "number keyword before numeral",
                NUMBER_SWAP_CONFIDENCE,
            ));
            current = corrected;
            changed = true;
        }

        if changed {
            Some(current)
        } else {
            None
        }
    }
}

impl CorrectionPass for DirectionCorrector {
    fn name(&self) -> &'static str {
        "rtl_direction"
    }

    fn apply(&self, text: &str) -> Result<PassOutput, OcrError> {
        Ok(self.correct_direction(text))
    }
}

fn reorder_tokens<'a>(tokens: &[&'a str]) -> Option<(Vec<&'a str>, &'static str, f64)> {
    let (first, last) = match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) if tokens.len() >= 2 => (*first, *last),
        _ => return None,
    };

    if OPENING_WORDS.contains(&last) {
        let mut moved = Vec::with_capacity(tokens.len());
        moved.push(last);
        moved.extend_from_slice(&tokens[..tokens.len() - 1]);
        return Some((moved, "document opening word moved to front", OPENING_CONFIDENCE));
    }

    if tokens.len() >= 3 && FUNCTION_WORDS.contains(&last) {
        let reversed: Vec<&str> = tokens.iter().rev().copied().collect();
        return Some((reversed, "line ends with sentence-initial word", REVERSAL_CONFIDENCE));
    }

    if first.chars().any(is_arabic_char)
        && first.ends_with(TERMINAL_PUNCTUATION)
        && !last.ends_with(TERMINAL_PUNCTUATION)
    {
        let reversed: Vec<&str> = tokens.iter().rev().copied().collect();
        return Some((reversed, "terminal punctuation at line start", REVERSAL_CONFIDENCE));
    }

    None
}

// "12 رقم" at the end of a line becomes "رقم 12".
fn swap_trailing_number<'a>(tokens: &[&'a str]) -> Option<Vec<&'a str>> {
    let n = tokens.len();
    if n < 2 || tokens[n - 1] != NUMBER_KEYWORD || !is_numeral(tokens[n - 2]) {
        return None;
    }
    let mut swapped = tokens.to_vec();
    swapped.swap(n - 2, n - 1);
    Some(swapped)
}

fn is_numeral(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || ('\u{0660}'..='\u{0669}').contains(&c) || c == '-' || c == '/')
        && token.chars().any(|c| c.is_ascii_digit() || ('\u{0660}'..='\u{0669}').contains(&c))
}

fn record(original: &str, corrected: &str, position: usize, description: &str, confidence: f64) -> CorrectionRecord {
    CorrectionRecord {
        kind: CorrectionKind::RtlDirection,
        original: original.to_string(),
        corrected: corrected.to_string(),
        confidence,
        position,
        description: description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correct(text: &str) -> PassOutput {
        DirectionCorrector::default().correct_direction(text)
    }

    #[test]
    fn test_line_ending_with_preposition_is_reversed() {
        let out = correct("الجمهورية رئيس مرسوم في");
        assert_eq!(out.text, "في مرسوم رئيس الجمهورية");
        assert_eq!(out.corrections.len(), 1);
        assert_eq!(out.corrections[0].kind, CorrectionKind::RtlDirection);
        assert_eq!(out.corrections[0].confidence, REVERSAL_CONFIDENCE);
    }

    #[test]
    fn test_line_without_function_word_is_untouched() {
        let text = "الجمهورية رئيس مرسوم تنفيذي";
        let out = correct(text);
        assert_eq!(out.text, text);
        assert!(out.corrections.is_empty());
    }

    #[test]
    fn test_two_token_line_not_reversed() {
        let text = "مرسوم في";
        assert_eq!(correct(text).text, text);
    }

    #[test]
    fn test_opening_word_moved_to_front() {
        let out = correct("رئيس الجمهورية إن");
        assert_eq!(out.text, "إن رئيس الجمهورية");
        assert_eq!(out.corrections[0].confidence, OPENING_CONFIDENCE);
    }

    #[test]
    fn test_terminal_punctuation_at_start() {
        let out = correct("الجمهورية. رئيس مرسوم");
        assert_eq!(out.text, "مرسوم رئيس الجمهورية.");
    }

    #[test]
    fn test_numbered_line_not_reversed() {
        let text = "1. المادة الأولى";
        assert_eq!(correct(text).text, text);
    }

    #[test]
    fn test_trailing_number_keyword_swapped() {
        let out = correct("مرسوم تنفيذي 05 رقم");
        assert_eq!(out.text, "مرسوم تنفيذي رقم 05");
        assert_eq!(out.corrections.len(), 1);
        assert_eq!(out.corrections[0].description, "number keyword before numeral");
    }

    #[test]
    fn test_latin_and_mixed_lines_pass_through() {
        let text = "Décret exécutif n° 05 de\nArticle 5 من";
        let out = correct(text);
        assert_eq!(out.text, text);
        assert!(out.corrections.is_empty());
    }

    #[test]
    fn test_only_affected_line_changes() {
        let text = "Journal officiel\nالجمهورية رئيس مرسوم في\n  ";
        let out = correct(text);
        assert_eq!(out.text, "Journal officiel\nفي مرسوم رئيس الجمهورية\n  ");
        assert_eq!(out.corrections[0].position, 17);
    }

    #[test]
    fn test_empty_text() {
        let out = correct("");
        assert_eq!(out.text, "");
        assert!(out.corrections.is_empty());
    }

    // Small labelled set of OCR lines; each pair is (captured, expected).
    #[test]
    fn test_labelled_regression_lines() {
        let cases = [
            ("الوزير تقرير على بناء و", "و بناء على تقرير الوزير"),
            ("الرسمية الجريدة في", "في الجريدة الرسمية"),
            ("الحكومة رئيس مع", "مع رئيس الحكومة"),
            ("المادة الأولى من هذا المرسوم", "المادة الأولى من هذا المرسوم"),
            ("يرسم ما يأتي", "يرسم ما يأتي"),
        ];
        let corrector = DirectionCorrector::default();
        for (captured, expected) in cases {
            assert_eq!(corrector.correct_direction(captured).text, expected, "{}", captured);
        }
    }
}
