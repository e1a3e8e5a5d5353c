use crate::correction::pipeline::CorrectionPass;
use crate::models::{CorrectionKind, PassOutput};
use crate::utils::OcrError;
use regex::{Captures, Regex};

use super::rules::{apply_rules, Replacement, Rule};

const NAMED_CONFIDENCE: f64 = 0.9;
const DIGIT_BOUNDARY_CONFIDENCE: f64 = 0.6;
const FINAL_LETTER_CONFIDENCE: f64 = 0.65;
const LONG_TOKEN_CONFIDENCE: f64 = 0.5;

// Glued pairs seen in Algerian decree headers, mapped to their reading order.
// The adjective follows the noun it qualifies, so pairs captured in visual
// order are listed separately rather than mirrored.
const NAMED_CONCATENATIONS: &[(&str, &str)] = &[
    ("رئاسيرقم", "رئاسي رقم"),
    ("تنفيذيرقم", "تنفيذي رقم"),
    ("وزاريرقم", "وزاري رقم"),
    ("مشتركرقم", "مشترك رقم"),
    ("قانونرقم", "قانون رقم"),
    ("قراررقم", "قرار رقم"),
    ("أمررقم", "أمر رقم"),
    ("مرسومرئاسي", "مرسوم رئاسي"),
    ("مرسومتنفيذي", "مرسوم تنفيذي"),
    ("قراروزاري", "قرار وزاري"),
    ("رئاسيمرسوم", "مرسوم رئاسي"),
    ("تنفيذيمرسوم", "مرسوم تنفيذي"),
    ("الجمهوريةالجزائرية", "الجمهورية الجزائرية"),
    ("الجزائريةالجمهورية", "الجمهورية الجزائرية"),
    ("الديمقراطيةالشعبية", "الديمقراطية الشعبية"),
    ("الجريدةالرسمية", "الجريدة الرسمية"),
    ("الرسميةالجريدة", "الجريدة الرسمية"),
    ("رئيسالجمهورية", "رئيس الجمهورية"),
    ("الوزيرالأول", "الوزير الأول"),
    ("المؤرخفي", "المؤرخ في"),
];

const LETTER: &str = r"[\x{0621}-\x{063A}\x{0641}-\x{064A}]";
const DIGIT: &str = r"[0-9\x{0660}-\x{0669}\x{06F0}-\x{06F9}]";

/// Splits Arabic tokens that OCR glued together.
pub struct WordSeparator {
    rules: Vec<Rule>,
}

impl WordSeparator {
    pub fn new(long_token_threshold: usize) -> Result<Self, OcrError> {
        if long_token_threshold < 2 {
            return Err(OcrError::ConfigError(format!(
                "long_token_threshold must be at least 2, got {}",
                long_token_threshold
            )));
        }

        let mut rules = Vec::new();
        for (glued, separated) in NAMED_CONCATENATIONS {
            rules.push(
                Rule::literal(glued, separated, format!("named concatenation {}", separated), NAMED_CONFIDENCE)
                    .map_err(regex_error)?,
            );
        }

        rules.push(Rule::new(
            compile(&format!("({}{{2,}})({}+)", LETTER, DIGIT))?,
            Replacement::Template("${1} ${2}"),
            "letters followed by digits",
            DIGIT_BOUNDARY_CONFIDENCE,
        ));
        rules.push(Rule::new(
            compile(&format!("({}+)({}{{2,}})", DIGIT, LETTER))?,
            Replacement::Template("${1} ${2}"),
            "digits followed by letters",
            DIGIT_BOUNDARY_CONFIDENCE,
        ));
        rules.push(Rule::new(
            compile(&format!("({})({}+)({})", LETTER, DIGIT, LETTER))?,
            Replacement::Template("${1} ${2} ${3}"),
            "digits between letters",
            DIGIT_BOUNDARY_CONFIDENCE,
        ));
        rules.push(Rule::new(
            compile(&format!("{}{{6,}}", LETTER))?,
            Replacement::Rewrite(split_after_final_letters),
            "word-final letter inside token",
            FINAL_LETTER_CONFIDENCE,
        ));
        rules.push(Rule::new(
            compile(&format!("{}{{{},}}", LETTER, long_token_threshold))?,
            Replacement::Rewrite(split_at_midpoint),
            "long token split at midpoint",
            LONG_TOKEN_CONFIDENCE,
        ));

        Ok(WordSeparator { rules })
    }

    pub fn separate_words(&self, text: &str) -> PassOutput {
        apply_rules(text, &self.rules, CorrectionKind::WordSeparation)
    }
}

impl CorrectionPass for WordSeparator {
    fn name(&self) -> &'static str {
        "word_separation"
    }

    fn apply(&self, text: &str) -> Result<PassOutput, OcrError> {
        Ok(self.separate_words(text))
    }
}

fn compile(pattern: &str) -> Result<Regex, OcrError> {
    Regex::new(pattern).map_err(regex_error)
}

fn regex_error(e: regex::Error) -> OcrError {
    OcrError::ConfigError(format!("Invalid word separation pattern: {}", e))
}

// Ta marbuta and alif maqsura only end words, so a letter after one of them
// starts a new word. Both sides must keep at least three letters.
fn split_after_final_letters(caps: &Captures) -> String {
    let chars: Vec<char> = caps[0].chars().collect();
    let mut out = String::with_capacity(caps[0].len() + 4);
    let mut segment_len = 0;

    for (i, c) in chars.iter().enumerate() {
        out.push(*c);
        segment_len += 1;
        let remaining = chars.len() - i - 1;
        if (*c == 'ة' || *c == 'ى') && segment_len >= 3 && remaining >= 3 {
            out.push(' ');
            segment_len = 0;
        }
    }

    out
}

fn split_at_midpoint(caps: &Captures) -> String {
    let chars: Vec<char> = caps[0].chars().collect();
    let mid = (chars.len() + 1) / 2;
    let mut out: String = chars[..mid].iter().collect();
    out.push(' ');
    out.extend(chars[mid..].iter());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separator() -> WordSeparator {
        WordSeparator::new(15).unwrap()
    }

    fn token_count(text: &str) -> usize {
        text.split_whitespace().count()
    }

    #[test]
    fn test_presidential_decree_number() {
        let out = separator().separate_words("صدر مرسوم رئاسيرقم 12");
        assert!(out.text.contains("رئاسي رقم"));
        assert_eq!(out.text, "صدر مرسوم رئاسي رقم 12");
        let record = out
            .corrections
            .iter()
            .find(|r| r.original.contains("رئاسيرقم"))
            .unwrap();
        assert_eq!(record.kind, CorrectionKind::WordSeparation);
        assert_eq!(record.confidence, NAMED_CONFIDENCE);
    }

    #[test]
    fn test_visual_order_pair_is_reordered() {
        let out = separator().separate_words("رئاسيمرسوم");
        assert_eq!(out.text, "مرسوم رئاسي");
    }

    #[test]
    fn test_digit_letter_boundaries() {
        let out = separator().separate_words("المادة12من القانون");
        assert_eq!(out.text, "المادة 12 من القانون");
        assert_eq!(out.corrections.len(), 2);
        assert!(out.corrections.iter().all(|r| r.confidence < NAMED_CONFIDENCE));
    }

    #[test]
    fn test_digit_sandwich() {
        let out = separator().separate_words("ب5ج");
        assert_eq!(out.text, "ب 5 ج");
    }

    #[test]
    fn test_latin_digits_untouched() {
        let out = separator().separate_words("le 2ème alinéa de l'article 1er");
        assert_eq!(out.text, "le 2ème alinéa de l'article 1er");
        assert!(out.corrections.is_empty());
    }

    #[test]
    fn test_split_after_ta_marbuta() {
        let out = separator().separate_words("المحكمةالعليا");
        assert_eq!(out.text, "المحكمة العليا");
        assert_eq!(out.corrections[0].confidence, FINAL_LETTER_CONFIDENCE);
    }

    #[test]
    fn test_split_after_alif_maqsura() {
        let out = separator().separate_words("علىالحكومة");
        assert_eq!(out.text, "على الحكومة");
    }

    #[test]
    fn test_short_suffix_not_split() {
        // ta marbuta followed by a two-letter remainder stays whole
        let out = separator().separate_words("الشركةكم");
        assert_eq!(out.text, "الشركةكم");
    }

    #[test]
    fn test_long_token_split_at_midpoint() {
        let token = "بببببببببببببببب"; // 16 letters
        let out = separator().separate_words(token);
        assert_eq!(out.text, "بببببببب بببببببب");

        let odd = "ببببببببببببببب"; // 15 letters
        let out = separator().separate_words(odd);
        assert_eq!(out.text, "بببببببب ببببببب");
        assert_eq!(out.corrections[0].confidence, LONG_TOKEN_CONFIDENCE);
    }

    #[test]
    fn test_short_tokens_untouched() {
        let text = "الجمهورية الجزائرية الديمقراطية الشعبية";
        let out = separator().separate_words(text);
        assert_eq!(out.text, text);
        assert!(out.corrections.is_empty());
    }

    #[test]
    fn test_token_count_never_decreases() {
        let samples = [
            "",
            "مرسومرئاسيرقم 05",
            "الجمهوريةالجزائرية الديمقراطية والشعبية مرسوم تنفيذيرقم 05",
            "المادة12من",
            "ببببببببببببببببببببببببببببببب",
            "Décret exécutif n°05-12",
            "الجريدةالرسميةعدد12",
        ];
        let separator = separator();
        for sample in samples {
            let out = separator.separate_words(sample);
            assert!(token_count(&out.text) >= token_count(sample), "{}", sample);
        }
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(matches!(WordSeparator::new(1), Err(OcrError::ConfigError(_))));
    }
}
