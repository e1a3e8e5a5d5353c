use crate::correction::pipeline::CorrectionPass;
use crate::models::{CorrectionKind, CorrectionRecord, PassOutput};
use crate::utils::OcrError;
use lazy_static::lazy_static;
use regex::Regex;

use super::rules::{apply_rules, Replacement, Rule};

const LIGATURE_CONFIDENCE: f64 = 0.85;

/// Presentation-form ranges (Arabic Presentation Forms-A/B) and the base text
/// each code point stands for. Ranges cover the isolated, final, initial and
/// medial variants of one letter.
const PRESENTATION_FORMS: &[(char, char, &str, &str)] = &[
    // diacritics
    ('\u{FE70}', '\u{FE71}', "\u{064B}", "fathatan"),
    ('\u{FE72}', '\u{FE72}', "\u{064C}", "dammatan"),
    ('\u{FE74}', '\u{FE74}', "\u{064D}", "kasratan"),
    ('\u{FE76}', '\u{FE77}', "\u{064E}", "fatha"),
    ('\u{FE78}', '\u{FE79}', "\u{064F}", "damma"),
    ('\u{FE7A}', '\u{FE7B}', "\u{0650}", "kasra"),
    ('\u{FE7C}', '\u{FE7D}', "\u{0651}", "shadda"),
    ('\u{FE7E}', '\u{FE7F}', "\u{0652}", "sukun"),
    // letters
    ('\u{FE80}', '\u{FE80}', "ء", "hamza"),
    ('\u{FE81}', '\u{FE82}', "آ", "alif madda"),
    ('\u{FE83}', '\u{FE84}', "أ", "alif hamza above"),
    ('\u{FE85}', '\u{FE86}', "ؤ", "waw hamza"),
    ('\u{FE87}', '\u{FE88}', "إ", "alif hamza below"),
    ('\u{FE89}', '\u{FE8C}', "ئ", "yeh hamza"),
    ('\u{FE8D}', '\u{FE8E}', "ا", "alif"),
    ('\u{FE8F}', '\u{FE92}', "ب", "beh"),
    ('\u{FE93}', '\u{FE94}', "ة", "teh marbuta"),
    ('\u{FE95}', '\u{FE98}', "ت", "teh"),
    ('\u{FE99}', '\u{FE9C}', "ث", "theh"),
    ('\u{FE9D}', '\u{FEA0}', "ج", "jeem"),
    ('\u{FEA1}', '\u{FEA4}', "ح", "hah"),
    ('\u{FEA5}', '\u{FEA8}', "خ", "khah"),
    ('\u{FEA9}', '\u{FEAA}', "د", "dal"),
    ('\u{FEAB}', '\u{FEAC}', "ذ", "thal"),
    ('\u{FEAD}', '\u{FEAE}', "ر", "reh"),
    ('\u{FEAF}', '\u{FEB0}', "ز", "zain"),
    ('\u{FEB1}', '\u{FEB4}', "س", "seen"),
    ('\u{FEB5}', '\u{FEB8}', "ش", "sheen"),
    ('\u{FEB9}', '\u{FEBC}', "ص", "sad"),
    ('\u{FEBD}', '\u{FEC0}', "ض", "dad"),
    ('\u{FEC1}', '\u{FEC4}', "ط", "tah"),
    ('\u{FEC5}', '\u{FEC8}', "ظ", "zah"),
    ('\u{FEC9}', '\u{FECC}', "ع", "ain"),
    ('\u{FECD}', '\u{FED0}', "غ", "ghain"),
    ('\u{FED1}', '\u{FED4}', "ف", "feh"),
    ('\u{FED5}', '\u{FED8}', "ق", "qaf"),
    ('\u{FED9}', '\u{FEDC}', "ك", "kaf"),
    ('\u{FEDD}', '\u{FEE0}', "ل", "lam"),
    ('\u{FEE1}', '\u{FEE4}', "م", "meem"),
    ('\u{FEE5}', '\u{FEE8}', "ن", "noon"),
    ('\u{FEE9}', '\u{FEEC}', "ه", "heh"),
    ('\u{FEED}', '\u{FEEE}', "و", "waw"),
    ('\u{FEEF}', '\u{FEF0}', "ى", "alif maqsura"),
    ('\u{FEF1}', '\u{FEF4}', "ي", "yeh"),
    // lam-alif ligatures
    ('\u{FEF5}', '\u{FEF6}', "لآ", "lam-alif madda"),
    ('\u{FEF7}', '\u{FEF8}', "لأ", "lam-alif hamza above"),
    ('\u{FEF9}', '\u{FEFA}', "لإ", "lam-alif hamza below"),
    ('\u{FEFB}', '\u{FEFC}', "لا", "lam-alif"),
    // forms-A
    ('\u{FB50}', '\u{FB51}', "ا", "alif wasla"),
    ('\u{FDF2}', '\u{FDF2}', "الله", "allah ligature"),
    ('\u{FDF4}', '\u{FDF4}', "محمد", "muhammad ligature"),
    ('\u{FDF6}', '\u{FDF6}', "رسول", "rasoul ligature"),
    ('\u{FDFA}', '\u{FDFA}', "(ص)", "sallallahou alayhi wasallam"),
    ('\u{FDFB}', '\u{FDFB}', "(جل جلاله)", "jallajalalouhou"),
];

lazy_static! {
    static ref CLEANUP_RULES: Vec<Rule> = vec![
        Rule::new(
            Regex::new(r"([\x{0629}\x{0649}])(\x{0627}\x{0644}[\x{0621}-\x{063A}\x{0641}-\x{064A}])").unwrap(),
            Replacement::Template("${1} ${2}"),
            "space before definite article after word-final letter",
            LIGATURE_CONFIDENCE,
        ),
        Rule::new(
            Regex::new(r"\x{0640}+").unwrap(),
            Replacement::Literal(String::new()),
            "remove tatweel",
            LIGATURE_CONFIDENCE,
        ),
        Rule::new(
            Regex::new(r"[\x{00A0}\x{2000}-\x{200A}\x{202F}\x{205F}\x{3000}]+").unwrap(),
            Replacement::Literal(" ".to_string()),
            "normalize exotic whitespace",
            LIGATURE_CONFIDENCE,
        ),
    ];
}

/// Base text for a presentation-form code point, with the glyph name.
pub fn canonical_form(c: char) -> Option<(&'static str, &'static str)> {
    PRESENTATION_FORMS
        .iter()
        .find(|(first, last, _, _)| (*first..=*last).contains(&c))
        .map(|(_, _, canonical, name)| (*canonical, *name))
}

pub fn correct_ligatures(text: &str) -> PassOutput {
    let mut result = map_presentation_forms(text);
    let cleanup = apply_rules(&result.text, &CLEANUP_RULES, CorrectionKind::LigatureFix);
    result.absorb(cleanup);
    result
}

fn map_presentation_forms(text: &str) -> PassOutput {
    let mut mapped = String::with_capacity(text.len());
    let mut corrections = Vec::new();

    for (position, c) in text.chars().enumerate() {
        match canonical_form(c) {
            Some((canonical, name)) => {
                mapped.push_str(canonical);
                corrections.push(CorrectionRecord {
                    kind: CorrectionKind::LigatureFix,
                    original: c.to_string(),
                    corrected: canonical.to_string(),
                    confidence: LIGATURE_CONFIDENCE,
                    position,
                    description: format!("presentation form of {}", name),
                });
            }
            None => mapped.push(c),
        }
    }

    PassOutput {
        text: mapped,
        corrections,
    }
}

pub struct LigatureCorrector;

impl CorrectionPass for LigatureCorrector {
    fn name(&self) -> &'static str {
        "ligature_fix"
    }

    fn apply(&self, text: &str) -> Result<PassOutput, OcrError> {
        Ok(correct_ligatures(text))
    }
}
