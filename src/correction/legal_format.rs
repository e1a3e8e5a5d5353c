use crate::correction::pipeline::CorrectionPass;
use crate::models::{CorrectionKind, PassOutput};
use crate::utils::OcrError;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::rules::{apply_rules, Replacement, Rule};

lazy_static! {
    static ref FORMAT_RULES: Vec<Rule> = vec![
        Rule::new(
            Regex::new(r"[\x{0660}-\x{0669}\x{06F0}-\x{06F9}]+").unwrap(),
            Replacement::Rewrite(to_ascii_digits),
            "arabic-indic digits to ascii",
            0.95,
        ),
        Rule::new(
            Regex::new(r"(المادة)[ \t]*([0-9]+)").unwrap(),
            Replacement::Template("${1} ${2}"),
            "article header",
            0.9,
        ),
        Rule::new(
            Regex::new(r"\bArt\.[ \t]*([0-9]+)").unwrap(),
            Replacement::Template("Article ${1}"),
            "french article abbreviation",
            0.9,
        ),
    ];
}

fn to_ascii_digits(caps: &Captures) -> String {
    caps[0]
        .chars()
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            other => other,
        })
        .collect()
}

/// Digit and article-header normalization used by the lightweight path.
pub struct LegalFormatter;

impl LegalFormatter {
    pub fn format_legal_text(&self, text: &str) -> PassOutput {
        apply_rules(text, &FORMAT_RULES, CorrectionKind::LegalTerm)
    }
}

impl CorrectionPass for LegalFormatter {
    fn name(&self) -> &'static str {
        "legal_format"
    }

    fn apply(&self, text: &str) -> Result<PassOutput, OcrError> {
        Ok(self.format_legal_text(text))
    }
}
