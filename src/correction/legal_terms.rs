use crate::correction::pipeline::CorrectionPass;
use crate::models::{CorrectionKind, PassOutput};
use crate::utils::OcrError;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::rules::{apply_rules, Replacement, Rule};

const LEGAL_TERM_CONFIDENCE: f64 = 0.95;

// (pattern, canonical spelling, description). Words may be separated by any
// run of spaces or tabs, or glued together in the Arabic entries.
const CANONICAL_TERMS: &[(&str, &str, &str)] = &[
    (
        r"\bالجمهورية[ \t]*الجزائرية[ \t]*الديمقراطية[ \t]*الشعبية\b",
        "الجمهورية الجزائرية الديمقراطية الشعبية",
        "state name",
    ),
    (
        r"(?i)\br[ée]publique[ \t]+alg[ée]rienne[ \t]+d[ée]mocratique[ \t]+et[ \t]+populaire\b",
        "République Algérienne Démocratique et Populaire",
        "state name (fr)",
    ),
    (r"\bمرسوم[ \t]*رئاسي[ \t]*رقم\b", "مرسوم رئاسي رقم", "presidential decree number"),
    (r"\bمرسوم[ \t]*تنفيذي[ \t]*رقم\b", "مرسوم تنفيذي رقم", "executive decree number"),
    (
        r"(?i)\bd[ée]cret[ \t]+pr[ée]sidentiel[ \t]+n[ \t]*(?:°|o\b)",
        "Décret présidentiel n°",
        "presidential decree number (fr)",
    ),
    (
        r"(?i)\bd[ée]cret[ \t]+ex[ée]cutif[ \t]+n[ \t]*(?:°|o\b)",
        "Décret exécutif n°",
        "executive decree number (fr)",
    ),
    (r"\bالمؤرخ[ \t]*في\b", "المؤرخ في", "date introduction"),
    (r"\bرئيس[ \t]*الجمهورية\b", "رئيس الجمهورية", "head of state"),
    (
        r"(?i)\bpr[ée]sident[ \t]+de[ \t]+la[ \t]+r[ée]publique\b",
        "Président de la République",
        "head of state (fr)",
    ),
    (r"\bالوزير[ \t]*الأول\b", "الوزير الأول", "prime minister"),
    (r"(?i)\bpremier[ \t]+ministre\b", "Premier ministre", "prime minister (fr)"),
    (r"\bالجريدة[ \t]*الرسمية\b", "الجريدة الرسمية", "official gazette"),
    (r"(?i)\bjournal[ \t]+officiel\b", "Journal officiel", "official gazette (fr)"),
];

/// A user supplied canonical phrase, matched word by word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalTermEntry {
    pub words: Vec<String>,
    pub canonical: String,
    #[serde(default)]
    pub case_insensitive: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl LegalTermEntry {
    fn to_pattern(&self) -> String {
        let body = self
            .words
            .iter()
            .map(|word| regex::escape(word))
            .collect::<Vec<_>>()
            .join(r"[ \t]*");
        let flags = if self.case_insensitive { "(?i)" } else { "" };
        let first = self.words.first().and_then(|w| w.chars().next());
        let last = self.words.last().and_then(|w| w.chars().last());
        format!(r"{}{}{}{}", flags, word_boundary(first), body, word_boundary(last))
    }
}

// `\b` next to punctuation would demand a word character on the other side.
fn word_boundary(edge: Option<char>) -> &'static str {
    match edge {
        Some(c) if c.is_alphanumeric() || c == '_' => r"\b",
        _ => "",
    }
}

pub struct LegalTermNormalizer {
    rules: Vec<Rule>,
}

impl LegalTermNormalizer {
    pub fn new(extra_terms: &[LegalTermEntry]) -> Result<Self, OcrError> {
        let mut rules = Vec::with_capacity(CANONICAL_TERMS.len() + extra_terms.len());

        for (pattern, canonical, description) in CANONICAL_TERMS {
            rules.push(term_rule(pattern, canonical, description)?);
        }

        for entry in extra_terms {
            if entry.words.is_empty() {
                return Err(OcrError::ConfigError(format!(
                    "Legal term '{}' has no words",
                    entry.canonical
                )));
            }
            let description = entry.description.clone().unwrap_or_else(|| entry.canonical.clone());
            rules.push(term_rule(&entry.to_pattern(), &entry.canonical, &description)?);
        }

        Ok(LegalTermNormalizer { rules })
    }

    pub fn normalize_legal_terms(&self, text: &str) -> PassOutput {
        apply_rules(text, &self.rules, CorrectionKind::LegalTerm)
    }
}

impl CorrectionPass for LegalTermNormalizer {
    fn name(&self) -> &'static str {
        "legal_term"
    }

    fn apply(&self, text: &str) -> Result<PassOutput, OcrError> {
        Ok(self.normalize_legal_terms(text))
    }
}

fn term_rule(pattern: &str, canonical: &str, description: &str) -> Result<Rule, OcrError> {
    let regex = Regex::new(pattern)
        .map_err(|e| OcrError::ConfigError(format!("Invalid legal term pattern for '{}': {}", canonical, e)))?;
    Ok(Rule::new(
        regex,
        Replacement::Literal(canonical.to_string()),
        description,
        LEGAL_TERM_CONFIDENCE,
    ))
}
