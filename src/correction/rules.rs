// Declarative rewrite rules and the loop that applies them while recording
// every change.

use crate::models::{CorrectionKind, CorrectionRecord, PassOutput};
use regex::{Captures, Regex};

/// How a match is rewritten.
pub enum Replacement {
    /// Fixed text.
    Literal(String),
    /// `regex` expansion template such as `"${1} ${2}"`.
    Template(&'static str),
    /// Arbitrary function of the captures.
    Rewrite(fn(&Captures) -> String),
}

pub struct Rule {
    pub pattern: Regex,
    pub replacement: Replacement,
    pub description: String,
    pub confidence: f64,
}

impl Rule {
    pub fn new(pattern: Regex, replacement: Replacement, description: impl Into<String>, confidence: f64) -> Self {
        Rule {
            pattern,
            replacement,
            description: description.into(),
            confidence,
        }
    }

    /// Literal-substring rule.
    pub fn literal(from: &str, to: &str, description: impl Into<String>, confidence: f64) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&regex::escape(from))?;
        Ok(Rule::new(pattern, Replacement::Literal(to.to_string()), description, confidence))
    }

    fn rewrite(&self, caps: &Captures) -> String {
        match &self.replacement {
            Replacement::Literal(text) => text.clone(),
            Replacement::Template(template) => {
                let mut out = String::new();
                caps.expand(template, &mut out);
                out
            }
            Replacement::Rewrite(f) => f(caps),
        }
    }

    /// Apply this rule once over `text`, left to right, non-overlapping.
    /// Matches whose rewrite equals the matched text are left alone and not
    /// recorded.
    pub fn apply(&self, text: &str, kind: CorrectionKind) -> PassOutput {
        let mut output = String::with_capacity(text.len() + 16);
        let mut corrections = Vec::new();
        let mut last_byte = 0;
        let mut char_offset = 0;

        for caps in self.pattern.captures_iter(text) {
            let m = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let replacement = self.rewrite(&caps);
            if replacement == m.as_str() {
                continue;
            }

            let skipped = &text[last_byte..m.start()];
            char_offset += skipped.chars().count();
            output.push_str(skipped);
            output.push_str(&replacement);

            corrections.push(CorrectionRecord {
                kind,
                original: m.as_str().to_string(),
                corrected: replacement,
                confidence: self.confidence,
                position: char_offset,
                description: self.description.clone(),
            });

            char_offset += m.as_str().chars().count();
            last_byte = m.end();
        }

        if corrections.is_empty() {
            return PassOutput::unchanged(text);
        }

        output.push_str(&text[last_byte..]);
        PassOutput {
            text: output,
            corrections,
        }
    }
}

/// Run an ordered rule list, each rule seeing the output of the previous one.
pub fn apply_rules(text: &str, rules: &[Rule], kind: CorrectionKind) -> PassOutput {
    let mut result = PassOutput::unchanged(text);
    for rule in rules {
        let step = rule.apply(&result.text, kind);
        if !step.corrections.is_empty() {
            log::trace!(
                "{} rule '{}' applied {} time(s)",
                kind.as_str(),
                rule.description,
                step.corrections.len()
            );
            result.absorb(step);
        }
    }
    result
}
