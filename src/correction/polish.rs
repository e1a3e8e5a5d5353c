// Whitespace and script-boundary cleanup run after every other pass.

use crate::correction::pipeline::CorrectionPass;
use crate::models::{CorrectionKind, PassOutput};
use crate::utils::OcrError;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::rules::{apply_rules, Replacement, Rule};

const ARABIC_LETTER: &str = r"[\x{0621}-\x{063A}\x{0641}-\x{064A}]";
const LATIN_LETTER: &str = r"[A-Za-z\x{00C0}-\x{00D6}\x{00D8}-\x{00F6}\x{00F8}-\x{00FF}]";

lazy_static! {
    static ref POLISH_RULES: Vec<Rule> = vec![
        Rule::new(Regex::new(r"\r\n?").unwrap(), Replacement::Literal("\n".to_string()), "normalize line ending", 1.0),
        Rule::new(Regex::new(r"(?m)[ \t]+$").unwrap(), Replacement::Literal(String::new()), "trailing line whitespace", 1.0),
        Rule::new(Regex::new(r"(?m)^[ \t]+").unwrap(), Replacement::Literal(String::new()), "leading line whitespace", 1.0),
        Rule::new(Regex::new(r"[ \t]{2,}").unwrap(), Replacement::Literal(" ".to_string()), "collapse repeated spaces", 1.0),
        Rule::new(Regex::new(r"\n{3,}").unwrap(), Replacement::Literal("\n\n".to_string()), "collapse blank lines", 1.0),
        Rule::new(
            Regex::new(&format!("({})({})", ARABIC_LETTER, LATIN_LETTER)).unwrap(),
            Replacement::Template("${1} ${2}"),
            "space at arabic/latin boundary",
            0.8,
        ),
        Rule::new(
            Regex::new(&format!("({})({})", LATIN_LETTER, ARABIC_LETTER)).unwrap(),
            Replacement::Template("${1} ${2}"),
            "space at latin/arabic boundary",
            0.8,
        ),
        Rule::new(
            Regex::new(&format!("([.,;:!?\u{060C}\u{061B}\u{061F}])({})", ARABIC_LETTER)).unwrap(),
            Replacement::Template("${1} ${2}"),
            "space after punctuation",
            0.8,
        ),
        Rule::new(
            Regex::new(&format!("([\u{060C}\u{061B}\u{061F}])({})", LATIN_LETTER)).unwrap(),
            Replacement::Template("${1} ${2}"),
            "space after arabic punctuation",
            0.8,
        ),
        Rule::new(
            Regex::new(&format!(r"(\p{{L}}+|[0-9]+)?([.,;:!?])({})", LATIN_LETTER)).unwrap(),
            Replacement::Rewrite(space_after_latin_punctuation),
            "space after latin punctuation",
            0.8,
        ),
        Rule::new(Regex::new(r"\A\s+").unwrap(), Replacement::Literal(String::new()), "trim start", 1.0),
        Rule::new(Regex::new(r"\s+\z").unwrap(), Replacement::Literal(String::new()), "trim end", 1.0),
    ];
}

// A period after a lone letter is a dotted abbreviation such as J.O.R.A.
fn space_after_latin_punctuation(caps: &Captures) -> String {
    let run = caps.get(1).map_or("", |m| m.as_str());
    let punct = &caps[2];
    let mut run_chars = run.chars();
    let single_letter = match (run_chars.next(), run_chars.next()) {
        (None, _) => true,
        (Some(c), None) => c.is_alphabetic(),
        _ => false,
    };
    if punct == "." && single_letter {
        return caps[0].to_string();
    }
    format!("{}{} {}", run, punct, &caps[3])
}

pub fn polish_text(text: &str) -> PassOutput {
    apply_rules(text, &POLISH_RULES, CorrectionKind::MarkerCleanup)
}

pub struct Polisher;

impl CorrectionPass for Polisher {
    fn name(&self) -> &'static str {
        "polish"
    }

    fn apply(&self, text: &str) -> Result<PassOutput, OcrError> {
        Ok(polish_text(text))
    }
}
