use crate::correction::pipeline::CorrectionPass;
use crate::models::{CorrectionKind, CorrectionRecord, PassOutput};
use crate::utils::OcrError;

/// Invisible characters OCR engines leave behind in bidirectional text.
pub const INVISIBLE_MARKERS: &[(char, &str)] = &[
    ('\u{200E}', "left-to-right mark"),
    ('\u{200F}', "right-to-left mark"),
    ('\u{202A}', "left-to-right embedding"),
    ('\u{202B}', "right-to-left embedding"),
    ('\u{202C}', "pop directional formatting"),
    ('\u{202D}', "left-to-right override"),
    ('\u{202E}', "right-to-left override"),
    ('\u{2066}', "left-to-right isolate"),
    ('\u{2067}', "right-to-left isolate"),
    ('\u{2068}', "first strong isolate"),
    ('\u{2069}', "pop directional isolate"),
    ('\u{061C}', "arabic letter mark"),
    ('\u{FEFF}', "byte order mark"),
    ('\u{200D}', "zero width joiner"),
    ('\u{200C}', "zero width non-joiner"),
    ('\u{00AD}', "soft hyphen"),
    ('\u{2028}', "line separator"),
    ('\u{2029}', "paragraph separator"),
    ('\u{200B}', "zero width space"),
    ('\u{2060}', "word joiner"),
];

/// Delete every invisible marker, one record per deleted character.
pub fn clean_markers(text: &str) -> PassOutput {
    let mut result = PassOutput::unchanged(text);

    // One scan per marker type; positions refer to the text entering that scan.
    for (marker, name) in INVISIBLE_MARKERS {
        if !result.text.contains(*marker) {
            continue;
        }

        let mut cleaned = String::with_capacity(result.text.len());
        for (position, c) in result.text.chars().enumerate() {
            if c == *marker {
                result.corrections.push(CorrectionRecord {
                    kind: CorrectionKind::MarkerCleanup,
                    original: c.to_string(),
                    corrected: String::new(),
                    confidence: 1.0,
                    position,
                    description: format!("remove {}", name),
                });
            } else {
                cleaned.push(c);
            }
        }
        result.text = cleaned;
    }

    if !result.corrections.is_empty() {
        log::debug!("removed {} invisible marker(s)", result.corrections.len());
    }
    result
}

pub struct MarkerCleaner;

impl CorrectionPass for MarkerCleaner {
    fn name(&self) -> &'static str {
        "marker_cleanup"
    }

    fn apply(&self, text: &str) -> Result<PassOutput, OcrError> {
        Ok(clean_markers(text))
    }

    fn script_neutral(&self) -> bool {
        true
    }
}
