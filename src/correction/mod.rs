// Text correction passes for Arabic/French OCR output.
pub mod direction;
pub mod legal_format;
pub mod legal_terms;
pub mod ligatures;
pub mod markers;
pub mod pipeline;
pub mod polish;
pub mod rules;
pub mod script;
pub mod word_separation;

pub use direction::DirectionCorrector;
pub use legal_format::LegalFormatter;
pub use legal_terms::{LegalTermEntry, LegalTermNormalizer};
pub use ligatures::{correct_ligatures, LigatureCorrector};
pub use markers::{clean_markers, MarkerCleaner};
pub use pipeline::{CorrectionPass, CorrectionPipeline};
pub use polish::{polish_text, Polisher};
pub use script::{detect_language, detect_profile, detect_script_ratio};
pub use word_separation::WordSeparator;
