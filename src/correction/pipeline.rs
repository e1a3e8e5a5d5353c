use crate::config::PipelineConfig;
use crate::correction::direction::DirectionCorrector;
use crate::correction::legal_format::LegalFormatter;
use crate::correction::legal_terms::LegalTermNormalizer;
use crate::correction::ligatures::LigatureCorrector;
use crate::correction::markers::MarkerCleaner;
use crate::correction::polish::Polisher;
use crate::correction::script::{detect_language, detect_script_ratio};
use crate::correction::word_separation::WordSeparator;
use crate::models::{
    select_profile, CorrectionRecord, CorrectionReport, CorrectionStatistics, PassDiagnostic, PassOutput,
    ProcessedText,
};
use crate::utils::OcrError;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::time::Instant;

/// One step of the correction pipeline.
pub trait CorrectionPass: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, text: &str) -> Result<PassOutput, OcrError>;

    /// Whether the pass also runs on text that contains no Arabic letter.
    fn script_neutral(&self) -> bool {
        false
    }
}

/// Runs the correction passes in a fixed order and assembles the report.
///
/// The pipeline holds no per-call state and can be shared between threads.
pub struct CorrectionPipeline {
    passes: Vec<Box<dyn CorrectionPass>>,
    formatter: LegalFormatter,
    polisher: Polisher,
    min_arabic_ratio: f64,
}

impl CorrectionPipeline {
    pub fn new(config: &PipelineConfig) -> Result<Self, OcrError> {
        config.validate()?;
        let passes: Vec<Box<dyn CorrectionPass>> = vec![
            Box::new(MarkerCleaner),
            Box::new(WordSeparator::new(config.long_token_threshold)?),
            Box::new(LigatureCorrector),
            Box::new(DirectionCorrector::new(config.rtl_arabic_threshold)),
            Box::new(LegalTermNormalizer::new(&config.extra_legal_terms)?),
        ];
        Ok(Self::with_passes(passes, config.min_arabic_ratio))
    }

    /// Pipeline with a custom pass list; polishing still runs last.
    pub fn with_passes(passes: Vec<Box<dyn CorrectionPass>>, min_arabic_ratio: f64) -> Self {
        CorrectionPipeline {
            passes,
            formatter: LegalFormatter,
            polisher: Polisher,
            min_arabic_ratio,
        }
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes
            .iter()
            .map(|p| p.name())
            .chain(std::iter::once(self.polisher.name()))
            .collect()
    }

    pub fn process_advanced_corrections(&self, text: &str) -> CorrectionReport {
        let started = Instant::now();
        let script_ratio = detect_script_ratio(text);
        let profile = select_profile(script_ratio);

        if text.is_empty() {
            return build_report(
                text,
                String::new(),
                Vec::new(),
                Vec::new(),
                CorrectionStatistics::default(),
                script_ratio,
            );
        }

        // Text without Arabic only loses its invisible markers.
        let latin_only = script_ratio == 0.0;
        log::debug!(
            "correcting {} chars, arabic ratio {:.2}, profile {}",
            text.chars().count(),
            script_ratio,
            profile
        );

        let mut current = text.to_string();
        let mut corrections = Vec::new();
        let mut diagnostics = Vec::new();

        let passes = self
            .passes
            .iter()
            .map(|p| p.as_ref())
            .chain(std::iter::once(&self.polisher as &dyn CorrectionPass))
            .filter(|p| !latin_only || p.script_neutral());
        for pass in passes {
            run_pass(pass, &mut current, &mut corrections, &mut diagnostics);
        }

        let statistics = CorrectionStatistics::from_records(&corrections, started.elapsed());
        log::info!(
            "applied {} correction(s) in {:.2} ms",
            statistics.total_corrections,
            statistics.processing_time_ms
        );

        build_report(text, current, corrections, diagnostics, statistics, script_ratio)
    }

    /// Lightweight path: no report, legal formatting before polishing, and
    /// text with little Arabic is returned as is.
    pub fn process_arabic_text(&self, text: &str) -> ProcessedText {
        let script_ratio = detect_script_ratio(text);
        let profile = select_profile(script_ratio);

        if script_ratio <= self.min_arabic_ratio {
            log::debug!("arabic ratio {:.2} too low, text left unchanged", script_ratio);
            return ProcessedText {
                text: text.to_string(),
                script_ratio,
                profile,
            };
        }

        let mut current = text.to_string();
        let mut corrections = Vec::new();
        let mut diagnostics = Vec::new();

        let passes = self.passes.iter().map(|p| p.as_ref()).chain([
            &self.formatter as &dyn CorrectionPass,
            &self.polisher as &dyn CorrectionPass,
        ]);
        for pass in passes {
            run_pass(pass, &mut current, &mut corrections, &mut diagnostics);
        }

        ProcessedText {
            text: current,
            script_ratio,
            profile,
        }
    }
}

fn build_report(
    input: &str,
    text: String,
    corrections: Vec<CorrectionRecord>,
    diagnostics: Vec<PassDiagnostic>,
    statistics: CorrectionStatistics,
    script_ratio: f64,
) -> CorrectionReport {
    CorrectionReport {
        language: detect_language(&text),
        text,
        corrections,
        statistics,
        diagnostics,
        script_ratio,
        profile: select_profile(script_ratio),
        input_sha256: format!("{:x}", Sha256::digest(input.as_bytes())),
        processed_at: Utc::now(),
    }
}

fn run_pass(
    pass: &dyn CorrectionPass,
    text: &mut String,
    corrections: &mut Vec<CorrectionRecord>,
    diagnostics: &mut Vec<PassDiagnostic>,
) {
    match pass.apply(text) {
        Ok(output) => {
            log::debug!("pass {}: {} correction(s)", pass.name(), output.corrections.len());
            *text = output.text;
            corrections.extend(output.corrections);
        }
        Err(e) => {
            log::warn!("pass {} failed, skipping: {}", pass.name(), e);
            diagnostics.push(PassDiagnostic {
                pass: pass.name().to_string(),
                message: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CorrectionKind, DocumentClass};

    fn pipeline() -> CorrectionPipeline {
        CorrectionPipeline::new(&PipelineConfig::default()).unwrap()
    }

    struct FailingPass;

    impl CorrectionPass for FailingPass {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn apply(&self, _text: &str) -> Result<PassOutput, OcrError> {
            Err(OcrError::CorrectionError("rule table unavailable".to_string()))
        }
    }

    #[test]
    fn test_pass_order() {
        assert_eq!(
            pipeline().pass_names(),
            vec!["marker_cleanup", "word_separation", "ligature_fix", "rtl_direction", "legal_term", "polish"]
        );
    }

    #[test]
    fn test_empty_input() {
        let report = pipeline().process_advanced_corrections("");
        assert_eq!(report.text, "");
        assert!(report.corrections.is_empty());
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.statistics, CorrectionStatistics::default());
        assert_eq!(report.statistics.processing_time_ms, 0.0);
        assert_eq!(report.script_ratio, 0.0);
        assert_eq!(report.profile, DocumentClass::Legal);
        assert_eq!(
            report.input_sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_latin_only_input_has_no_corrections() {
        let text = "Journal officiel de la République Algérienne Démocratique et Populaire";
        let report = pipeline().process_advanced_corrections(text);
        assert_eq!(report.text, text);
        assert!(report.corrections.is_empty());
    }

    #[test]
    fn test_french_legal_phrase_without_arabic_untouched() {
        let text = "le journal officiel du  5 mai";
        let report = pipeline().process_advanced_corrections(text);
        assert_eq!(report.text, text);
        assert!(report.corrections.is_empty());
        assert_eq!(report.statistics.total_corrections, 0);
    }

    #[test]
    fn test_markers_removed_without_arabic() {
        let report = pipeline().process_advanced_corrections("Journal\u{200F} officiel");
        assert_eq!(report.text, "Journal officiel");
        assert_eq!(report.corrections.len(), 1);
        assert_eq!(report.corrections[0].kind, CorrectionKind::MarkerCleanup);
    }

    #[test]
    fn test_french_terms_normalized_in_mixed_text() {
        let report = pipeline().process_advanced_corrections("le journal officiel الجريدة الرسمية");
        assert!(report.text.starts_with("le Journal officiel"));
        assert!(report.corrections.iter().any(|r| r.kind == CorrectionKind::LegalTerm));
    }

    #[test]
    fn test_decree_header_scenario() {
        let input = "الجمهوريةالجزائرية الديمقراطية والشعبية مرسوم تنفيذيرقم 05";
        let report = pipeline().process_advanced_corrections(input);

        assert!(report.text.contains("الجمهورية الجزائرية"));
        assert!(report.text.contains("تنفيذي رقم"));
        assert!(report.text.contains("الديمقراطية والشعبية"));
        assert_eq!(report.text, "الجمهورية الجزائرية الديمقراطية والشعبية مرسوم تنفيذي رقم 05");
        assert!(report.statistics.total_corrections >= 2);
        assert_eq!(report.statistics.word_separations, 2);
        assert_eq!(report.profile, DocumentClass::ArabicPrimary);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_records_follow_pass_order() {
        let input = "\u{200F}الجريدة  الرسمية \u{FEFB}";
        let report = pipeline().process_advanced_corrections(input);
        let kinds: Vec<CorrectionKind> = report.corrections.iter().map(|r| r.kind).collect();

        let first_ligature = kinds.iter().position(|k| *k == CorrectionKind::LigatureFix).unwrap();
        let first_legal = kinds.iter().position(|k| *k == CorrectionKind::LegalTerm).unwrap();
        assert_eq!(kinds[0], CorrectionKind::MarkerCleanup);
        assert!(first_ligature < first_legal);
        assert_eq!(report.text, "الجريدة الرسمية لا");
    }

    #[test]
    fn test_failing_pass_becomes_diagnostic() {
        let passes: Vec<Box<dyn CorrectionPass>> = vec![
            Box::new(MarkerCleaner),
            Box::new(FailingPass),
            Box::new(LigatureCorrector),
        ];
        let pipeline = CorrectionPipeline::with_passes(passes, 0.1);
        let report = pipeline.process_advanced_corrections("مرسوم\u{200E}\u{FEFB}");

        assert_eq!(report.text, "مرسوملا");
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].pass, "failing");
        assert!(report.diagnostics[0].message.contains("rule table unavailable"));
        assert_eq!(report.statistics.marker_cleanups, 1);
        assert_eq!(report.statistics.ligature_fixes, 1);
    }

    #[test]
    fn test_statistics_match_records() {
        let report = pipeline().process_advanced_corrections("صدر مرسوم رئاسيرقم 12\u{200F}");
        let stats = &report.statistics;
        assert_eq!(stats.total_corrections, report.corrections.len());
        for kind in [
            CorrectionKind::WordSeparation,
            CorrectionKind::RtlDirection,
            CorrectionKind::MarkerCleanup,
            CorrectionKind::LigatureFix,
            CorrectionKind::LegalTerm,
        ] {
            let expected = report.corrections.iter().filter(|r| r.kind == kind).count();
            assert_eq!(stats.count(kind), expected);
        }
    }

    #[test]
    fn test_arabic_text_low_ratio_unchanged() {
        let text = "Art.5  du Journal  officiel";
        let processed = pipeline().process_arabic_text(text);
        assert_eq!(processed.text, text);
        assert_eq!(processed.profile, DocumentClass::Legal);
    }

    #[test]
    fn test_arabic_text_formats_articles() {
        let processed = pipeline().process_arabic_text("المادة١٢  من الجريدةالرسمية");
        assert_eq!(processed.text, "المادة 12 من الجريدة الرسمية");
        assert_eq!(processed.profile, DocumentClass::ArabicPrimary);
    }

    #[test]
    fn test_pipeline_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CorrectionPipeline>();
    }
}
