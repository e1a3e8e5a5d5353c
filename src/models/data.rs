use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::profiles::DocumentClass;

/// The family of rule that produced a correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionKind {
    WordSeparation,
    RtlDirection,
    MarkerCleanup,
    LigatureFix,
    LegalTerm,
}

impl CorrectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectionKind::WordSeparation => "word_separation",
            CorrectionKind::RtlDirection => "rtl_direction",
            CorrectionKind::MarkerCleanup => "marker_cleanup",
            CorrectionKind::LigatureFix => "ligature_fix",
            CorrectionKind::LegalTerm => "legal_term",
        }
    }
}

/// One applied fix. `position` is the char offset of the change in the text
/// as it entered the rule that produced it (line start for RTL records).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    pub kind: CorrectionKind,
    pub original: String,
    pub corrected: String,
    pub confidence: f64,
    pub position: usize,
    pub description: String,
}

/// Result of a single correction pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassOutput {
    pub text: String,
    pub corrections: Vec<CorrectionRecord>,
}

impl PassOutput {
    pub fn unchanged(text: &str) -> Self {
        PassOutput {
            text: text.to_string(),
            corrections: Vec::new(),
        }
    }

    /// Append the records of a later sub-step and take over its text.
    pub fn absorb(&mut self, next: PassOutput) {
        self.text = next.text;
        self.corrections.extend(next.corrections);
    }
}

/// Note left by the orchestrator when a pass had to be skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassDiagnostic {
    pub pass: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionStatistics {
    pub word_separations: usize,
    pub rtl_corrections: usize,
    pub marker_cleanups: usize,
    pub ligature_fixes: usize,
    pub legal_terms: usize,
    pub total_corrections: usize,
    pub average_confidence: f64,
    pub processing_time_ms: f64,
}

impl CorrectionStatistics {
    pub fn from_records(records: &[CorrectionRecord], elapsed: Duration) -> Self {
        let mut stats = CorrectionStatistics {
            processing_time_ms: elapsed.as_secs_f64() * 1000.0,
            ..Default::default()
        };

        for record in records {
            match record.kind {
                CorrectionKind::WordSeparation => stats.word_separations += 1,
                CorrectionKind::RtlDirection => stats.rtl_corrections += 1,
                CorrectionKind::MarkerCleanup => stats.marker_cleanups += 1,
                CorrectionKind::LigatureFix => stats.ligature_fixes += 1,
                CorrectionKind::LegalTerm => stats.legal_terms += 1,
            }
        }

        stats.total_corrections = records.len();
        if !records.is_empty() {
            stats.average_confidence =
                records.iter().map(|r| r.confidence).sum::<f64>() / records.len() as f64;
        }

        stats
    }

    pub fn count(&self, kind: CorrectionKind) -> usize {
        match kind {
            CorrectionKind::WordSeparation => self.word_separations,
            CorrectionKind::RtlDirection => self.rtl_corrections,
            CorrectionKind::MarkerCleanup => self.marker_cleanups,
            CorrectionKind::LigatureFix => self.ligature_fixes,
            CorrectionKind::LegalTerm => self.legal_terms,
        }
    }
}

/// Full outcome of one `process_advanced_corrections` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionReport {
    pub text: String,
    pub corrections: Vec<CorrectionRecord>,
    pub statistics: CorrectionStatistics,
    pub diagnostics: Vec<PassDiagnostic>,
    pub script_ratio: f64,
    pub profile: DocumentClass,
    pub language: Option<String>,
    pub input_sha256: String,
    pub processed_at: DateTime<Utc>,
}

/// Output of the lightweight `process_arabic_text` variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedText {
    pub text: String,
    pub script_ratio: f64,
    pub profile: DocumentClass,
}

/// Raw result handed back by an OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrOutput {
    pub text: String,
    pub confidence: f64,
    pub language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingOptions {
    pub enhance_contrast: bool,
    pub denoise_image: bool,
    pub straighten_lines: bool,
    pub improve_dpi: bool,
    pub sharpen_text: bool,
}

impl Default for PreprocessingOptions {
    fn default() -> Self {
        PreprocessingOptions {
            enhance_contrast: true,
            denoise_image: true,
            straighten_lines: true,
            improve_dpi: true,
            sharpen_text: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suitability {
    Excellent,
    Good,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub contrast: f64,
    pub sharpness: f64,
    pub noise: f64,
    pub suitability: Suitability,
}

impl QualityReport {
    pub fn new(contrast: f64, sharpness: f64, noise: f64) -> Self {
        let suitability = if contrast > 0.7 && sharpness > 0.6 && noise < 0.3 {
            Suitability::Excellent
        } else if contrast > 0.5 && sharpness > 0.4 && noise < 0.5 {
            Suitability::Good
        } else {
            Suitability::Poor
        };

        QualityReport {
            contrast,
            sharpness,
            noise,
            suitability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: CorrectionKind, confidence: f64) -> CorrectionRecord {
        CorrectionRecord {
            kind,
            original: "a".to_string(),
            corrected: "b".to_string(),
            confidence,
            position: 0,
            description: "test".to_string(),
        }
    }

    #[test]
    fn test_statistics_count_each_kind() {
        let records = vec![
            record(CorrectionKind::WordSeparation, 0.9),
            record(CorrectionKind::WordSeparation, 0.6),
            record(CorrectionKind::LegalTerm, 0.95),
            record(CorrectionKind::MarkerCleanup, 1.0),
        ];
        let stats = CorrectionStatistics::from_records(&records, Duration::from_millis(3));

        assert_eq!(stats.word_separations, 2);
        assert_eq!(stats.legal_terms, 1);
        assert_eq!(stats.marker_cleanups, 1);
        assert_eq!(stats.rtl_corrections, 0);
        assert_eq!(stats.total_corrections, 4);
        assert!((stats.average_confidence - 0.8625).abs() < 1e-9);
        assert!(stats.processing_time_ms >= 3.0);
    }

    #[test]
    fn test_statistics_empty() {
        let stats = CorrectionStatistics::from_records(&[], Duration::ZERO);
        assert_eq!(stats, CorrectionStatistics::default());
    }

    #[test]
    fn test_suitability_ladder() {
        assert_eq!(QualityReport::new(0.9, 0.7, 0.2).suitability, Suitability::Excellent);
        assert_eq!(QualityReport::new(0.6, 0.5, 0.4).suitability, Suitability::Good);
        assert_eq!(QualityReport::new(0.9, 0.7, 0.6).suitability, Suitability::Poor);
        assert_eq!(QualityReport::new(0.7, 0.9, 0.1).suitability, Suitability::Good);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&CorrectionKind::RtlDirection).unwrap();
        assert_eq!(json, "\"rtl_direction\"");
        assert_eq!(CorrectionKind::LigatureFix.as_str(), "ligature_fix");
    }

    #[test]
    fn test_preprocessing_options_default_all_enabled() {
        let options: PreprocessingOptions = serde_json::from_str("{\"sharpen_text\": false}").unwrap();
        assert!(options.enhance_contrast);
        assert!(options.denoise_image);
        assert!(options.straighten_lines);
        assert!(options.improve_dpi);
        assert!(!options.sharpen_text);
    }
}
