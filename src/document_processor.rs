use crate::config::PipelineConfig;
use crate::correction::{detect_script_ratio, CorrectionPipeline};
use crate::models::{
    select_profile, CharacterProfiles, CorrectionReport, DocumentClass, OcrOutput, QualityReport,
};
use crate::processing::{ImagePreprocessor, OcrEngine, ProcessingMonitor};
use crate::utils::OcrError;
use image::RgbaImage;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Everything produced for one page.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    pub quality: QualityReport,
    /// Profile used for the OCR run whose text was corrected.
    pub ocr_profile: DocumentClass,
    pub ocr: OcrOutput,
    pub report: CorrectionReport,
}

/// Drives preprocess -> OCR -> correction for single pages.
pub struct DocumentProcessor {
    config: PipelineConfig,
    profiles: CharacterProfiles,
    pipeline: CorrectionPipeline,
    engine: Box<dyn OcrEngine>,
    monitor: Arc<ProcessingMonitor>,
}

impl DocumentProcessor {
    pub fn new(config: PipelineConfig, engine: Box<dyn OcrEngine>) -> Result<Self, OcrError> {
        let profiles = match &config.profiles_path {
            Some(path) => CharacterProfiles::from_path(path)?,
            None => CharacterProfiles::builtin().clone(),
        };
        let pipeline = CorrectionPipeline::new(&config)?;

        Ok(DocumentProcessor {
            config,
            profiles,
            pipeline,
            engine,
            monitor: Arc::new(ProcessingMonitor::new()),
        })
    }

    pub fn start(&self) -> bool {
        self.monitor.start()
    }

    pub fn stop(&self) -> bool {
        self.monitor.stop()
    }

    pub fn monitor(&self) -> Arc<ProcessingMonitor> {
        Arc::clone(&self.monitor)
    }

    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<DocumentResult, OcrError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| {
                self.monitor.record_failure();
                OcrError::ImageProcessingError(format!("Failed to open image {}: {}", path.display(), e))
            })?
            .to_rgba8();
        log::info!("processing {} ({}x{})", path.display(), image.width(), image.height());
        self.process_image(&image)
    }

    pub fn process_image(&self, image: &RgbaImage) -> Result<DocumentResult, OcrError> {
        let started = Instant::now();
        match self.run(image) {
            Ok(result) => {
                self.monitor.record_document(result.report.corrections.len(), started.elapsed());
                Ok(result)
            }
            Err(e) => {
                self.monitor.record_failure();
                Err(e)
            }
        }
    }

    /// Correction only, for text that was recognised elsewhere.
    pub fn correct_text(&self, text: &str) -> CorrectionReport {
        let started = Instant::now();
        let report = self.pipeline.process_advanced_corrections(text);
        self.monitor.record_document(report.corrections.len(), started.elapsed());
        report
    }

    fn run(&self, image: &RgbaImage) -> Result<DocumentResult, OcrError> {
        let quality = ImagePreprocessor::analyze_quality(image);
        let (prepared, options) = if self.config.auto_preprocess {
            (
                ImagePreprocessor::preprocess_for_quality(image, &quality),
                ImagePreprocessor::options_for_quality(&quality),
            )
        } else {
            (
                ImagePreprocessor::preprocess(image, &self.config.preprocessing),
                self.config.preprocessing,
            )
        };

        // The mixed-script profile reads both scripts well enough to measure
        // the ratio, which then picks the profile for the final run.
        let first_profile = self.profiles.get(DocumentClass::Bilingual)?;
        let mut ocr = self.engine.recognize(&prepared, first_profile, &options)?;
        let mut ocr_profile = DocumentClass::Bilingual;

        let selected = select_profile(detect_script_ratio(&ocr.text));
        if self.config.rerun_with_selected_profile && selected != ocr_profile && !ocr.text.trim().is_empty() {
            log::debug!("re-running OCR with {} profile", selected);
            ocr = self.engine.recognize(&prepared, self.profiles.get(selected)?, &options)?;
            ocr_profile = selected;
        }

        let report = self.pipeline.process_advanced_corrections(&ocr.text);
        Ok(DocumentResult {
            quality,
            ocr_profile,
            ocr,
            report,
        })
    }
}
