use crate::correction::legal_terms::LegalTermEntry;
use crate::models::PreprocessingOptions;
use crate::utils::OcrError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `tessdata_dir`.
pub const TESSDATA_ENV: &str = "TESSDATA_PREFIX";

/// Runtime configuration shared by the pipeline, the document processor and
/// the CLI. Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub preprocessing: PreprocessingOptions,
    /// Pick the preprocessing aggressiveness from the image quality report.
    pub auto_preprocess: bool,
    /// At or below this Arabic ratio the lightweight path returns text as is.
    pub min_arabic_ratio: f64,
    /// Arabic ratio a line needs before RTL reordering looks at it.
    pub rtl_arabic_threshold: f64,
    pub long_token_threshold: usize,
    pub rerun_with_selected_profile: bool,
    pub tessdata_dir: Option<PathBuf>,
    pub profiles_path: Option<PathBuf>,
    pub extra_legal_terms: Vec<LegalTermEntry>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            preprocessing: PreprocessingOptions::default(),
            auto_preprocess: false,
            min_arabic_ratio: 0.1,
            rtl_arabic_threshold: 0.7,
            long_token_threshold: 15,
            rerun_with_selected_profile: true,
            tessdata_dir: None,
            profiles_path: None,
            extra_legal_terms: Vec::new(),
        }
    }
}

impl PipelineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, OcrError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| OcrError::IoError(format!("Failed to read config {}: {}", path.display(), e)))?;
        let config: PipelineConfig = serde_json::from_str(&raw)
            .map_err(|e| OcrError::ConfigError(format!("Invalid config {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, or the given file, with environment overrides applied.
    pub fn load(path: Option<&Path>) -> Result<Self, OcrError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    pub fn with_env_overrides(mut self) -> Self {
        self.apply_tessdata_override(env::var(TESSDATA_ENV).ok());
        self
    }

    fn apply_tessdata_override(&mut self, value: Option<String>) {
        if let Some(dir) = value.filter(|v| !v.trim().is_empty()) {
            log::debug!("tessdata directory overridden by {}: {}", TESSDATA_ENV, dir);
            self.tessdata_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> Result<(), OcrError> {
        for (name, value) in [
            ("min_arabic_ratio", self.min_arabic_ratio),
            ("rtl_arabic_threshold", self.rtl_arabic_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(OcrError::ConfigError(format!("{} must be within [0, 1], got {}", name, value)));
            }
        }
        if self.long_token_threshold < 2 {
            return Err(OcrError::ConfigError(format!(
                "long_token_threshold must be at least 2, got {}",
                self.long_token_threshold
            )));
        }
        Ok(())
    }
}
