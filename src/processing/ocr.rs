use crate::models::{DocumentProfile, OcrOutput, PreprocessingOptions};
use crate::utils::OcrError;
use image::RgbaImage;

/// Resolution declared to the engine when `improve_dpi` is set.
pub const DECLARED_DPI: u32 = 300;

/// Anything that turns a page image into text.
pub trait OcrEngine: Send + Sync {
    fn recognize(
        &self,
        image: &RgbaImage,
        profile: &DocumentProfile,
        options: &PreprocessingOptions,
    ) -> Result<OcrOutput, OcrError>;
}

/// First language of a Tesseract language string ("fra+ara" -> "fra").
pub fn primary_language(languages: &str) -> &str {
    languages.split('+').next().unwrap_or(languages).trim()
}

#[cfg(feature = "tesseract")]
pub use self::tesseract_engine::TesseractEngine;

#[cfg(feature = "tesseract")]
mod tesseract_engine {
    use super::{primary_language, OcrEngine, DECLARED_DPI};
    use crate::models::{DocumentProfile, OcrOutput, PreprocessingOptions};
    use crate::utils::OcrError;
    use image::{ImageFormat, RgbaImage};
    use std::path::PathBuf;
    use tesseract::{OcrEngineMode, Tesseract};

    /// Tesseract adapter. A fresh engine is initialised per page so the
    /// adapter itself holds no mutable state.
    pub struct TesseractEngine {
        tessdata_dir: Option<PathBuf>,
    }

    impl TesseractEngine {
        pub fn new(tessdata_dir: Option<PathBuf>) -> Self {
            TesseractEngine { tessdata_dir }
        }
    }

    pub(super) fn engine_mode(code: u32) -> OcrEngineMode {
        match code {
            0 => OcrEngineMode::TesseractOnly,
            1 => OcrEngineMode::LstmOnly,
            2 => OcrEngineMode::TesseractLstmCombined,
            _ => OcrEngineMode::Default,
        }
    }

    impl OcrEngine for TesseractEngine {
        fn recognize(
            &self,
            image: &RgbaImage,
            profile: &DocumentProfile,
            options: &PreprocessingOptions,
        ) -> Result<OcrOutput, OcrError> {
            let temp_file = tempfile::Builder::new()
                .suffix(".png")
                .tempfile()
                .map_err(|e| OcrError::IoError(format!("Failed to create temp file: {}", e)))?;
            image
                .save_with_format(temp_file.path(), ImageFormat::Png)
                .map_err(|e| OcrError::ImageProcessingError(format!("Failed to write page image: {}", e)))?;
            let image_path = temp_file
                .path()
                .to_str()
                .ok_or_else(|| OcrError::IoError("Temp file path is not valid UTF-8".to_string()))?;

            let datapath = match &self.tessdata_dir {
                Some(dir) => Some(
                    dir.to_str()
                        .ok_or_else(|| OcrError::ConfigError("tessdata path is not valid UTF-8".to_string()))?,
                ),
                None => None,
            };

            log::debug!(
                "tesseract: profile {}, languages {}, psm {}, oem {}",
                profile.class,
                profile.languages,
                profile.page_seg_mode,
                profile.engine_mode
            );

            let interword = if profile.preserve_interword_spaces { "1" } else { "0" };
            let mut tess = Tesseract::new_with_oem(datapath, Some(&profile.languages), engine_mode(profile.engine_mode))
                .map_err(|e| OcrError::OcrEngineError(format!("Tesseract init error: {}", e)))?
                .set_variable("tessedit_char_whitelist", &profile.whitelist)
                .map_err(|e| OcrError::OcrEngineError(format!("Tesseract set variable error: {}", e)))?
                .set_variable("preserve_interword_spaces", interword)
                .map_err(|e| OcrError::OcrEngineError(format!("Tesseract set variable error: {}", e)))?
                .set_variable("tessedit_pageseg_mode", &profile.page_seg_mode.to_string())
                .map_err(|e| OcrError::OcrEngineError(format!("Tesseract set variable error: {}", e)))?;

            if options.improve_dpi {
                tess = tess
                    .set_variable("user_defined_dpi", &DECLARED_DPI.to_string())
                    .map_err(|e| OcrError::OcrEngineError(format!("Tesseract set variable error: {}", e)))?;
            }

            let mut tess = tess
                .set_image(image_path)
                .map_err(|e| OcrError::OcrEngineError(format!("Tesseract set image error: {}", e)))?;
            let text = tess
                .get_text()
                .map_err(|e| OcrError::OcrEngineError(format!("Tesseract error: {}", e)))?;
            let confidence = (tess.mean_text_conf() as f64 / 100.0).clamp(0.0, 1.0);

            Ok(OcrOutput {
                text,
                confidence,
                language: primary_language(&profile.languages).to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_language() {
        assert_eq!(primary_language("fra+ara"), "fra");
        assert_eq!(primary_language("ara"), "ara");
        assert_eq!(primary_language(""), "");
    }

    #[cfg(feature = "tesseract")]
    #[test]
    fn test_engine_mode_mapping() {
        use super::tesseract_engine::engine_mode;
        assert!(matches!(engine_mode(1), tesseract::OcrEngineMode::LstmOnly));
        assert!(matches!(engine_mode(7), tesseract::OcrEngineMode::Default));
    }
}
