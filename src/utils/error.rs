use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image processing error: {0}")]
    ImageProcessingError(String),
    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),
    #[error("OCR engine error: {0}")]
    OcrEngineError(String),
    #[error("Correction pass error: {0}")]
    CorrectionError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),
    #[error("IO error: {0}")]
    IoError(String),
}
