pub mod config;
pub mod correction;
pub mod document_processor;
pub mod models;
pub mod processing;
pub mod utils;

pub use config::PipelineConfig;
pub use correction::CorrectionPipeline;
pub use document_processor::{DocumentProcessor, DocumentResult};
pub use utils::OcrError;
