pub mod image_processor;
pub mod monitor;
pub mod ocr;

pub use image_processor::ImagePreprocessor;
pub use monitor::{MonitorSnapshot, ProcessingMonitor};
pub use ocr::OcrEngine;
#[cfg(feature = "tesseract")]
pub use ocr::TesseractEngine;
