use qalam::processing::TesseractEngine;
use qalam::{DocumentProcessor, OcrError, PipelineConfig};
use std::path::PathBuf;

fn main() -> Result<(), OcrError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Legal Document OCR Demo");
    println!("-----------------------");

    let image_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("test_data/decree.png"));

    if !image_path.exists() {
        println!("\nError: page image not found: {}", image_path.display());
        println!("Usage: ocr_demo <scanned page>");
        return Ok(());
    }

    let config = PipelineConfig::load(None)?;
    let engine = TesseractEngine::new(config.tessdata_dir.clone());
    let processor = DocumentProcessor::new(config, Box::new(engine))?;
    processor.start();

    println!("Processing {}...", image_path.display());
    let result = processor.process_file(&image_path)?;

    println!("\nIMAGE QUALITY: {:?}", result.quality.suitability);
    println!(
        "OCR PROFILE: {} (confidence {:.0}%)",
        result.ocr_profile,
        result.ocr.confidence * 100.0
    );
    println!("\nCORRECTED TEXT:\n{}", result.report.text);

    let stats = &result.report.statistics;
    println!("\nCORRECTIONS: {}", stats.total_corrections);
    println!("  word separations: {}", stats.word_separations);
    println!("  rtl reorderings:  {}", stats.rtl_corrections);
    println!("  marker cleanups:  {}", stats.marker_cleanups);
    println!("  ligature fixes:   {}", stats.ligature_fixes);
    println!("  legal terms:      {}", stats.legal_terms);

    for diagnostic in &result.report.diagnostics {
        println!("  skipped pass {}: {}", diagnostic.pass, diagnostic.message);
    }

    processor.stop();
    Ok(())
}
