// qalam: command line front end for the Arabic/French OCR correction pipeline

use clap::{Parser, Subcommand};
use image::RgbaImage;
use qalam::correction::detect_script_ratio;
use qalam::models::{select_profile, CharacterProfiles, PreprocessingOptions};
use qalam::processing::ImagePreprocessor;
use qalam::{CorrectionPipeline, OcrError, PipelineConfig};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "qalam", version, about = "OCR post-processing for Algerian legal documents")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Correct raw OCR text read from a file or stdin
    Correct {
        input: Option<PathBuf>,
        /// Lightweight path: corrected text only, with legal formatting
        #[arg(long)]
        simple: bool,
    },
    /// Run the preprocessing filters on an image
    Preprocess {
        input: PathBuf,
        output: PathBuf,
        /// Use the heavier right-to-left variant
        #[arg(long, conflicts_with = "auto")]
        rtl: bool,
        /// Choose the filters from the image quality
        #[arg(long)]
        auto: bool,
    },
    /// Report contrast, sharpness and noise of an image
    Quality { input: PathBuf },
    /// Show the script ratio and OCR profile selected for a text
    Profile { input: Option<PathBuf> },
}

#[derive(Serialize)]
struct ProfileSelection<'a> {
    script_ratio: f64,
    profile: &'a qalam::models::DocumentProfile,
}

fn main() -> Result<(), OcrError> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Correct { input, simple } => {
            let text = read_input(input.as_deref())?;
            let pipeline = CorrectionPipeline::new(&config)?;
            if simple {
                print_json(&pipeline.process_arabic_text(&text))
            } else {
                print_json(&pipeline.process_advanced_corrections(&text))
            }
        }
        Command::Preprocess {
            input,
            output,
            rtl,
            auto,
        } => {
            let image = open_image(&input)?;
            let processed = if rtl {
                ImagePreprocessor::preprocess_arabic_rtl(&image)
            } else if auto {
                let quality = ImagePreprocessor::analyze_quality(&image);
                ImagePreprocessor::preprocess_for_quality(&image, &quality)
            } else {
                let options: PreprocessingOptions = config.preprocessing;
                ImagePreprocessor::preprocess(&image, &options)
            };
            processed
                .save(&output)
                .map_err(|e| OcrError::ImageProcessingError(format!("Failed to save {}: {}", output.display(), e)))?;
            log::info!("wrote {}", output.display());
            Ok(())
        }
        Command::Quality { input } => {
            let image = open_image(&input)?;
            print_json(&ImagePreprocessor::analyze_quality(&image))
        }
        Command::Profile { input } => {
            let text = read_input(input.as_deref())?;
            let profiles = match &config.profiles_path {
                Some(path) => CharacterProfiles::from_path(path)?,
                None => CharacterProfiles::builtin().clone(),
            };
            let script_ratio = detect_script_ratio(&text);
            let profile = profiles.get(select_profile(script_ratio))?;
            print_json(&ProfileSelection { script_ratio, profile })
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String, OcrError> {
    match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| OcrError::IoError(format!("Failed to read {}: {}", path.display(), e))),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| OcrError::IoError(format!("Failed to read stdin: {}", e)))?;
            Ok(text)
        }
    }
}

fn open_image(path: &Path) -> Result<RgbaImage, OcrError> {
    image::open(path)
        .map(|image| image.to_rgba8())
        .map_err(|e| OcrError::ImageProcessingError(format!("Failed to open image {}: {}", path.display(), e)))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), OcrError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| OcrError::IoError(format!("Failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}
