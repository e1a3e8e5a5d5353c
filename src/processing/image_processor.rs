use crate::models::{PreprocessingOptions, QualityReport, Suitability};
use crate::utils::OcrError;
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::filter::filter3x3;

/// Sharpening kernel; weights sum to 1 so flat regions keep their level.
const SHARPEN_KERNEL: [f32; 9] = [0.0, -0.8, 0.0, -0.8, 4.2, -0.8, 0.0, -0.8, 0.0];

const CONTRAST_GAIN: f32 = 1.3;
const RTL_CONTRAST_GAIN: f32 = 1.5;

/// Below this a pixel counts as ink.
const DARK: u8 = 128;
/// At or above this a pixel counts as paper.
const LIGHT: u8 = 200;

const SHARPNESS_SCALE: f64 = 50.0;

/// Raster filters applied before OCR, plus the quality analyzer.
///
/// Every filter works on the luma channel and returns an image with the same
/// width, height and alpha as its input.
pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// Default pipeline. Failures are logged and the input is returned as is.
    pub fn preprocess(image: &RgbaImage, options: &PreprocessingOptions) -> RgbaImage {
        match Self::try_preprocess(image, options) {
            Ok(processed) => processed,
            Err(e) => {
                log::warn!("preprocessing failed, using original image: {}", e);
                image.clone()
            }
        }
    }

    pub fn try_preprocess(image: &RgbaImage, options: &PreprocessingOptions) -> Result<RgbaImage, OcrError> {
        let mut gray = to_luma(image)?;

        if options.enhance_contrast {
            gray = Self::enhance_contrast(&gray, CONTRAST_GAIN);
        }
        if options.denoise_image {
            gray = Self::median_denoise(&gray);
        }
        if options.straighten_lines {
            gray = Self::reinforce_spaces(&gray);
        }
        if options.improve_dpi {
            // Resolution is declared to the OCR engine instead of resampling.
            log::debug!("improve_dpi requested, image left at native resolution");
        }
        if options.sharpen_text {
            gray = Self::sharpen(&gray);
        }

        from_luma(&gray, image)
    }

    /// Heavier variant for dense right-to-left scans.
    pub fn preprocess_arabic_rtl(image: &RgbaImage) -> RgbaImage {
        match Self::try_preprocess_arabic_rtl(image) {
            Ok(processed) => processed,
            Err(e) => {
                log::warn!("rtl preprocessing failed, using original image: {}", e);
                image.clone()
            }
        }
    }

    pub fn try_preprocess_arabic_rtl(image: &RgbaImage) -> Result<RgbaImage, OcrError> {
        let gray = to_luma(image)?;
        let gray = Self::enhance_contrast_rtl(&gray);
        let gray = Self::median_denoise(&gray);
        let gray = Self::remove_scan_artifacts(&gray);
        let gray = Self::separate_characters(&gray);
        let gray = Self::reinforce_spaces(&gray);
        let gray = Self::sharpen(&gray);
        from_luma(&gray, image)
    }

    /// Options matching the aggressiveness a quality report calls for.
    pub fn options_for_quality(report: &QualityReport) -> PreprocessingOptions {
        match report.suitability {
            Suitability::Excellent => PreprocessingOptions {
                enhance_contrast: true,
                denoise_image: false,
                straighten_lines: false,
                improve_dpi: false,
                sharpen_text: false,
            },
            Suitability::Good | Suitability::Poor => PreprocessingOptions::default(),
        }
    }

    pub fn preprocess_for_quality(image: &RgbaImage, report: &QualityReport) -> RgbaImage {
        log::debug!("preprocessing for {:?} quality", report.suitability);
        match report.suitability {
            Suitability::Poor => Self::preprocess_arabic_rtl(image),
            _ => Self::preprocess(image, &Self::options_for_quality(report)),
        }
    }

    pub fn analyze_quality(image: &RgbaImage) -> QualityReport {
        let gray = match to_luma(image) {
            Ok(gray) => gray,
            Err(_) => return QualityReport::new(0.0, 0.0, 0.0),
        };

        let (min, max) = gray
            .pixels()
            .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
        let contrast = (max - min) as f64 / 255.0;

        let (width, height) = gray.dimensions();
        let mut gradient_sum = 0.0;
        let mut gradient_count = 0usize;
        for y in 0..height.saturating_sub(1) {
            for x in 0..width.saturating_sub(1) {
                let here = gray.get_pixel(x, y)[0] as f64;
                let dx = gray.get_pixel(x + 1, y)[0] as f64 - here;
                let dy = gray.get_pixel(x, y + 1)[0] as f64 - here;
                gradient_sum += (dx * dx + dy * dy).sqrt();
                gradient_count += 1;
            }
        }
        let sharpness = if gradient_count == 0 {
            0.0
        } else {
            (gradient_sum / gradient_count as f64 / SHARPNESS_SCALE).min(1.0)
        };

        let n = (width as f64) * (height as f64);
        let mean = gray.pixels().map(|p| p[0] as f64).sum::<f64>() / n;
        let variance = gray.pixels().map(|p| (p[0] as f64 - mean).powi(2)).sum::<f64>() / n;
        let noise = (variance.sqrt() / 128.0).min(1.0);

        let report = QualityReport::new(contrast, sharpness, noise);
        log::debug!(
            "quality: contrast {:.2}, sharpness {:.2}, noise {:.2} -> {:?}",
            report.contrast,
            report.sharpness,
            report.noise,
            report.suitability
        );
        report
    }

    /// Linear stretch around mid-grey.
    pub fn enhance_contrast(gray: &GrayImage, gain: f32) -> GrayImage {
        let mut enhanced = gray.clone();
        for pixel in enhanced.pixels_mut() {
            pixel[0] = stretch(pixel[0], gain);
        }
        enhanced
    }

    /// Stronger stretch followed by an S-curve that darkens strokes more than
    /// it lightens paper.
    pub fn enhance_contrast_rtl(gray: &GrayImage) -> GrayImage {
        let mut enhanced = gray.clone();
        for pixel in enhanced.pixels_mut() {
            let t = stretch(pixel[0], RTL_CONTRAST_GAIN) as f32 / 255.0;
            let curved = if t < 0.5 {
                0.5 * (2.0 * t).powf(1.4)
            } else {
                1.0 - 0.5 * (2.0 * (1.0 - t)).powf(1.15)
            };
            pixel[0] = (curved * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        enhanced
    }

    /// 3x3 median; the one-pixel border is copied unchanged.
    pub fn median_denoise(gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        let mut out = gray.clone();
        if width < 3 || height < 3 {
            return out;
        }

        let mut window = [0u8; 9];
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let mut i = 0;
                for ny in y - 1..=y + 1 {
                    for nx in x - 1..=x + 1 {
                        window[i] = gray.get_pixel(nx, ny)[0];
                        i += 1;
                    }
                }
                window.sort_unstable();
                out.put_pixel(x, y, Luma([window[4]]));
            }
        }
        out
    }

    /// Widen the light gaps between words: interior runs of paper pixels get
    /// their grey fringe pushed to white.
    pub fn reinforce_spaces(gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        let mut out = gray.clone();

        for y in 0..height {
            let mut x = 0;
            while x < width {
                if gray.get_pixel(x, y)[0] < LIGHT {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < width && gray.get_pixel(x, y)[0] >= LIGHT {
                    x += 1;
                }
                let end = x;
                // only gaps with ink on both sides
                if start == 0 || end == width || end - start < 2 {
                    continue;
                }
                for gx in start..end {
                    out.put_pixel(gx, y, Luma([255]));
                }
                for edge in [start - 1, end] {
                    let value = gray.get_pixel(edge, y)[0];
                    if value >= DARK {
                        out.put_pixel(edge, y, Luma([255]));
                    }
                }
            }
        }
        out
    }

    pub fn sharpen(gray: &GrayImage) -> GrayImage {
        filter3x3(gray, &SHARPEN_KERNEL)
    }

    /// Isolated specks (fewer than three dark neighbours) become paper.
    pub fn remove_scan_artifacts(gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        let mut out = gray.clone();
        if width < 3 || height < 3 {
            return out;
        }

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                if gray.get_pixel(x, y)[0] >= DARK {
                    continue;
                }
                let dark_neighbours = neighbours(x, y)
                    .filter(|&(nx, ny)| gray.get_pixel(nx, ny)[0] < DARK)
                    .count();
                if dark_neighbours < 3 {
                    out.put_pixel(x, y, Luma([255]));
                }
            }
        }
        out
    }

    /// Thin horizontal bridges between glyphs are lightened halfway to white.
    pub fn separate_characters(gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        let mut out = gray.clone();
        if width < 3 || height < 3 {
            return out;
        }

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let value = gray.get_pixel(x, y)[0];
                if value >= DARK {
                    continue;
                }
                let light_above = gray.get_pixel(x, y - 1)[0] >= LIGHT;
                let light_below = gray.get_pixel(x, y + 1)[0] >= LIGHT;
                let dark_left = gray.get_pixel(x - 1, y)[0] < DARK;
                let dark_right = gray.get_pixel(x + 1, y)[0] < DARK;
                if light_above && light_below && dark_left && dark_right {
                    out.put_pixel(x, y, Luma([value + (255 - value) / 2]));
                }
            }
        }
        out
    }
}

fn stretch(value: u8, gain: f32) -> u8 {
    ((value as f32 - 128.0) * gain + 128.0).round().clamp(0.0, 255.0) as u8
}

fn neighbours(x: u32, y: u32) -> impl Iterator<Item = (u32, u32)> {
    (y - 1..=y + 1)
        .flat_map(move |ny| (x - 1..=x + 1).map(move |nx| (nx, ny)))
        .filter(move |&(nx, ny)| nx != x || ny != y)
}

fn to_luma(image: &RgbaImage) -> Result<GrayImage, OcrError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(OcrError::PreprocessingError(format!("Empty image {}x{}", width, height)));
    }
    Ok(GrayImage::from_fn(width, height, |x, y| {
        let [r, g, b, _] = image.get_pixel(x, y).0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    }))
}

fn from_luma(gray: &GrayImage, original: &RgbaImage) -> Result<RgbaImage, OcrError> {
    if gray.dimensions() != original.dimensions() {
        return Err(OcrError::PreprocessingError(format!(
            "Filter changed dimensions from {:?} to {:?}",
            original.dimensions(),
            gray.dimensions()
        )));
    }
    Ok(RgbaImage::from_fn(gray.width(), gray.height(), |x, y| {
        let l = gray.get_pixel(x, y)[0];
        Rgba([l, l, l, original.get_pixel(x, y)[3]])
    }))
}
