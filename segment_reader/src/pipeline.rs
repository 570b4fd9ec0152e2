// THEORY:
// The `pipeline` module is the top-level API of the reader. It wraps the whole
// stack (threshold -> segment -> sample -> classify -> assemble) behind one small,
// stateless object so a caller only ever hands in a frame plus threshold bounds
// and gets back a reading.
//
// Every empirically tuned constant of the display lives in `DecoderConfig` as a
// named field with the tuned value as its default, so the reader can be
// recalibrated for a different instrument without touching the stages.

use crate::core_modules::digit_sampler::digit_sampler::DEFAULT_FILL_THRESHOLD;
use crate::core_modules::display_segmenter::{display_segmenter, DisplayRegion};
use crate::core_modules::reading::{self, Reading, UnreadableCause};
use crate::core_modules::threshold::{self, ThresholdBounds};
use image::{GrayImage, RgbImage};
use log::debug;
use thiserror::Error;

// Re-export key data structures for the public API.
pub use crate::core_modules::segment_classifier::{DigitSymbol, SegmentPattern};

/// Digit cell width weights of the instrument: sign slot, then five digits.
pub const DEFAULT_DIGIT_WIDTH_WEIGHTS: [u32; 6] = [15, 32, 35, 33, 34, 35];
/// Fixed-point scale of the display: four implied decimals.
pub const DEFAULT_DECIMAL_SCALE: f64 = 10000.0;

/// Configuration for the DisplayDecoder, allowing recalibration for other displays.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecoderConfig {
    /// Fraction of a segment zone that must be lit for the segment to count as on.
    /// Compared strictly: exactly this fraction is still off.
    pub fill_threshold: f64,
    /// The top `1 / indicator_crop_divisor` of the display box is discarded.
    pub indicator_crop_divisor: u32,
    /// Side of the square element used to close the display strip. 0 or 1 disables it.
    pub closing_kernel: u32,
    /// Relative widths of the digit cells, left to right. One cell per weight.
    pub digit_width_weights: Vec<u32>,
    /// The spacing margin between cells is `strip width / spacing_divisor`.
    pub spacing_divisor: u32,
    /// The concatenated digits are divided by this value.
    pub decimal_scale: f64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            fill_threshold: DEFAULT_FILL_THRESHOLD,
            indicator_crop_divisor: 4,
            closing_kernel: 2,
            digit_width_weights: DEFAULT_DIGIT_WIDTH_WEIGHTS.to_vec(),
            spacing_divisor: 25,
            decimal_scale: DEFAULT_DECIMAL_SCALE,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("fill threshold {0} must lie in [0, 1)")]
    FillThreshold(f64),
    #[error("indicator crop divisor must be at least 1")]
    IndicatorCropDivisor,
    #[error("at least one digit width weight is required")]
    NoDigitCells,
    #[error("digit width weights must not all be zero")]
    ZeroWeightSum,
    #[error("spacing divisor must be at least 1")]
    SpacingDivisor,
    #[error("decimal scale {0} must be a positive finite number")]
    DecimalScale(f64),
}

impl DecoderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.fill_threshold) {
            return Err(ConfigError::FillThreshold(self.fill_threshold));
        }
        if self.indicator_crop_divisor == 0 {
            return Err(ConfigError::IndicatorCropDivisor);
        }
        if self.digit_width_weights.is_empty() {
            return Err(ConfigError::NoDigitCells);
        }
        if self.digit_width_weights.iter().all(|&w| w == 0) {
            return Err(ConfigError::ZeroWeightSum);
        }
        if self.spacing_divisor == 0 {
            return Err(ConfigError::SpacingDivisor);
        }
        if !(self.decimal_scale.is_finite() && self.decimal_scale > 0.0) {
            return Err(ConfigError::DecimalScale(self.decimal_scale));
        }
        Ok(())
    }

    /// Number of digit cells the display is split into.
    pub fn cell_count(&self) -> usize {
        self.digit_width_weights.len()
    }
}

/// Everything one tick produced: the reading plus the intermediate images.
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    /// Thresholded frame.
    pub mask: GrayImage,
    /// The cleaned display strip and its cells, if a display was found.
    pub region: Option<DisplayRegion>,
    /// Per-cell classification, left to right. Empty when no display was found.
    pub symbols: Vec<Option<DigitSymbol>>,
    pub reading: Reading,
}

/// The main, top-level struct of the reader. Holds configuration only.
#[derive(Debug, Clone)]
pub struct DisplayDecoder {
    config: DecoderConfig,
}

impl DisplayDecoder {
    pub fn new(config: DecoderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes one color frame with the given threshold bounds.
    pub fn decode(&self, frame: &RgbImage, bounds: &ThresholdBounds) -> FrameAnalysis {
        // Stage 1: Color Thresholding
        let mask = threshold::in_range(frame, bounds);
        debug!(
            "thresholded {}x{} frame: {} active pixels",
            mask.width(),
            mask.height(),
            threshold::count_active(&mask)
        );
        self.analyze_mask_owned(mask)
    }

    /// Runs the pipeline on an already thresholded mask.
    pub fn analyze_mask(&self, mask: &GrayImage) -> FrameAnalysis {
        self.analyze_mask_owned(mask.clone())
    }

    /// Mask -> reading, without keeping the intermediate images.
    pub fn assemble(&self, mask: &GrayImage) -> Reading {
        reading::assemble(mask, &self.config)
    }

    fn analyze_mask_owned(&self, mask: GrayImage) -> FrameAnalysis {
        // Stage 2: Display Segmentation
        let Some(region) = display_segmenter::segment(&mask, &self.config) else {
            debug!("no active pixels, no display this tick");
            return FrameAnalysis {
                mask,
                region: None,
                symbols: Vec::new(),
                reading: Reading::Unreadable(UnreadableCause::NoDisplayFound),
            };
        };
        debug!(
            "display box {:?}, strip {}x{}",
            region.bounds,
            region.image.width(),
            region.image.height()
        );

        // Stage 3: Per-cell Sampling & Classification
        let symbols = reading::read_cells(&region, self.config.fill_threshold);

        // Stage 4: Assembly
        let reading = reading::assemble_symbols(&symbols, self.config.decimal_scale);
        debug!("reading: {reading:?}");

        FrameAnalysis {
            mask,
            region: Some(region),
            symbols,
            reading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_and_matches_the_instrument() {
        let config = DecoderConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.cell_count(), 6);
        assert_eq!(config.digit_width_weights.iter().sum::<u32>(), 184);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let bad = |f: fn(&mut DecoderConfig)| {
            let mut config = DecoderConfig::default();
            f(&mut config);
            DisplayDecoder::new(config).unwrap_err()
        };
        assert_eq!(bad(|c| c.fill_threshold = 1.0), ConfigError::FillThreshold(1.0));
        assert_eq!(bad(|c| c.indicator_crop_divisor = 0), ConfigError::IndicatorCropDivisor);
        assert_eq!(bad(|c| c.digit_width_weights.clear()), ConfigError::NoDigitCells);
        assert_eq!(bad(|c| c.digit_width_weights = vec![0, 0]), ConfigError::ZeroWeightSum);
        assert_eq!(bad(|c| c.spacing_divisor = 0), ConfigError::SpacingDivisor);
        assert_eq!(bad(|c| c.decimal_scale = 0.0), ConfigError::DecimalScale(0.0));
    }

    #[test]
    fn dark_frame_reports_no_display() {
        let decoder = DisplayDecoder::new(DecoderConfig::default()).unwrap();
        let frame = RgbImage::new(80, 40);
        let bounds = ThresholdBounds::from_values([0, 100, 100, 10, 255, 255]);
        let analysis = decoder.decode(&frame, &bounds);
        assert_eq!(analysis.reading, Reading::Unreadable(UnreadableCause::NoDisplayFound));
        assert!(analysis.region.is_none());
        assert!(analysis.symbols.is_empty());
        assert_eq!(analysis.mask.dimensions(), (80, 40));
    }

    #[test]
    fn single_pixel_mask_is_unreadable_without_panicking() {
        let decoder = DisplayDecoder::new(DecoderConfig::default()).unwrap();
        let mut mask = GrayImage::new(30, 30);
        mask.put_pixel(12, 9, image::Luma([255]));
        let analysis = decoder.analyze_mask(&mask);
        assert_eq!(analysis.symbols, vec![None; 6]);
        assert_eq!(
            analysis.reading,
            Reading::Unreadable(UnreadableCause::SegmentMismatch { cell: 1 })
        );
        assert_eq!(decoder.assemble(&mask), analysis.reading);
    }
}
