// THEORY:
// The `DisplaySegmenter` is the spatial stage of the reader. It takes the binary
// mask of a whole frame and answers two questions: "where is the display?" and
// "where is each digit?".
//
// Key architectural principles & algorithm steps:
// 1.  **Bounding Box**: The display is the tight box around every active pixel.
//     The frame is assumed rectified and close-range, so nothing else lit is
//     expected in view. No active pixel means no display this tick.
// 2.  **Crop**: The mask is cut to the box. The last row and column of the box are
//     left out, matching the logger's historical output; a lone active pixel
//     therefore yields an empty region rather than a 1x1 one.
// 3.  **Indicator Removal**: A status LED sits above the digits. The top quarter of
//     the cropped height is discarded so it can never be read as a segment.
// 4.  **Cleanup**: A small closing seals cracks inside lit segments.
// 5.  **Proportional Partitioning**: The strip is split into cells with fixed
//     width weights measured off the instrument's glyph layout (a narrow sign slot
//     followed by five digits with uneven gaps). Each weight is scaled to the strip
//     and truncated individually; a spacing margin of 1/25 of the width pads every
//     cell on the right and pushes every cell but the first right by two margins.
// 6.  **Stateless Utility**: Like every stage, segmenting one mask knows nothing
//     about previous ticks.

use crate::core_modules::morphology;
use crate::core_modules::threshold::INACTIVE;
use crate::pipeline::DecoderConfig;
use image::imageops;
use image::GrayImage;

/// Box around the active pixels of a mask, end-exclusive, in mask coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// Horizontal extent of one digit cell within the display strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpan {
    pub x: u32,
    pub width: u32,
}

impl CellSpan {
    pub fn is_empty(&self) -> bool {
        self.width == 0
    }
}

/// The cleaned display strip and its digit cells.
#[derive(Debug, Clone)]
pub struct DisplayRegion {
    /// Where the crop was taken in the mask.
    pub bounds: BoundingBox,
    /// Rows removed from the top of the crop (indicator area).
    pub indicator_rows: u32,
    /// The cropped, trimmed and closed strip.
    pub image: GrayImage,
    /// Digit cells, left to right.
    pub cells: Vec<CellSpan>,
}

impl DisplayRegion {
    /// Copy of one cell, spanning the full strip height.
    pub fn cell_image(&self, cell: &CellSpan) -> GrayImage {
        imageops::crop_imm(&self.image, cell.x, 0, cell.width, self.image.height()).to_image()
    }
}

pub mod display_segmenter {
    use super::*; // Make the region types from the parent module available.

    /// Finds the box around every active pixel, or `None` for an all-dark mask.
    /// `right`/`bottom` are the largest active column/row, and are excluded from
    /// the crop taken by `segment`.
    pub fn find_bounding_box(mask: &GrayImage) -> Option<BoundingBox> {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut found = false;

        for (x, y, pixel) in mask.enumerate_pixels() {
            if pixel.0[0] == INACTIVE {
                continue;
            }
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        found.then_some(BoundingBox {
            left: min_x,
            top: min_y,
            right: max_x,
            bottom: max_y,
        })
    }

    /// Splits a strip of `strip_width` pixels into cells by proportional weights.
    pub fn partition_cells(strip_width: u32, weights: &[u32], spacing_divisor: u32) -> Vec<CellSpan> {
        let weight_sum: u32 = weights.iter().sum();
        if weight_sum == 0 || spacing_divisor == 0 {
            return vec![CellSpan { x: 0, width: 0 }; weights.len()];
        }

        let scale = strip_width as f64 / weight_sum as f64;
        let space = strip_width / spacing_divisor;
        let widths: Vec<u32> = weights.iter().map(|&w| (w as f64 * scale) as u32).collect();

        let mut cells = Vec::with_capacity(widths.len());
        let mut cumulative = 0u32;
        for (i, width) in widths.iter().enumerate() {
            let mut start = cumulative;
            if i != 0 {
                start += space * 2;
            }
            cumulative += width;
            let end = cumulative + space;

            let start = start.min(strip_width);
            let end = end.min(strip_width);
            cells.push(CellSpan {
                x: start,
                width: end.saturating_sub(start),
            });
        }
        cells
    }

    /// Locates and partitions the display. `None` when the mask has no active pixel.
    pub fn segment(mask: &GrayImage, config: &DecoderConfig) -> Option<DisplayRegion> {
        // --- 1. Bounding Box ---
        let bounds = find_bounding_box(mask)?;

        // --- 2. Crop (end-exclusive) ---
        let cropped = imageops::crop_imm(mask, bounds.left, bounds.top, bounds.width(), bounds.height()).to_image();

        // --- 3. Indicator Removal ---
        let indicator_rows = cropped.height().checked_div(config.indicator_crop_divisor).unwrap_or(0);
        let trimmed = imageops::crop_imm(
            &cropped,
            0,
            indicator_rows,
            cropped.width(),
            cropped.height() - indicator_rows,
        )
        .to_image();

        // --- 4. Cleanup ---
        let image = morphology::close(&trimmed, config.closing_kernel);

        // --- 5. Partitioning ---
        let cells = partition_cells(image.width(), &config.digit_width_weights, config.spacing_divisor);

        Some(DisplayRegion {
            bounds,
            indicator_rows,
            image,
            cells,
        })
    }

}
