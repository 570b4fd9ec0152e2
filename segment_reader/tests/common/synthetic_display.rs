use image::{GrayImage, Luma, Rgb, RgbImage};
use segment_reader::core_modules::digit_sampler::digit_sampler::SegmentZones;
use segment_reader::core_modules::display_segmenter::display_segmenter::partition_cells;
use segment_reader::core_modules::segment_classifier::{pattern_for, DigitSymbol, Segment, SegmentPattern};
use segment_reader::pipeline::DEFAULT_DIGIT_WIDTH_WEIGHTS;

/// Width of the digit strip after cropping.
pub const STRIP_WIDTH: u32 = 460;
/// Height of the digit strip after the indicator rows are dropped.
pub const STRIP_HEIGHT: u32 = 150;
/// Rows above the strip that the segmenter discards (a quarter of the crop).
pub const INDICATOR_ROWS: u32 = 50;
/// Top-left corner of the display box in the frame.
pub const ORIGIN: (u32, u32) = (10, 5);

/// A pattern the display never shows, for unreadable cells.
pub const GARBLED: SegmentPattern = SegmentPattern::from_bits([1, 0, 0, 0, 0, 0, 0]);

/// Renders a six-cell display as a binary mask.
///
/// `text` has one character per cell: a digit, `-`, a space for a dark cell or
/// `?` for a garbled one. Two anchor pixels pin the display box: the top-left
/// one falls in the indicator rows and the bottom-right one on the excluded
/// last row and column, so neither reaches the strip.
pub fn display_mask(text: &str) -> GrayImage {
    let cells: Vec<char> = text.chars().collect();
    assert_eq!(cells.len(), DEFAULT_DIGIT_WIDTH_WEIGHTS.len(), "one character per cell");

    let (x0, y0) = ORIGIN;
    let crop_height = INDICATOR_ROWS + STRIP_HEIGHT;
    let mut mask = GrayImage::new(x0 + STRIP_WIDTH + 10, y0 + crop_height + 5);
    mask.put_pixel(x0, y0, Luma([255]));
    mask.put_pixel(x0 + STRIP_WIDTH, y0 + crop_height, Luma([255]));

    let spans = partition_cells(STRIP_WIDTH, &DEFAULT_DIGIT_WIDTH_WEIGHTS, 25);
    for (span, c) in spans.iter().zip(cells) {
        let pattern = match c {
            ' ' => continue,
            '?' => GARBLED,
            '-' => pattern_for(DigitSymbol::Minus).unwrap(),
            d => pattern_for(DigitSymbol::Digit(d.to_digit(10).expect("digit") as u8)).unwrap(),
        };

        let zones = SegmentZones::for_cell(span.width, STRIP_HEIGHT);
        for segment in Segment::ALL {
            if !pattern.is_lit(segment) {
                continue;
            }
            let (zx, zy, zw, zh) = zones.zone(segment).clipped(span.width, STRIP_HEIGHT);
            for y in zy..zy + zh {
                for x in zx..zx + zw {
                    mask.put_pixel(x0 + span.x + x, y0 + INDICATOR_ROWS + y, Luma([255]));
                }
            }
        }
    }
    mask
}

/// The same display as a color frame: `lit` on black.
pub fn display_frame(text: &str, lit: Rgb<u8>) -> RgbImage {
    let mask = display_mask(text);
    RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.get_pixel(x, y).0[0] != 0 {
            lit
        } else {
            Rgb([0, 0, 0])
        }
    })
}
