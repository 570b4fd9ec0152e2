// THEORY:
// The `DigitSampler` turns one digit cell of the binary display strip into the
// seven on/off flags the classifier consumes. It never tries to find the strokes;
// it lays a fixed template of seven zones over the cell and asks, for each zone,
// "is enough of this lit?".
//
// Key architectural principles:
// 1.  **Template, not search**: Zone rectangles are derived only from the cell's
//     own width and height. Segment thickness is a third of the cell width; edge
//     zones are inset by that thickness from the corners so that a lit vertical
//     bar never counts toward a horizontal one.
// 2.  **Fill Ratio**: A zone's score is active pixels / zone area. Counting is done
//     on the part of the zone that lies inside the cell; the area is the zone's
//     nominal area. The zone is "on" when the ratio strictly exceeds the
//     configured threshold.
// 3.  **Degenerate Geometry**: Tiny cells produce zones with no positive area. Such
//     zones are simply "off"; sampling never divides by zero and never panics,
//     whatever the cell size.

pub mod digit_sampler {
    use crate::core_modules::segment_classifier::{Segment, SegmentPattern};
    use crate::core_modules::threshold::INACTIVE;
    use image::{GenericImageView, Luma};

    /// Default fraction of a zone that must be lit for its segment to count as on.
    pub const DEFAULT_FILL_THRESHOLD: f64 = 0.30;

    /// A zone rectangle in cell coordinates, end-exclusive. Coordinates may fall
    /// outside the cell (or be inverted) for very small cells.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Zone {
        pub x0: i64,
        pub y0: i64,
        pub x1: i64,
        pub y1: i64,
    }

    impl Zone {
        const fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
            Self { x0, y0, x1, y1 }
        }

        /// Nominal area, zero unless both spans are positive.
        pub fn area(&self) -> i64 {
            if self.x1 <= self.x0 || self.y1 <= self.y0 {
                return 0;
            }
            (self.x1 - self.x0) * (self.y1 - self.y0)
        }

        /// The zone clipped to a `width x height` cell, as `(x, y, w, h)`.
        pub fn clipped(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
            let x0 = self.x0.clamp(0, width as i64);
            let x1 = self.x1.clamp(0, width as i64);
            let y0 = self.y0.clamp(0, height as i64);
            let y1 = self.y1.clamp(0, height as i64);
            (
                x0 as u32,
                y0 as u32,
                (x1 - x0).max(0) as u32,
                (y1 - y0).max(0) as u32,
            )
        }
    }

    /// The seven zones of a cell, indexed by `Segment::index`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SegmentZones(pub [Zone; 7]);

    impl SegmentZones {
        pub fn for_cell(width: u32, height: u32) -> Self {
            let w = width as i64;
            let h = height as i64;
            let s = w / 3;
            let mid = h / 2;

            Self([
                Zone::new(s, 0, w - s, s + 1),                       // top
                Zone::new(0, s, s, mid - s + 1),                     // upper-left
                Zone::new(w - s - 1, s, w, mid - s + 1),             // upper-right
                Zone::new(s, mid - s / 2, w - s, mid + s / 2 + 1),   // center
                Zone::new(0, mid + s, s, h - s),                     // lower-left
                Zone::new(w - s - 1, mid + s, w, h - s),             // lower-right
                Zone::new(s, h - s - 1, w - s, h),                   // bottom
            ])
        }

        pub fn zone(&self, segment: Segment) -> Zone {
            self.0[segment.index()]
        }
    }

    /// Fraction of `zone` that is lit in `cell`; 0.0 for zones without area.
    pub fn fill_ratio<I>(cell: &I, zone: &Zone) -> f64
    where
        I: GenericImageView<Pixel = Luma<u8>>,
    {
        let area = zone.area();
        if area == 0 {
            return 0.0;
        }

        let (width, height) = cell.dimensions();
        let (x, y, w, h) = zone.clipped(width, height);
        let mut active = 0u64;
        for py in y..y + h {
            for px in x..x + w {
                if cell.get_pixel(px, py).0[0] != INACTIVE {
                    active += 1;
                }
            }
        }

        active as f64 / area as f64
    }

    /// Samples all seven zones of a digit cell.
    pub fn sample<I>(cell: &I, fill_threshold: f64) -> SegmentPattern
    where
        I: GenericImageView<Pixel = Luma<u8>>,
    {
        let (width, height) = cell.dimensions();
        let zones = SegmentZones::for_cell(width, height);

        let mut lit = [false; 7];
        for segment in Segment::ALL {
            lit[segment.index()] = fill_ratio(cell, &zones.zone(segment)) > fill_threshold;
        }
        SegmentPattern(lit)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::core_modules::segment_classifier::{classify, pattern_for, DigitSymbol};
        use image::GrayImage;

        fn paint(cell: &mut GrayImage, pattern: SegmentPattern) {
            let zones = SegmentZones::for_cell(cell.width(), cell.height());
            for segment in Segment::ALL {
                if !pattern.is_lit(segment) {
                    continue;
                }
                let (x, y, w, h) = zones.zone(segment).clipped(cell.width(), cell.height());
                for py in y..y + h {
                    for px in x..x + w {
                        cell.put_pixel(px, py, Luma([255]));
                    }
                }
            }
        }

        #[test]
        fn zone_layout_for_a_typical_cell() {
            let zones = SegmentZones::for_cell(62, 150);
            assert_eq!(zones.zone(Segment::Top), Zone::new(20, 0, 42, 21));
            assert_eq!(zones.zone(Segment::UpperRight), Zone::new(41, 20, 62, 56));
            assert_eq!(zones.zone(Segment::Center), Zone::new(20, 65, 42, 86));
            assert_eq!(zones.zone(Segment::LowerLeft), Zone::new(0, 95, 20, 130));
            assert_eq!(zones.zone(Segment::Bottom), Zone::new(20, 129, 42, 150));
        }

        #[test]
        fn painted_glyphs_sample_back_to_their_symbol() {
            for symbol in (0..10).map(DigitSymbol::Digit).chain([DigitSymbol::Minus]) {
                let mut cell = GrayImage::new(62, 150);
                paint(&mut cell, pattern_for(symbol).unwrap());
                let pattern = sample(&cell, DEFAULT_FILL_THRESHOLD);
                assert_eq!(classify(&pattern), Some(symbol), "sampled {pattern}");
            }
        }

        #[test]
        fn blank_and_full_cells() {
            let blank = GrayImage::new(40, 90);
            assert_eq!(sample(&blank, DEFAULT_FILL_THRESHOLD), SegmentPattern::default());

            let full = GrayImage::from_pixel(40, 90, Luma([255]));
            assert_eq!(sample(&full, DEFAULT_FILL_THRESHOLD), SegmentPattern([true; 7]));
        }

        #[test]
        fn threshold_is_strict() {
            // Light exactly 30% of the top zone (10 x 11 at s = 10 in a 30 px wide cell).
            let mut cell = GrayImage::new(30, 80);
            let top = SegmentZones::for_cell(30, 80).zone(Segment::Top);
            assert_eq!(top.area(), 110);
            let mut lit = 0;
            'fill: for py in top.y0 as u32..top.y1 as u32 {
                for px in top.x0 as u32..top.x1 as u32 {
                    if lit == 33 {
                        break 'fill;
                    }
                    cell.put_pixel(px, py, Luma([255]));
                    lit += 1;
                }
            }
            assert!((fill_ratio(&cell, &top) - 0.30).abs() < 1e-12);
            assert!(!sample(&cell, 0.30).is_lit(Segment::Top));
            assert!(sample(&cell, 0.29).is_lit(Segment::Top));
        }

        #[test]
        fn degenerate_cells_never_panic_and_read_off() {
            for (w, h) in [(0, 0), (0, 5), (5, 0), (1, 1), (2, 3), (3, 2), (3, 3), (6, 1)] {
                let blank = GrayImage::new(w, h);
                assert_eq!(sample(&blank, DEFAULT_FILL_THRESHOLD).0.len(), 7);
                let full = GrayImage::from_pixel(w, h, Luma([255]));
                let pattern = sample(&full, DEFAULT_FILL_THRESHOLD);
                assert_eq!(pattern.0.len(), 7);
            }
            assert_eq!(SegmentZones::for_cell(0, 0).zone(Segment::Top).area(), 0);
            let empty = GrayImage::new(0, 0);
            assert_eq!(fill_ratio(&empty, &Zone::new(-1, 0, 0, 1)), 0.0);
        }
    }
}
