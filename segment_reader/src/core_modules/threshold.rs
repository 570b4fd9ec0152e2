// THEORY:
// The `threshold` module performs the first transformation of every tick: it turns
// a raw color frame into a binary mask where "active" pixels are the ones whose
// HSV color falls inside a user-tuned box. Everything downstream (segmenting,
// sampling, classifying) only ever sees this mask.
//
// Key architectural principles:
// 1.  **Explicit Bounds**: The threshold box is a per-call argument. The bounds are
//     owned by whoever tunes them (a config file, a slider, a test) and are never
//     read from shared state.
// 2.  **No Validation**: Malformed bounds (lower above upper on some component) are
//     accepted as-is; they simply select nothing. `is_well_formed` lets callers
//     report them.
// 3.  **Binary Output**: Active pixels are written as 255, inactive as 0, so the mask
//     can be dumped straight to a PNG for inspection.

use crate::core_modules::pixel::pixel::HsvPixel;
use image::{GrayImage, Luma, RgbImage};

/// Mask value written for active pixels.
pub const ACTIVE: u8 = 255;
/// Mask value written for inactive pixels.
pub const INACTIVE: u8 = 0;

/// A lower/upper pair of HSV triples selecting the lit display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThresholdBounds {
    pub lower: HsvTriple,
    pub upper: HsvTriple,
}

/// One corner of the threshold box, in the 8-bit HSV convention of `HsvPixel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HsvTriple {
    pub hue: u8,
    pub saturation: u8,
    pub value: u8,
}

impl HsvTriple {
    pub fn new(hue: u8, saturation: u8, value: u8) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }
}

impl ThresholdBounds {
    pub fn new(lower: HsvTriple, upper: HsvTriple) -> Self {
        Self { lower, upper }
    }

    /// Builds bounds from the flat `[low H, low S, low V, high H, high S, high V]` order
    /// used by the tuning file.
    pub fn from_values(values: [u8; 6]) -> Self {
        Self {
            lower: HsvTriple::new(values[0], values[1], values[2]),
            upper: HsvTriple::new(values[3], values[4], values[5]),
        }
    }

    /// Flattens back into the tuning-file order.
    pub fn to_values(&self) -> [u8; 6] {
        [
            self.lower.hue,
            self.lower.saturation,
            self.lower.value,
            self.upper.hue,
            self.upper.saturation,
            self.upper.value,
        ]
    }

    /// True when lower <= upper on every component.
    pub fn is_well_formed(&self) -> bool {
        self.lower.hue <= self.upper.hue
            && self.lower.saturation <= self.upper.saturation
            && self.lower.value <= self.upper.value
    }

    /// Inclusive containment test on all three components.
    pub fn contains(&self, pixel: &HsvPixel) -> bool {
        (self.lower.hue..=self.upper.hue).contains(&pixel.hue)
            && (self.lower.saturation..=self.upper.saturation).contains(&pixel.saturation)
            && (self.lower.value..=self.upper.value).contains(&pixel.value)
    }
}

/// Thresholds a color frame into a binary mask of the same dimensions.
pub fn in_range(frame: &RgbImage, bounds: &ThresholdBounds) -> GrayImage {
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let pixel = HsvPixel::from(frame.get_pixel(x, y));
        if bounds.contains(&pixel) {
            Luma([ACTIVE])
        } else {
            Luma([INACTIVE])
        }
    })
}

/// Number of active pixels in a mask.
pub fn count_active(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p.0[0] != INACTIVE).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn red_bounds() -> ThresholdBounds {
        ThresholdBounds::from_values([0, 100, 100, 10, 255, 255])
    }

    #[test]
    fn selects_only_pixels_inside_the_box() {
        let mut frame = RgbImage::new(4, 2);
        frame.put_pixel(0, 0, Rgb([255, 0, 0]));
        frame.put_pixel(3, 1, Rgb([230, 20, 10]));
        frame.put_pixel(1, 0, Rgb([0, 255, 0]));
        frame.put_pixel(2, 1, Rgb([60, 50, 50]));

        let mask = in_range(&frame, &red_bounds());

        assert_eq!(mask.get_pixel(0, 0).0[0], ACTIVE);
        assert_eq!(mask.get_pixel(3, 1).0[0], ACTIVE);
        assert_eq!(mask.get_pixel(1, 0).0[0], INACTIVE);
        assert_eq!(mask.get_pixel(2, 1).0[0], INACTIVE);
        assert_eq!(count_active(&mask), 2);
    }

    #[test]
    fn bounds_are_inclusive() {
        let bounds = ThresholdBounds::from_values([0, 255, 255, 0, 255, 255]);
        assert!(bounds.contains(&HsvPixel::new(0, 255, 255)));
        assert!(!bounds.contains(&HsvPixel::new(1, 255, 255)));
    }

    #[test]
    fn malformed_bounds_select_nothing() {
        let bounds = ThresholdBounds::from_values([10, 100, 100, 0, 255, 255]);
        assert!(!bounds.is_well_formed());

        let frame = RgbImage::from_pixel(5, 5, Rgb([255, 0, 0]));
        let mask = in_range(&frame, &bounds);
        assert_eq!(count_active(&mask), 0);
    }

    #[test]
    fn values_round_trip_through_flat_order() {
        let values = [1, 2, 3, 170, 250, 251];
        assert_eq!(ThresholdBounds::from_values(values).to_values(), values);
        assert!(ThresholdBounds::from_values(values).is_well_formed());
    }
}
