// THEORY (HSV Pixel):
// The `Pixel` module is the most fundamental unit of the reader. It is a "dumb"
// data container for a single pixel expressed in the hue/saturation/value color
// space, plus the conversion from the RGB bytes a camera or image file delivers.
// Nothing here looks at neighbors; anything spatial belongs to the mask-level
// modules (`threshold`, `morphology`, `display_segmenter`).
//
// Why HSV?
// - A lit LED segment is defined by its color family (hue) and by being bright
//   (value). Both are separated from each other in HSV, so a single box in HSV
//   space isolates the display far more reliably than any RGB range.
//
// Scale convention (8-bit, same as the thresholds stored in the tuning file):
// - hue:        0..=179, the hue angle in degrees divided by two
// - saturation: 0..=255, chroma relative to value
// - value:      0..=255, the maximum RGB channel
//
// Key principles:
// 1) Single-pixel scope: conversion never reads neighbors or history.
// 2) Integer output: every component rounds to the nearest 8-bit step.

pub mod pixel {
    use image::Rgb;

    pub type Channel = u8;
    pub type Hue = u8;
    pub type Saturation = u8;
    pub type Value = u8;

    /// Largest hue step in the 8-bit convention (359 degrees halved, rounded down).
    pub const HUE_MAX: Hue = 179;
    const HUE_STEPS: f32 = 180.0;

    /// A "dumb" data container representing a single pixel in 8-bit HSV.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct HsvPixel {
        /// Hue angle in degrees / 2 (0-179).
        pub hue: Hue,
        /// Saturation (0-255).
        pub saturation: Saturation,
        /// Value, i.e. the brightest channel (0-255).
        pub value: Value,
    }

    impl HsvPixel {
        pub fn new(hue: Hue, saturation: Saturation, value: Value) -> Self {
            Self {
                hue,
                saturation,
                value,
            }
        }

        /// Converts an RGB triple to 8-bit HSV.
        ///
        /// - Value is the maximum channel.
        /// - Saturation is `255 * chroma / value`, zero for black.
        /// - Hue is the sector-based hue angle, halved; zero for grays.
        pub fn from_rgb(red: Channel, green: Channel, blue: Channel) -> Self {
            let maximum_channel = red.max(green.max(blue));
            let minimum_channel = red.min(green.min(blue));
            let chroma = (maximum_channel - minimum_channel) as f32;

            let saturation = if maximum_channel == 0 {
                0
            } else {
                (255.0 * chroma / maximum_channel as f32).round() as Saturation
            };

            Self {
                hue: Self::hue_from_rgb(red, green, blue, maximum_channel, chroma),
                saturation,
                value: maximum_channel,
            }
        }

        fn hue_from_rgb(red: Channel, green: Channel, blue: Channel, maximum_channel: Channel, chroma: f32) -> Hue {
            if chroma <= 0.0 {
                return 0;
            }

            let inverse_chroma = 1.0 / chroma;
            let (red, green, blue) = (red as f32, green as f32, blue as f32);

            let (base_difference, sector_offset) = if maximum_channel as f32 == red {
                (green - blue, 0.0)
            } else if maximum_channel as f32 == green {
                (blue - red, 2.0)
            } else {
                (red - green, 4.0)
            };

            let mut hue_degrees = (base_difference * inverse_chroma + sector_offset) * 60.0;
            if hue_degrees < 0.0 {
                hue_degrees += 360.0;
            }

            // 359.5 degrees and up rounds onto the 180th step, which is hue 0 again.
            let hue_step = (hue_degrees / 2.0).round();
            (hue_step % HUE_STEPS) as Hue
        }
    }

    impl From<Rgb<u8>> for HsvPixel {
        fn from(rgb: Rgb<u8>) -> Self {
            let [red, green, blue] = rgb.0;
            HsvPixel::from_rgb(red, green, blue)
        }
    }

    impl From<&Rgb<u8>> for HsvPixel {
        fn from(rgb: &Rgb<u8>) -> Self {
            HsvPixel::from(*rgb)
        }
    }

}
