// THEORY:
// Binary morphology for the display strip. Thresholding a photographed LED leaves
// pinholes and one-pixel cracks inside segments (sensor noise, the LED's own
// diffuser texture). A closing with a tiny square element seals those cracks
// while leaving the dark gaps between segments and between digits, which are
// many pixels wide, untouched.
//
// Conventions:
// - Structuring element: a `k x k` square anchored at `(k / 2, k / 2)`.
// - Closing = dilation followed by erosion with the same element, so the
//   result always contains the input.
// - The image is treated as sitting on an unbounded dark background: the
//   dilation is evaluated just outside the borders too, so lit pixels never
//   bleed onto the image edge.

use crate::core_modules::threshold::{ACTIVE, INACTIVE};
use image::{GrayImage, Luma};

/// Offsets `(dx, dy)` of the square element relative to its anchor.
fn element_offsets(kernel: u32) -> Vec<(i64, i64)> {
    let k = kernel as i64;
    let first = -(k / 2);
    let last = k - 1 - k / 2;
    let mut offsets = Vec::with_capacity((k * k) as usize);
    for dy in first..=last {
        for dx in first..=last {
            offsets.push((dx, dy));
        }
    }
    offsets
}

#[inline]
fn is_active(image: &GrayImage, x: i64, y: i64) -> bool {
    if x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 {
        return false;
    }
    image.get_pixel(x as u32, y as u32).0[0] != INACTIVE
}

fn binary(on: bool) -> Luma<u8> {
    if on { Luma([ACTIVE]) } else { Luma([INACTIVE]) }
}

/// Dilation value at any plane position, inside the image or not.
#[inline]
fn dilated_at(image: &GrayImage, offsets: &[(i64, i64)], x: i64, y: i64) -> bool {
    offsets
        .iter()
        .any(|&(dx, dy)| is_active(image, x - dx, y - dy))
}

/// Morphological closing with a `kernel x kernel` square. Sizes 0 and 1 leave the
/// mask unchanged.
pub fn close(image: &GrayImage, kernel: u32) -> GrayImage {
    if kernel <= 1 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    let offsets = element_offsets(kernel);
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let on = offsets
            .iter()
            .all(|&(dx, dy)| dilated_at(image, &offsets, x as i64 + dx, y as i64 + dy));
        binary(on)
    })
}
