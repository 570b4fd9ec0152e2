pub mod image_helper {
    use crate::pipeline::FrameAnalysis;
    use image::{GrayImage, ImageEncoder};
    use std::io::BufWriter;
    use std::path::{Path, PathBuf};

    /// Writes a binary mask (or any 8-bit gray image) as a PNG.
    pub fn save_gray(path: &Path, image: &GrayImage) -> Result<(), image::error::ImageError> {
        let output = BufWriter::new(std::fs::File::create(path)?);
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::L8,
        )?;

        Ok(())
    }

    /// Dumps the mask and, when a non-empty display was found, the cleaned strip of
    /// one tick into `dir` as `mask_<tick>.png` / `roi_<tick>.png`.
    /// Returns the files written.
    pub fn dump_analysis(
        dir: &Path,
        tick: u64,
        analysis: &FrameAnalysis,
    ) -> Result<Vec<PathBuf>, image::error::ImageError> {
        let mut written = Vec::with_capacity(2);

        if analysis.mask.width() > 0 && analysis.mask.height() > 0 {
            let mask_path = dir.join(format!("mask_{tick}.png"));
            save_gray(&mask_path, &analysis.mask)?;
            written.push(mask_path);
        }

        if let Some(region) = &analysis.region {
            if region.image.width() > 0 && region.image.height() > 0 {
                let roi_path = dir.join(format!("roi_{tick}.png"));
                save_gray(&roi_path, &region.image)?;
                written.push(roi_path);
            }
        }

        Ok(written)
    }
}
