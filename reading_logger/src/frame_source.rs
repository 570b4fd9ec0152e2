use anyhow::Context;
use image::{ImageFormat, RgbImage};
use std::path::{Path, PathBuf};

/// Decodes an image file into an RGB frame.
pub fn load_frame(path: &Path) -> anyhow::Result<RgbImage> {
    let image = image::open(path).with_context(|| format!("decoding frame {}", path.display()))?;
    Ok(image.to_rgb8())
}

/// Image files directly inside `dir`, sorted by file name.
pub fn list_frames(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))?;

    let mut frames = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && ImageFormat::from_path(&path).is_ok() {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}
