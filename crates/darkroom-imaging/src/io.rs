use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use image::DynamicImage;

pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let img =
        image::open(path).with_context(|| format!("failed to open image: {}", path.display()))?;
    debug!(path = %path.display(), width = img.width(), height = img.height(), "image loaded");
    Ok(img)
}

pub fn save_image(img: &DynamicImage, path: &Path) -> Result<()> {
    // The JPEG encoder has no alpha channel; flatten before saving.
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg") && img.color().has_alpha() {
        DynamicImage::ImageRgb8(img.to_rgb8())
            .save(path)
            .with_context(|| format!("failed to save image: {}", path.display()))?;
    } else {
        img.save(path)
            .with_context(|| format!("failed to save image: {}", path.display()))?;
    }
    debug!(path = %path.display(), "image saved");
    Ok(())
}
