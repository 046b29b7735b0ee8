use image::{DynamicImage, RgbaImage};
use tracing::debug;

/// Fixed convolution/blur filters, no tuning parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Contour,
    EdgeEnhance,
    Blur,
    Detail,
}

impl FilterKind {
    pub const ALL: &[FilterKind] = &[
        FilterKind::Contour,
        FilterKind::EdgeEnhance,
        FilterKind::Blur,
        FilterKind::Detail,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterKind::Contour => "Contour",
            FilterKind::EdgeEnhance => "Edge enhance",
            FilterKind::Blur => "Blur",
            FilterKind::Detail => "Detail",
        }
    }
}

/// Factor-based adjustments. A factor of 1.0 reproduces the original;
/// below 1.0 moves toward the degenerate rendition (smoothed, black,
/// grayscale, flat gray), above 1.0 pushes past the original.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnhanceKind {
    Sharpness,
    Brightness,
    Color,
    Contrast,
}

impl EnhanceKind {
    pub const ALL: &[EnhanceKind] = &[
        EnhanceKind::Sharpness,
        EnhanceKind::Brightness,
        EnhanceKind::Color,
        EnhanceKind::Contrast,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EnhanceKind::Sharpness => "Sharpness",
            EnhanceKind::Brightness => "Brightness",
            EnhanceKind::Color => "Color",
            EnhanceKind::Contrast => "Contrast",
        }
    }
}

const BLUR_SIGMA: f32 = 2.0;
const SMOOTH_SIGMA: f32 = 1.0;

// 3x3 kernels, pre-divided by their normalization factor.
const OUTLINE_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];
const EDGE_ENHANCE_KERNEL: [f32; 9] = [-0.5, -0.5, -0.5, -0.5, 5.0, -0.5, -0.5, -0.5, -0.5];
const DETAIL_KERNEL: [f32; 9] = [
    0.0,
    -1.0 / 6.0,
    0.0,
    -1.0 / 6.0,
    10.0 / 6.0,
    -1.0 / 6.0,
    0.0,
    -1.0 / 6.0,
    0.0,
];

pub fn apply_filter(img: &DynamicImage, kind: FilterKind) -> DynamicImage {
    debug!(filter = kind.label(), "applying filter");
    // Convolution runs on RGB: filter3x3 would convolve an alpha channel
    // with the same kernel and zero it out under the edge kernels.
    let rgb = || DynamicImage::ImageRgb8(img.to_rgb8());
    match kind {
        FilterKind::Blur => img.blur(BLUR_SIGMA),
        FilterKind::EdgeEnhance => rgb().filter3x3(&EDGE_ENHANCE_KERNEL),
        FilterKind::Detail => rgb().filter3x3(&DETAIL_KERNEL),
        FilterKind::Contour => {
            // Outline extraction leaves edges bright on black; inverting
            // gives the dark-lines-on-paper look.
            let mut out = rgb().filter3x3(&OUTLINE_KERNEL);
            out.invert();
            out
        }
    }
}

pub fn apply_enhance(img: &DynamicImage, kind: EnhanceKind, factor: f32) -> DynamicImage {
    debug!(enhance = kind.label(), factor, "applying enhancement");
    let mut out = img.to_rgba8();
    match kind {
        EnhanceKind::Brightness => {
            for pixel in out.pixels_mut() {
                for c in 0..3 {
                    pixel.0[c] = lerp(0.0, f32::from(pixel.0[c]), factor);
                }
            }
        }
        EnhanceKind::Color => {
            for pixel in out.pixels_mut() {
                let y = luminance(pixel.0[0], pixel.0[1], pixel.0[2]);
                for c in 0..3 {
                    pixel.0[c] = lerp(y, f32::from(pixel.0[c]), factor);
                }
            }
        }
        EnhanceKind::Contrast => {
            let mean = mean_luminance(&out);
            for pixel in out.pixels_mut() {
                for c in 0..3 {
                    pixel.0[c] = lerp(mean, f32::from(pixel.0[c]), factor);
                }
            }
        }
        EnhanceKind::Sharpness => {
            let smoothed = DynamicImage::ImageRgba8(out.clone())
                .blur(SMOOTH_SIGMA)
                .to_rgba8();
            for (pixel, soft) in out.pixels_mut().zip(smoothed.pixels()) {
                for c in 0..3 {
                    pixel.0[c] = lerp(f32::from(soft.0[c]), f32::from(pixel.0[c]), factor);
                }
            }
        }
    }
    DynamicImage::ImageRgba8(out)
}

/// Blend between a degenerate channel value and the original, clamped
/// back into u8 range.
fn lerp(degenerate: f32, value: f32, factor: f32) -> u8 {
    (degenerate + factor * (value - degenerate)).clamp(0.0, 255.0) as u8
}

fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.2126 * f32::from(r) + 0.7152 * f32::from(g) + 0.0722 * f32::from(b)
}

fn mean_luminance(img: &RgbaImage) -> f32 {
    let count = (img.width() * img.height()) as f32;
    if count == 0.0 {
        return 0.0;
    }
    let sum: f32 = img
        .pixels()
        .map(|p| luminance(p.0[0], p.0[1], p.0[2]))
        .sum();
    sum / count
}
