//! Filter engine
//!
//! Each filter is a pure, independent transform over an in-memory image.
//! There is no shared state and no combining of filters; the output always
//! has the same dimensions as the input.
use std::fmt;
use std::str::FromStr;

use image::DynamicImage;

use crate::error::AppError;

/// Gaussian blur radius for the blur filter
const BLUR_SIGMA: f32 = 2.0;

/// 3x3 sharpen convolution kernel
const SHARPEN_KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// 3x3 edge-detect convolution kernel
const EDGE_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

/// The fixed set of supported filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Grayscale,
    Sepia,
    Invert,
    Blur,
    Sharpen,
    Edge,
}

impl FilterKind {
    /// All supported filters, in menu order
    pub const ALL: [FilterKind; 6] = [
        FilterKind::Grayscale,
        FilterKind::Sepia,
        FilterKind::Invert,
        FilterKind::Blur,
        FilterKind::Sharpen,
        FilterKind::Edge,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Grayscale => "grayscale",
            FilterKind::Sepia => "sepia",
            FilterKind::Invert => "invert",
            FilterKind::Blur => "blur",
            FilterKind::Sharpen => "sharpen",
            FilterKind::Edge => "edge",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = AppError;

    /// Parse a user-typed filter name. Names outside the fixed set are
    /// rejected; surrounding whitespace and case are forgiven.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        FilterKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == normalized)
            .ok_or_else(|| AppError::InvalidFilter(s.trim().to_string()))
    }
}

/// Apply one filter to an image, returning the transformed copy.
pub fn apply(image: &DynamicImage, filter: FilterKind) -> DynamicImage {
    match filter {
        FilterKind::Grayscale => {
            // Luma conversion, expanded back to RGB so downstream JPEG
            // handling stays uniform
            DynamicImage::ImageRgb8(DynamicImage::ImageLuma8(image.to_luma8()).to_rgb8())
        }
        // "sepia" is historically a color desaturation (30% chroma over
        // luma), not a true sepia tone. Kept as-is so saved output stays
        // consistent across versions.
        FilterKind::Sepia => desaturate(image, 0.3),
        FilterKind::Invert => {
            let mut inverted = image.clone();
            inverted.invert();
            inverted
        }
        FilterKind::Blur => image.blur(BLUR_SIGMA),
        FilterKind::Sharpen => image.filter3x3(&SHARPEN_KERNEL),
        FilterKind::Edge => image.filter3x3(&EDGE_KERNEL),
    }
}

/// Blend each pixel toward its luma. `factor` 0.0 is full grayscale,
/// 1.0 leaves the image unchanged.
fn desaturate(image: &DynamicImage, factor: f32) -> DynamicImage {
    let mut rgb = image.to_rgb8();
    for pixel in rgb.pixels_mut() {
        let [r, g, b] = pixel.0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        pixel.0 = [
            blend_channel(luma, r, factor),
            blend_channel(luma, g, factor),
            blend_channel(luma, b, factor),
        ];
    }
    DynamicImage::ImageRgb8(rgb)
}

fn blend_channel(luma: f32, channel: u8, factor: f32) -> u8 {
    (luma + factor * (channel as f32 - luma))
        .round()
        .clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn sample_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(8, 6, |x, y| {
            Rgb([(x * 30) as u8, (y * 40) as u8, 200])
        }))
    }

    #[test]
    fn every_filter_preserves_dimensions() {
        let img = sample_image();
        for filter in FilterKind::ALL {
            let out = apply(&img, filter);
            assert_eq!(out.width(), img.width(), "{} changed width", filter);
            assert_eq!(out.height(), img.height(), "{} changed height", filter);
        }
    }

    #[test]
    fn every_supported_name_parses() {
        for filter in FilterKind::ALL {
            assert_eq!(filter.name().parse::<FilterKind>().unwrap(), filter);
        }
        // Whitespace and case are forgiven
        assert_eq!(" Invert ".parse::<FilterKind>().unwrap(), FilterKind::Invert);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "posterize".parse::<FilterKind>().unwrap_err();
        match err {
            AppError::InvalidFilter(name) => assert_eq!(name, "posterize"),
            other => panic!("expected InvalidFilter, got {:?}", other),
        }
    }

    #[test]
    fn grayscale_output_has_equal_channels() {
        let out = apply(&sample_image(), FilterKind::Grayscale).to_rgb8();
        for pixel in out.pixels() {
            assert_eq!(pixel.0[0], pixel.0[1]);
            assert_eq!(pixel.0[1], pixel.0[2]);
        }
    }

    #[test]
    fn invert_twice_restores_the_image() {
        let img = sample_image();
        let twice = apply(&apply(&img, FilterKind::Invert), FilterKind::Invert);
        assert_eq!(img.to_rgb8().as_raw(), twice.to_rgb8().as_raw());
    }

    #[test]
    fn sepia_pulls_channels_toward_luma() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([250, 10, 10])));
        let out = apply(&img, FilterKind::Sepia).to_rgb8();
        let px = out.get_pixel(0, 0).0;
        // Red drops toward the luma value, green/blue rise toward it
        assert!(px[0] < 250);
        assert!(px[1] > 10);
        assert!(px[2] > 10);
    }
}
