use image::{imageops::FilterType, DynamicImage};

/// Display size of the live preview area
pub const PREVIEW_MAX: (u32, u32) = (640, 480);

/// Display size of the captured/filtered thumbnail
pub const THUMBNAIL_MAX: (u32, u32) = (250, 250);

/// Downscale an image to fit within `max`, preserving aspect ratio.
/// Images already within bounds are returned unchanged.
pub fn fit(image: &DynamicImage, max: (u32, u32)) -> DynamicImage {
    let (max_w, max_h) = max;
    if image.width() <= max_w && image.height() <= max_h {
        return image.clone();
    }
    // Triangle is good enough for display and much cheaper than Lanczos
    // at the preview cadence
    image.resize(max_w, max_h, FilterType::Triangle)
}

/// Convert an image into an iced image handle for rendering
pub fn to_handle(image: &DynamicImage) -> iced::widget::image::Handle {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    iced::widget::image::Handle::from_rgba(width, height, rgba.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn fit_preserves_aspect_ratio() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(1280, 960));
        let out = fit(&img, PREVIEW_MAX);
        assert_eq!(out.width(), 640);
        assert_eq!(out.height(), 480);

        let wide = DynamicImage::ImageRgb8(RgbImage::new(500, 100));
        let out = fit(&wide, THUMBNAIL_MAX);
        // Half scale keeps the 5:1 shape
        assert_eq!((out.width(), out.height()), (250, 50));
    }

    #[test]
    fn fit_leaves_small_images_alone() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(100, 80));
        let out = fit(&img, THUMBNAIL_MAX);
        assert_eq!((out.width(), out.height()), (100, 80));
    }
}
