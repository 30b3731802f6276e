//! Image handling: filters, persistence, thumbnails
//!
//! - Filter engine: pure transforms over an in-memory image (filter.rs)
//! - Thumbnails: aspect-preserving downscale for display (thumbnail.rs)
//! - Persistence: JPEG save of an in-memory image (below)

pub mod filter;
pub mod thumbnail;

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::AppError;

/// Write the image to disk as JPEG.
///
/// On success the caller records `path` as the new Captured Image
/// Reference. Permission and path problems come back as `AppError::Io`.
pub fn save_jpeg(image: &DynamicImage, path: &Path) -> Result<(), AppError> {
    // Encode from RGB; camera frames and filter outputs may carry other
    // layouts and the JPEG encoder rejects alpha.
    image
        .to_rgb8()
        .save_with_format(path, image::ImageFormat::Jpeg)?;
    Ok(())
}

/// Normalize the chosen path to a `.jpg`/`.jpeg` extension.
/// Saved files are always JPEG-encoded, so a typed-in name with no
/// extension or a foreign one (`photo.png`) would mislabel the bytes.
pub fn ensure_jpg_extension(path: PathBuf) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") => path,
        _ => path.with_extension("jpg"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn save_jpeg_writes_decodable_file() {
        let dir = std::env::temp_dir().join("picam-studio-test-save");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.jpg");

        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(16, 12, |x, y| {
            image::Rgb([x as u8 * 10, y as u8 * 10, 128])
        }));

        save_jpeg(&img, &path).unwrap();

        let reloaded = image::open(&path).unwrap();
        assert_eq!(reloaded.width(), 16);
        assert_eq!(reloaded.height(), 12);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn save_jpeg_fails_on_bad_path() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let result = save_jpeg(&img, Path::new("/nonexistent-dir/nope/out.jpg"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn jpg_extension_is_appended_when_missing() {
        assert_eq!(
            ensure_jpg_extension(PathBuf::from("photo")),
            PathBuf::from("photo.jpg")
        );
        assert_eq!(
            ensure_jpg_extension(PathBuf::from("photo.jpeg")),
            PathBuf::from("photo.jpeg")
        );
        assert_eq!(
            ensure_jpg_extension(PathBuf::from("Photo.JPG")),
            PathBuf::from("Photo.JPG")
        );
    }

    #[test]
    fn foreign_extension_is_normalized_to_jpg() {
        // The bytes on disk are JPEG regardless of the typed-in name
        assert_eq!(
            ensure_jpg_extension(PathBuf::from("photo.png")),
            PathBuf::from("photo.jpg")
        );
    }
}
