use image::DynamicImage;
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
    Camera,
};

use crate::error::AppError;

/// Fixed preview resolution requested from the device
pub const PREVIEW_WIDTH: u32 = 640;
pub const PREVIEW_HEIGHT: u32 = 480;

/// Adapter over one physical camera device.
///
/// `open` picks the device, `start` opens the stream, `capture_frame`
/// returns the current sensor frame as an RGB image, `stop` releases the
/// device. `stop` is idempotent so it is safe to call exactly once at
/// shutdown regardless of stream state.
pub struct CameraAdapter {
    camera: Camera,
}

impl CameraAdapter {
    /// Open the camera at the given index, requesting 640x480 MJPEG.
    /// Falls back to the driver's default format if the preferred one
    /// is not available.
    pub fn open(index: u32) -> Result<Self, AppError> {
        let camera_index = CameraIndex::Index(index);

        let format = CameraFormat::new(
            Resolution::new(PREVIEW_WIDTH, PREVIEW_HEIGHT),
            FrameFormat::MJPEG,
            30,
        );
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

        let camera = match Camera::new(camera_index.clone(), requested) {
            Ok(cam) => cam,
            Err(e) => {
                log::warn!("Preferred camera format unavailable ({}), using driver default", e);
                let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::None);
                Camera::new(camera_index, requested)?
            }
        };

        Ok(Self { camera })
    }

    /// Start streaming from the device
    pub fn start(&mut self) -> Result<(), AppError> {
        self.camera.open_stream()?;
        log::info!("Camera stream started");
        Ok(())
    }

    /// Grab the current sensor frame, decoded to RGB
    pub fn capture_frame(&mut self) -> Result<DynamicImage, AppError> {
        let frame = self.camera.frame()?;
        let decoded = frame.decode_image::<RgbFormat>()?;
        Ok(DynamicImage::ImageRgb8(decoded))
    }

    /// Release the device. Safe to call when the stream is already closed.
    pub fn stop(&mut self) {
        if self.camera.is_stream_open() {
            if let Err(e) = self.camera.stop_stream() {
                log::error!("Failed to stop camera stream: {}", e);
            } else {
                log::info!("Camera stream stopped");
            }
        }
    }
}
