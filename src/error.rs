//! Unified error type for the application
//!
//! Every boundary (camera, filter engine, disk, cloud) maps its failures
//! into one of these kinds. Errors are caught where they occur, logged,
//! and shown to the user; they are never propagated further up and never
//! terminate the process.
//!
//! Payloads are plain strings so the enum stays `Clone` and can travel
//! inside iced messages (upload completion is delivered as a message).
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Camera unavailable, closed, or failed mid-operation
    #[error("camera error: {0}")]
    Device(String),

    /// Filter name outside the fixed set
    #[error("unknown filter: {0}")]
    InvalidFilter(String),

    /// Filter requested before any image was captured
    #[error("please capture an image first")]
    NoCapture,

    /// Save failure (permissions, bad path, encoder)
    #[error("file error: {0}")]
    Io(String),

    /// Network or credential failure during upload
    #[error("upload failed: {0}")]
    Upload(String),

    /// Cloud service setup failure at startup
    #[error("cloud setup failed: {0}")]
    Initialization(String),
}

impl From<nokhwa::NokhwaError> for AppError {
    fn from(e: nokhwa::NokhwaError) -> Self {
        AppError::Device(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(e: image::ImageError) -> Self {
        AppError::Io(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Upload(e.to_string())
    }
}
