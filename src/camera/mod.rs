//! Hardware camera access
//!
//! This module wraps the single physical camera device behind a small
//! start / capture / stop contract. There is no reconnection or retry
//! logic; a device failure surfaces as an error and the feature degrades.

pub mod adapter;

pub use adapter::CameraAdapter;
