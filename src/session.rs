//! Pipeline session state
//!
//! One object owns the mutable state of the capture → filter → upload
//! pipeline: the preview flag, the reference to the most recently saved
//! image, and the number of uploads currently in flight. UI callbacks
//! mutate it through these methods instead of module-level globals.
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Session state shared by all UI actions
#[derive(Debug, Default)]
pub struct Session {
    /// Whether the preview loop is running
    previewing: bool,
    /// Path of the most recently saved image (capture or filter-save).
    /// At most one is held; every successful save overwrites it.
    captured: Option<PathBuf>,
    /// Number of uploads currently in flight
    uploads_in_flight: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the preview flag; returns the new state.
    /// The caller starts or stops the frame timer based on the result.
    pub fn toggle_preview(&mut self) -> bool {
        self.previewing = !self.previewing;
        self.previewing
    }

    /// Stop previewing without toggling (frame fetch failure path)
    pub fn stop_preview(&mut self) {
        self.previewing = false;
    }

    pub fn previewing(&self) -> bool {
        self.previewing
    }

    /// The current Captured Image Reference, if any
    pub fn captured(&self) -> Option<&Path> {
        self.captured.as_deref()
    }

    /// The captured reference, demanded as a precondition.
    /// Filter application calls this before touching any file; a fresh
    /// session with nothing captured is refused here.
    pub fn require_captured(&self) -> Result<&Path, AppError> {
        self.captured.as_deref().ok_or(AppError::NoCapture)
    }

    /// Record a successful save as the new Captured Image Reference
    pub fn record_capture(&mut self, path: PathBuf) {
        self.captured = Some(path);
    }

    pub fn upload_started(&mut self) {
        self.uploads_in_flight += 1;
    }

    pub fn upload_finished(&mut self) {
        self.uploads_in_flight = self.uploads_in_flight.saturating_sub(1);
    }

    pub fn uploading(&self) -> bool {
        self.uploads_in_flight > 0
    }

    pub fn uploads_in_flight(&self) -> usize {
        self.uploads_in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_preview_twice_returns_to_idle() {
        let mut session = Session::new();
        assert!(!session.previewing());

        assert!(session.toggle_preview());
        assert!(session.previewing());

        assert!(!session.toggle_preview());
        assert!(!session.previewing());
    }

    #[test]
    fn capture_sets_reference_to_chosen_path() {
        let mut session = Session::new();
        assert!(session.captured().is_none());

        session.record_capture(PathBuf::from("out.jpg"));
        assert_eq!(session.captured(), Some(Path::new("out.jpg")));
    }

    #[test]
    fn filter_requires_a_prior_capture() {
        let mut session = Session::new();

        // Refused before any file operation happens
        match session.require_captured() {
            Err(AppError::NoCapture) => {}
            other => panic!("expected NoCapture, got {:?}", other),
        }
        assert!(session.captured().is_none());

        session.record_capture(PathBuf::from("out.jpg"));
        assert_eq!(session.require_captured().unwrap(), Path::new("out.jpg"));
    }

    #[test]
    fn cancelled_save_leaves_reference_unchanged() {
        let mut session = Session::new();
        session.record_capture(PathBuf::from("out.jpg"));

        // A cancelled dialog never calls record_capture; the reference
        // must still point at the previous save.
        assert_eq!(session.captured(), Some(Path::new("out.jpg")));
    }

    #[test]
    fn filter_save_overwrites_reference() {
        let mut session = Session::new();
        session.record_capture(PathBuf::from("out.jpg"));
        session.record_capture(PathBuf::from("out_inv.jpg"));
        assert_eq!(session.captured(), Some(Path::new("out_inv.jpg")));
    }

    #[test]
    fn upload_lifecycle_never_touches_reference() {
        let mut session = Session::new();
        session.record_capture(PathBuf::from("out.jpg"));

        session.upload_started();
        assert!(session.uploading());
        assert_eq!(session.uploads_in_flight(), 1);

        session.upload_finished();
        assert!(!session.uploading());
        assert_eq!(session.captured(), Some(Path::new("out.jpg")));
    }

    #[test]
    fn overlapping_uploads_are_counted() {
        let mut session = Session::new();
        session.upload_started();
        session.upload_started();
        assert_eq!(session.uploads_in_flight(), 2);

        session.upload_finished();
        assert!(session.uploading());
        session.upload_finished();
        assert!(!session.uploading());

        // Underflow guard: a stray completion stays at zero
        session.upload_finished();
        assert_eq!(session.uploads_in_flight(), 0);
    }
}
