//! Frozen view capture

use super::ViewMode;
use crate::foundation::math::{Mat3, Mat4, Mat4Ext, Vec4};

/// Captured view rotation and translation used by the locked view modes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewLock {
    rotation: Mat3,
    position: Vec4,
    pending: bool,
}

impl Default for ViewLock {
    fn default() -> Self {
        Self {
            rotation: Mat3::identity(),
            position: Vec4::new(0.0, 0.0, 0.0, 1.0),
            pending: false,
        }
    }
}

impl ViewLock {
    /// Take a new capture from the next view passed to [`capture_pending`](Self::capture_pending)
    pub fn schedule(&mut self) {
        self.pending = true;
    }

    /// Whether a capture is waiting for a view
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Store `view` if a capture was scheduled
    ///
    /// Returns `true` when a capture was taken.
    pub fn capture_pending(&mut self, view: &Mat4) -> bool {
        if !self.pending {
            return false;
        }
        self.rotation = view.rotation_block();
        self.position = view.translation_column();
        self.pending = false;
        true
    }

    /// Captured rotation block
    pub fn rotation(&self) -> &Mat3 {
        &self.rotation
    }

    /// Captured translation column
    pub fn position(&self) -> &Vec4 {
        &self.position
    }

    /// Apply `mode` to a live view matrix
    pub fn compose(&self, mode: ViewMode, view: &Mat4) -> Mat4 {
        let mut composed = *view;
        if mode.freezes_orientation() {
            composed = composed.with_rotation_block(&self.rotation);
        }
        if mode.freezes_position() {
            composed = composed.with_translation_column(&self.position);
        }
        composed
    }
}
