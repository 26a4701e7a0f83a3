//! Cyclic presentation modes
//!
//! Each mode advances through a fixed cycle on one controller edge. The
//! transitions are pure; the owning state decides when to apply them.

use crate::device::EyeIndex;

/// How head tracking drives the view transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    /// Tracked orientation and position
    #[default]
    Live,
    /// Captured orientation, tracked position
    FrozenOrientationLiveOrigin,
    /// Tracked orientation, captured position
    LiveOrientationFrozenOrigin,
    /// Captured orientation and position
    FullyFrozen,
}

impl ViewMode {
    /// Next mode in the cycle
    pub const fn next(self) -> Self {
        match self {
            ViewMode::Live => ViewMode::FrozenOrientationLiveOrigin,
            ViewMode::FrozenOrientationLiveOrigin => ViewMode::LiveOrientationFrozenOrigin,
            ViewMode::LiveOrientationFrozenOrigin => ViewMode::FullyFrozen,
            ViewMode::FullyFrozen => ViewMode::Live,
        }
    }

    /// Whether the captured orientation replaces the tracked one
    pub const fn freezes_orientation(self) -> bool {
        matches!(self, ViewMode::FrozenOrientationLiveOrigin | ViewMode::FullyFrozen)
    }

    /// Whether the captured position replaces the tracked one
    pub const fn freezes_position(self) -> bool {
        matches!(self, ViewMode::LiveOrientationFrozenOrigin | ViewMode::FullyFrozen)
    }
}

/// Scene layers drawn by the scene renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentMode {
    /// Objects plus a per-eye skybox
    #[default]
    StereoScene,
    /// Per-eye skybox only
    StereoSkyboxOnly,
    /// One skybox image shown to both eyes
    MonoSkyboxOnly,
}

impl ContentMode {
    /// Next mode in the cycle
    pub const fn next(self) -> Self {
        match self {
            ContentMode::StereoScene => ContentMode::StereoSkyboxOnly,
            ContentMode::StereoSkyboxOnly => ContentMode::MonoSkyboxOnly,
            ContentMode::MonoSkyboxOnly => ContentMode::StereoScene,
        }
    }
}

/// Which eyes are rendered, and with whose content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EyeRenderMode {
    /// Both eyes, each with its own content
    #[default]
    BothNormal,
    /// Left eye only; the right viewport keeps the clear color
    LeftOnly,
    /// Right eye only; the left viewport keeps the clear color
    RightOnly,
    /// Both eyes, each showing the other eye's content
    BothSwapped,
}

impl EyeRenderMode {
    /// Next mode in the cycle
    pub const fn next(self) -> Self {
        match self {
            EyeRenderMode::BothNormal => EyeRenderMode::LeftOnly,
            EyeRenderMode::LeftOnly => EyeRenderMode::RightOnly,
            EyeRenderMode::RightOnly => EyeRenderMode::BothSwapped,
            EyeRenderMode::BothSwapped => EyeRenderMode::BothNormal,
        }
    }

    /// Whether `eye` is drawn in this mode
    pub const fn renders(self, eye: EyeIndex) -> bool {
        match self {
            EyeRenderMode::BothNormal | EyeRenderMode::BothSwapped => true,
            EyeRenderMode::LeftOnly => matches!(eye, EyeIndex::Left),
            EyeRenderMode::RightOnly => matches!(eye, EyeIndex::Right),
        }
    }

    /// Eyes drawn in this mode, in render order
    pub fn eyes_to_render(self) -> impl Iterator<Item = EyeIndex> {
        EyeIndex::ALL.into_iter().filter(move |&eye| self.renders(eye))
    }

    /// Eye whose content is drawn into `eye`'s viewport
    pub const fn content_eye(self, eye: EyeIndex) -> EyeIndex {
        match self {
            EyeRenderMode::BothSwapped => eye.other(),
            _ => eye,
        }
    }
}
