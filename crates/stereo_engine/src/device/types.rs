//! Value types exchanged with the device session

use bitflags::bitflags;

use crate::foundation::math::{Mat4, Mat4Ext, Pose, Vec2};

/// Eye selector used to index every per-eye array
///
/// Iteration order is always [`EyeIndex::ALL`]: left, then right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EyeIndex {
    /// Left eye
    Left,
    /// Right eye
    Right,
}

impl EyeIndex {
    /// Both eyes in render order
    pub const ALL: [EyeIndex; 2] = [EyeIndex::Left, EyeIndex::Right];

    /// Array index of this eye
    pub const fn index(self) -> usize {
        match self {
            EyeIndex::Left => 0,
            EyeIndex::Right => 1,
        }
    }

    /// The opposite eye
    pub const fn other(self) -> EyeIndex {
        match self {
            EyeIndex::Left => EyeIndex::Right,
            EyeIndex::Right => EyeIndex::Left,
        }
    }
}

/// Controller hand selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    /// Left touch controller
    Left,
    /// Right touch controller
    Right,
}

impl Hand {
    /// Array index of this hand
    pub const fn index(self) -> usize {
        match self {
            Hand::Left => 0,
            Hand::Right => 1,
        }
    }
}

/// Pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Extent {
    /// Create an extent
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Integer downscale, never below one pixel per axis
    pub fn downscaled(self, factor: u32) -> Self {
        let factor = factor.max(1);
        Self {
            width: (self.width / factor).max(1),
            height: (self.height / factor).max(1),
        }
    }
}

/// Viewport rectangle inside the render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    /// Left edge in pixels
    pub x: i32,
    /// Bottom edge in pixels
    pub y: i32,
    /// Size of the rectangle
    pub extent: Extent,
}

/// Field of view as half-angle tangents from the view axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FovPort {
    /// Tangent of the upward half angle
    pub up_tan: f32,
    /// Tangent of the downward half angle
    pub down_tan: f32,
    /// Tangent of the leftward half angle
    pub left_tan: f32,
    /// Tangent of the rightward half angle
    pub right_tan: f32,
}

impl FovPort {
    /// Symmetric field of view from a full angle in degrees
    pub fn symmetric(full_angle_degrees: f32) -> Self {
        let tan = (full_angle_degrees.to_radians() * 0.5).tan();
        Self {
            up_tan: tan,
            down_tan: tan,
            left_tan: tan,
            right_tan: tan,
        }
    }

    /// OpenGL-convention projection matrix for this field of view
    pub fn projection(&self, near: f32, far: f32) -> Mat4 {
        Mat4::from_fov_tangents(self.up_tan, self.down_tan, self.left_tan, self.right_tan, near, far)
    }
}

/// Per-eye rendering description reported by the device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeRenderDesc {
    /// Default field of view of this eye
    pub fov: FovPort,
    /// Offset from the head center to this eye
    pub hmd_to_eye: Pose,
    /// Recommended texture size for this eye at 1:1 pixel density
    pub recommended_size: Extent,
}

/// Opaque GPU texture name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Buffered presentation surface (swap chain) owned by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSet {
    /// Device-assigned identifier
    pub id: u32,
    /// Number of rotating images
    pub length: usize,
    /// Size of every image
    pub extent: Extent,
}

/// One writable image of a [`SurfaceSet`], valid for a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceHandle {
    /// Index of the image inside the set
    pub index: usize,
    /// Texture backing the image
    pub texture: TextureId,
}

/// Lower-resolution preview surface written by the compositor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorSurface {
    /// Device-assigned identifier
    pub id: u32,
    /// Size of the mirror image
    pub extent: Extent,
}

/// Row order convention of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceOrigin {
    /// First row is the top of the image
    TopLeft,
    /// First row is the bottom of the image (OpenGL)
    BottomLeft,
}

bitflags! {
    /// Digital controller buttons
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u32 {
        /// Right controller A
        const A = 0x0000_0001;
        /// Right controller B
        const B = 0x0000_0002;
        /// Right thumbstick click
        const RTHUMB = 0x0000_0004;
        /// Left controller X
        const X = 0x0000_0100;
        /// Left controller Y
        const Y = 0x0000_0200;
        /// Left thumbstick click
        const LTHUMB = 0x0000_0400;
    }
}

/// Snapshot of both touch controllers
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerState {
    /// Currently held buttons
    pub buttons: Buttons,
    /// Thumbstick deflection per hand, each axis in [-1, 1]
    pub thumbsticks: [Vec2; 2],
    /// Index finger trigger per hand, in [0, 1]
    pub index_triggers: [f32; 2],
    /// Grip trigger per hand, in [0, 1]
    pub hand_triggers: [f32; 2],
}

impl ControllerState {
    /// Thumbstick deflection of one hand
    pub fn thumbstick(&self, hand: Hand) -> Vec2 {
        self.thumbsticks[hand.index()]
    }

    /// Index trigger value of one hand
    pub fn index_trigger(&self, hand: Hand) -> f32 {
        self.index_triggers[hand.index()]
    }

    /// Grip trigger value of one hand
    pub fn hand_trigger(&self, hand: Hand) -> f32 {
        self.hand_triggers[hand.index()]
    }
}

/// Everything the compositor needs to display one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSubmission {
    /// Frame index the poses were predicted for
    pub frame_index: u64,
    /// Pose each eye was rendered with, as predicted by the device
    pub render_poses: [Pose; 2],
    /// Eye offsets used for prediction (carries the interocular distance)
    pub hmd_to_eye: [Pose; 2],
    /// Eye viewports inside the submitted surface
    pub viewports: [Viewport; 2],
    /// Row order of the submitted surface
    pub origin: SurfaceOrigin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_order_and_other() {
        assert_eq!(EyeIndex::ALL, [EyeIndex::Left, EyeIndex::Right]);
        assert_eq!(EyeIndex::Left.index(), 0);
        assert_eq!(EyeIndex::Right.index(), 1);
        assert_eq!(EyeIndex::Left.other(), EyeIndex::Right);
    }

    #[test]
    fn test_extent_downscale() {
        let extent = Extent::new(2664, 1586);
        assert_eq!(extent.downscaled(4), Extent::new(666, 396));
        assert_eq!(Extent::new(2, 2).downscaled(4), Extent::new(1, 1));
    }

    #[test]
    fn test_symmetric_fov() {
        let fov = FovPort::symmetric(90.0);
        assert!((fov.up_tan - 1.0).abs() < 1e-5);
        assert!((fov.left_tan - fov.right_tan).abs() < f32::EPSILON);
    }
}
