//! Graphics device abstraction
//!
//! The handful of framebuffer operations the render target manager needs,
//! expressed as a trait so the manager can drive a real GL/Vulkan context or
//! the [`HeadlessGraphics`](super::headless::HeadlessGraphics) recorder.

use super::RenderResult;
use crate::device::{Extent, SurfaceOrigin, TextureId, Viewport};

/// Opaque framebuffer object name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub u32);

/// Opaque renderbuffer object name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderbufferId(pub u32);

/// Framebuffer-level GPU operations used by the presentation core
pub trait GraphicsDevice {
    /// Row order of the window's default framebuffer
    fn default_framebuffer_origin(&self) -> SurfaceOrigin;

    /// Create an empty framebuffer object
    fn create_framebuffer(&mut self) -> RenderResult<FramebufferId>;

    /// Create a depth-only renderbuffer
    fn create_depth_buffer(&mut self, extent: Extent) -> RenderResult<RenderbufferId>;

    /// Attach a depth renderbuffer and verify framebuffer completeness
    fn attach_depth(&mut self, framebuffer: FramebufferId, depth: RenderbufferId) -> RenderResult<()>;

    /// Attach (or with `None` detach) the color texture of a framebuffer
    fn attach_color(&mut self, framebuffer: FramebufferId, texture: Option<TextureId>);

    /// Bind a framebuffer as the draw target; `None` selects the window
    fn bind_draw_framebuffer(&mut self, framebuffer: Option<FramebufferId>);

    /// Set the active viewport
    fn set_viewport(&mut self, viewport: Viewport);

    /// Clear color and depth of the bound draw target
    fn clear(&mut self, color: [f32; 4]);

    /// Copy `texture` through `read_framebuffer` onto the window
    fn blit_to_default(
        &mut self,
        read_framebuffer: FramebufferId,
        texture: TextureId,
        source: Extent,
        destination: Extent,
        flip_vertical: bool,
    );

    /// Present the window's back buffer
    fn swap_buffers(&mut self);

    /// Delete a framebuffer object
    fn delete_framebuffer(&mut self, framebuffer: FramebufferId);

    /// Delete a renderbuffer object
    fn delete_renderbuffer(&mut self, renderbuffer: RenderbufferId);
}
