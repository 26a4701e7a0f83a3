//! Headless graphics device
//!
//! Records every framebuffer operation instead of touching a GPU. Used by the
//! test suite and by the demo harness to inspect what a frame would have
//! done to the render targets.

use std::collections::HashSet;

use super::graphics::{FramebufferId, GraphicsDevice, RenderbufferId};
use super::{RenderError, RenderResult};
use crate::device::{Extent, SurfaceOrigin, TextureId, Viewport};

/// One recorded graphics operation
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    /// Framebuffer created
    CreateFramebuffer(FramebufferId),
    /// Depth renderbuffer created
    CreateDepthBuffer(RenderbufferId, Extent),
    /// Depth attached to a framebuffer
    AttachDepth(FramebufferId, RenderbufferId),
    /// Color attachment changed
    AttachColor(FramebufferId, Option<TextureId>),
    /// Draw target bound
    BindDraw(Option<FramebufferId>),
    /// Viewport set
    Viewport(Viewport),
    /// Color + depth cleared
    Clear([f32; 4]),
    /// Mirror blit to the window
    Blit {
        /// Read framebuffer
        read: FramebufferId,
        /// Source texture
        texture: TextureId,
        /// Source size
        source: Extent,
        /// Destination size
        destination: Extent,
        /// Whether rows were flipped
        flip_vertical: bool,
    },
    /// Window presented
    SwapBuffers,
    /// Framebuffer deleted
    DeleteFramebuffer(FramebufferId),
    /// Renderbuffer deleted
    DeleteRenderbuffer(RenderbufferId),
}

/// Command-recording [`GraphicsDevice`]
#[derive(Debug, Default)]
pub struct HeadlessGraphics {
    commands: Vec<GpuCommand>,
    next_name: u32,
    live_framebuffers: HashSet<FramebufferId>,
    live_renderbuffers: HashSet<RenderbufferId>,
    command_limit: Option<usize>,
    fail_depth_buffer: bool,
    incomplete_framebuffer: bool,
}

impl HeadlessGraphics {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the most recent `limit` commands
    pub fn with_command_limit(mut self, limit: usize) -> Self {
        self.command_limit = Some(limit);
        self
    }

    /// Make depth buffer creation fail
    pub fn fail_depth_buffer(mut self) -> Self {
        self.fail_depth_buffer = true;
        self
    }

    /// Report framebuffers as incomplete after depth attachment
    pub fn incomplete_framebuffer(mut self) -> Self {
        self.incomplete_framebuffer = true;
        self
    }

    /// All commands recorded so far
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Drain the recorded commands
    pub fn take_commands(&mut self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of framebuffer and renderbuffer objects still alive
    pub fn live_objects(&self) -> usize {
        self.live_framebuffers.len() + self.live_renderbuffers.len()
    }

    fn record(&mut self, command: GpuCommand) {
        self.commands.push(command);
        if let Some(limit) = self.command_limit {
            let excess = self.commands.len().saturating_sub(limit);
            self.commands.drain(..excess);
        }
    }

    fn next_name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }
}

impl GraphicsDevice for HeadlessGraphics {
    fn default_framebuffer_origin(&self) -> SurfaceOrigin {
        SurfaceOrigin::BottomLeft
    }

    fn create_framebuffer(&mut self) -> RenderResult<FramebufferId> {
        let id = FramebufferId(self.next_name());
        self.live_framebuffers.insert(id);
        self.record(GpuCommand::CreateFramebuffer(id));
        Ok(id)
    }

    fn create_depth_buffer(&mut self, extent: Extent) -> RenderResult<RenderbufferId> {
        if self.fail_depth_buffer {
            return Err(RenderError::ResourceCreationFailed(format!(
                "depth buffer {}x{}",
                extent.width, extent.height
            )));
        }
        let id = RenderbufferId(self.next_name());
        self.live_renderbuffers.insert(id);
        self.record(GpuCommand::CreateDepthBuffer(id, extent));
        Ok(id)
    }

    fn attach_depth(&mut self, framebuffer: FramebufferId, depth: RenderbufferId) -> RenderResult<()> {
        self.record(GpuCommand::AttachDepth(framebuffer, depth));
        if self.incomplete_framebuffer {
            return Err(RenderError::IncompleteFramebuffer("missing attachment".to_string()));
        }
        Ok(())
    }

    fn attach_color(&mut self, framebuffer: FramebufferId, texture: Option<TextureId>) {
        self.record(GpuCommand::AttachColor(framebuffer, texture));
    }

    fn bind_draw_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        self.record(GpuCommand::BindDraw(framebuffer));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.record(GpuCommand::Viewport(viewport));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.record(GpuCommand::Clear(color));
    }

    fn blit_to_default(
        &mut self,
        read_framebuffer: FramebufferId,
        texture: TextureId,
        source: Extent,
        destination: Extent,
        flip_vertical: bool,
    ) {
        self.record(GpuCommand::Blit {
            read: read_framebuffer,
            texture,
            source,
            destination,
            flip_vertical,
        });
    }

    fn swap_buffers(&mut self) {
        self.record(GpuCommand::SwapBuffers);
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferId) {
        self.live_framebuffers.remove(&framebuffer);
        self.record(GpuCommand::DeleteFramebuffer(framebuffer));
    }

    fn delete_renderbuffer(&mut self, renderbuffer: RenderbufferId) {
        self.live_renderbuffers.remove(&renderbuffer);
        self.record(GpuCommand::DeleteRenderbuffer(renderbuffer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_limit_keeps_latest() {
        let mut gpu = HeadlessGraphics::new().with_command_limit(2);
        let framebuffer = gpu.create_framebuffer().expect("framebuffer");
        gpu.clear([0.0; 4]);
        gpu.swap_buffers();
        gpu.delete_framebuffer(framebuffer);

        assert_eq!(
            gpu.commands(),
            &[GpuCommand::SwapBuffers, GpuCommand::DeleteFramebuffer(framebuffer)]
        );
        assert_eq!(gpu.live_objects(), 0);
    }

    #[test]
    fn test_zero_limit_still_tracks_objects() {
        let mut gpu = HeadlessGraphics::new().with_command_limit(0);
        gpu.create_framebuffer().expect("framebuffer");
        gpu.create_depth_buffer(Extent::new(4, 4)).expect("depth");

        assert!(gpu.commands().is_empty());
        assert_eq!(gpu.live_objects(), 2);
    }
}
