//! Render target management
//!
//! Owns the framebuffer bound over the device's swap chain images, the depth
//! buffer shared by every image, and the read framebuffer used to copy the
//! compositor's mirror image to the window.
//!
//! Frame lifecycle:
//!
//! ```text
//! begin_frame:  acquire image -> bind framebuffer -> attach image -> clear
//! (per eye)     set_eye_viewport -> scene rendering
//! end_frame:    detach -> unbind -> commit -> submit -> mirror blit -> swap
//! ```
//!
//! The render target size is fixed for the session: both eye buffers side by
//! side, computed once from the device's recommended per-eye sizes.

use super::graphics::{FramebufferId, GraphicsDevice, RenderbufferId};
use crate::core::RenderConfig;
use crate::device::{
    DeviceError, DeviceSession, EyeIndex, EyeRenderDesc, Extent, FrameSubmission, MirrorSurface,
    SurfaceHandle, SurfaceOrigin, SurfaceSet, Viewport,
};
use crate::frame::{FrameError, FrameOutcome};

/// Placement of both eye viewports inside the shared render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeLayout {
    viewports: [Viewport; 2],
    render_target: Extent,
}

impl EyeLayout {
    /// Lay the eyes out left to right
    ///
    /// Width is the sum of both eye widths, height the larger eye height.
    pub fn side_by_side(descs: &[EyeRenderDesc; 2]) -> Self {
        let mut viewports = [Viewport::default(); 2];
        let mut render_target = Extent::default();

        for eye in EyeIndex::ALL {
            let size = descs[eye.index()].recommended_size;
            viewports[eye.index()] = Viewport {
                x: i32::try_from(render_target.width).unwrap_or(i32::MAX),
                y: 0,
                extent: size,
            };
            render_target.width += size.width;
            render_target.height = render_target.height.max(size.height);
        }

        Self { viewports, render_target }
    }

    /// Viewport of one eye
    pub fn viewport(&self, eye: EyeIndex) -> Viewport {
        self.viewports[eye.index()]
    }

    /// Both viewports in eye order
    pub fn viewports(&self) -> [Viewport; 2] {
        self.viewports
    }

    /// Size of the shared render target
    pub fn render_target(&self) -> Extent {
        self.render_target
    }
}

/// GPU objects bound over the device's buffered surface
#[derive(Debug)]
pub struct RenderSurfaceSet {
    framebuffer: FramebufferId,
    depth_buffer: RenderbufferId,
    surfaces: SurfaceSet,
}

/// Owner of the render and mirror targets for one device session
pub struct RenderTargetManager<G: GraphicsDevice> {
    gpu: G,
    layout: EyeLayout,
    targets: RenderSurfaceSet,
    mirror: MirrorSurface,
    mirror_framebuffer: FramebufferId,
    flip_mirror: bool,
    clear_color: [f32; 4],
    open_frame: Option<SurfaceHandle>,
}

impl<G: GraphicsDevice> RenderTargetManager<G> {
    /// Allocate the render surface, depth buffer and mirror surface
    ///
    /// Device allocation failures are returned unchanged as
    /// [`DeviceError::ResourceCreation`]. Anything allocated before a failure
    /// is released again.
    pub fn initialize<S: DeviceSession>(
        session: &mut S,
        mut gpu: G,
        layout: EyeLayout,
        config: &RenderConfig,
    ) -> Result<Self, FrameError> {
        let render_target = layout.render_target();
        let mirror_extent = render_target.downscaled(config.mirror_downscale);
        log::info!(
            "Creating render targets: {}x{} (mirror {}x{})",
            render_target.width,
            render_target.height,
            mirror_extent.width,
            mirror_extent.height
        );

        let surfaces = session.create_buffered_surface(render_target)?;

        let (framebuffer, depth_buffer) = match Self::create_draw_framebuffer(&mut gpu, render_target) {
            Ok(objects) => objects,
            Err(error) => {
                session.destroy_surface_set(surfaces);
                return Err(error);
            }
        };

        let release_targets = |gpu: &mut G, session: &mut S, surfaces: SurfaceSet| {
            gpu.delete_framebuffer(framebuffer);
            gpu.delete_renderbuffer(depth_buffer);
            session.destroy_surface_set(surfaces);
        };

        let mirror = match session.create_mirror_surface(mirror_extent) {
            Ok(mirror) => mirror,
            Err(error) => {
                release_targets(&mut gpu, session, surfaces);
                return Err(error.into());
            }
        };

        let mirror_framebuffer = match gpu.create_framebuffer() {
            Ok(framebuffer) => framebuffer,
            Err(error) => {
                release_targets(&mut gpu, session, surfaces);
                session.destroy_mirror_surface(mirror);
                return Err(error.into());
            }
        };

        let flip_mirror = session.mirror_origin() != gpu.default_framebuffer_origin();
        log::debug!(
            "Swap chain {} has {} images; mirror blit flip: {}",
            surfaces.id,
            surfaces.length,
            flip_mirror
        );

        Ok(Self {
            gpu,
            layout,
            targets: RenderSurfaceSet {
                framebuffer,
                depth_buffer,
                surfaces,
            },
            mirror,
            mirror_framebuffer,
            flip_mirror,
            clear_color: config.clear_color,
            open_frame: None,
        })
    }

    fn create_draw_framebuffer(gpu: &mut G, extent: Extent) -> Result<(FramebufferId, RenderbufferId), FrameError> {
        let framebuffer = gpu.create_framebuffer()?;
        let depth_buffer = match gpu.create_depth_buffer(extent) {
            Ok(depth) => depth,
            Err(error) => {
                gpu.delete_framebuffer(framebuffer);
                return Err(error.into());
            }
        };

        gpu.bind_draw_framebuffer(Some(framebuffer));
        let attached = gpu.attach_depth(framebuffer, depth_buffer);
        gpu.bind_draw_framebuffer(None);

        if let Err(error) = attached {
            gpu.delete_framebuffer(framebuffer);
            gpu.delete_renderbuffer(depth_buffer);
            return Err(error.into());
        }
        Ok((framebuffer, depth_buffer))
    }

    /// Acquire the next swap chain image and prepare it for drawing
    ///
    /// Must be called exactly once per frame before any eye is rendered.
    pub fn begin_frame<S: DeviceSession>(&mut self, session: &mut S) -> Result<SurfaceHandle, FrameError> {
        if self.open_frame.is_some() {
            return Err(FrameError::FrameAlreadyOpen);
        }

        let handle = session.acquire_next_surface(&self.targets.surfaces)?;
        let framebuffer = self.targets.framebuffer;

        self.gpu.bind_draw_framebuffer(Some(framebuffer));
        self.gpu.attach_color(framebuffer, Some(handle.texture));
        self.gpu.set_viewport(Viewport {
            x: 0,
            y: 0,
            extent: self.layout.render_target(),
        });
        self.gpu.clear(self.clear_color);

        self.open_frame = Some(handle);
        log::trace!("Frame opened on swap chain image {}", handle.index);
        Ok(handle)
    }

    /// Restrict drawing to one eye's half of the render target
    pub fn set_eye_viewport(&mut self, eye: EyeIndex) {
        self.gpu.set_viewport(self.layout.viewport(eye));
    }

    /// Finish the frame: commit, submit, then mirror to the window
    ///
    /// A transient [`DeviceError::SubmitRetry`] drops the frame (no mirror
    /// blit) and returns [`FrameOutcome::Dropped`]; every other device error
    /// is returned.
    pub fn end_frame<S: DeviceSession>(
        &mut self,
        session: &mut S,
        handle: SurfaceHandle,
        submission: &FrameSubmission,
    ) -> Result<FrameOutcome, FrameError> {
        match self.open_frame {
            Some(open) if open == handle => {}
            _ => return Err(FrameError::NoFrameOpen),
        }
        self.open_frame = None;

        let framebuffer = self.targets.framebuffer;
        self.gpu.attach_color(framebuffer, None);
        self.gpu.bind_draw_framebuffer(None);

        let presented = session
            .commit(&self.targets.surfaces)
            .and_then(|()| session.submit(submission));

        match presented {
            Ok(()) => {}
            Err(DeviceError::SubmitRetry(reason)) => {
                log::warn!("Frame {} dropped: {}", submission.frame_index, reason);
                return Ok(FrameOutcome::Dropped);
            }
            Err(error) => return Err(error.into()),
        }

        let texture = session.mirror_texture(&self.mirror);
        self.gpu.blit_to_default(
            self.mirror_framebuffer,
            texture,
            self.mirror.extent,
            self.mirror.extent,
            self.flip_mirror,
        );
        self.gpu.swap_buffers();

        Ok(FrameOutcome::Presented)
    }

    /// Eye layout of the render target
    pub fn layout(&self) -> &EyeLayout {
        &self.layout
    }

    /// Mirror surface size
    pub fn mirror_extent(&self) -> Extent {
        self.mirror.extent
    }

    /// Whether the mirror blit flips rows
    pub fn flips_mirror(&self) -> bool {
        self.flip_mirror
    }

    /// Row order of the submitted render target
    pub fn surface_origin(&self) -> SurfaceOrigin {
        self.gpu.default_framebuffer_origin()
    }

    /// Graphics device
    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    /// Mutable graphics device
    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    /// Release every GPU object and device surface, returning the device
    pub fn shutdown<S: DeviceSession>(mut self, session: &mut S) -> G {
        if self.open_frame.take().is_some() {
            log::warn!("Render targets released with a frame still open");
            self.gpu.attach_color(self.targets.framebuffer, None);
            self.gpu.bind_draw_framebuffer(None);
        }

        self.gpu.delete_framebuffer(self.mirror_framebuffer);
        self.gpu.delete_framebuffer(self.targets.framebuffer);
        self.gpu.delete_renderbuffer(self.targets.depth_buffer);
        session.destroy_mirror_surface(self.mirror);
        session.destroy_surface_set(self.targets.surfaces);

        log::info!("Render targets released");
        self.gpu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::simulated::SimulatedSession;
    use crate::foundation::math::Pose;
    use crate::render::headless::{GpuCommand, HeadlessGraphics};
    use crate::render::RenderError;

    fn manager(session: &mut SimulatedSession) -> RenderTargetManager<HeadlessGraphics> {
        let descs = EyeIndex::ALL.map(|eye| session.eye_render_desc(eye));
        RenderTargetManager::initialize(
            session,
            HeadlessGraphics::new(),
            EyeLayout::side_by_side(&descs),
            &RenderConfig::default(),
        )
        .expect("render targets")
    }

    fn submission(manager: &RenderTargetManager<HeadlessGraphics>, frame_index: u64) -> FrameSubmission {
        FrameSubmission {
            frame_index,
            render_poses: [Pose::identity(); 2],
            hmd_to_eye: [Pose::identity(); 2],
            viewports: manager.layout().viewports(),
            origin: manager.surface_origin(),
        }
    }

    #[test]
    fn test_side_by_side_layout() {
        let session = SimulatedSession::new();
        let descs = EyeIndex::ALL.map(|eye| session.eye_render_desc(eye));
        let layout = EyeLayout::side_by_side(&descs);

        assert_eq!(layout.render_target(), Extent::new(2664, 1586));
        assert_eq!(layout.viewport(EyeIndex::Left).x, 0);
        assert_eq!(layout.viewport(EyeIndex::Right).x, 1332);
        assert_eq!(layout.viewport(EyeIndex::Right).extent, Extent::new(1332, 1586));
    }

    #[test]
    fn test_initialize_sizes_depth_and_mirror() {
        let mut session = SimulatedSession::new();
        let manager = manager(&mut session);

        assert_eq!(manager.mirror_extent(), Extent::new(666, 396));
        assert!(manager.flips_mirror());
        assert!(manager
            .gpu()
            .commands()
            .iter()
            .any(|command| matches!(command, GpuCommand::CreateDepthBuffer(_, extent) if *extent == Extent::new(2664, 1586))));
    }

    #[test]
    fn test_surface_failure_is_propagated_verbatim() {
        let mut session = SimulatedSession::new().fail_surface_creation("swap chain unavailable");
        let descs = EyeIndex::ALL.map(|eye| session.eye_render_desc(eye));
        let result = RenderTargetManager::initialize(
            &mut session,
            HeadlessGraphics::new(),
            EyeLayout::side_by_side(&descs),
            &RenderConfig::default(),
        );

        match result {
            Err(FrameError::Device(DeviceError::ResourceCreation(reason))) => {
                assert_eq!(reason, "swap chain unavailable");
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_mirror_failure_releases_render_surface() {
        let mut session = SimulatedSession::new().fail_mirror_creation("mirror unavailable");
        let descs = EyeIndex::ALL.map(|eye| session.eye_render_desc(eye));
        let result = RenderTargetManager::initialize(
            &mut session,
            HeadlessGraphics::new(),
            EyeLayout::side_by_side(&descs),
            &RenderConfig::default(),
        );

        assert!(matches!(result, Err(FrameError::Device(DeviceError::ResourceCreation(_)))));
        assert_eq!(session.live_surfaces(), (0, 0));
    }

    #[test]
    fn test_frame_lifecycle_orders_submit_before_blit() {
        let mut session = SimulatedSession::new();
        let mut manager = manager(&mut session);
        manager.gpu_mut().take_commands();

        let handle = manager.begin_frame(&mut session).expect("begin");
        manager.set_eye_viewport(EyeIndex::Left);
        let frame = submission(&manager, 1);
        let outcome = manager.end_frame(&mut session, handle, &frame).expect("end");

        assert_eq!(outcome, FrameOutcome::Presented);
        assert_eq!(session.submissions().len(), 1);

        let commands = manager.gpu().commands();
        assert!(matches!(commands[0], GpuCommand::BindDraw(Some(_))));
        assert_eq!(commands[1], GpuCommand::AttachColor(manager.targets.framebuffer, Some(handle.texture)));
        assert!(matches!(commands[3], GpuCommand::Clear(_)));
        assert!(matches!(commands.last(), Some(GpuCommand::SwapBuffers)));
        assert!(commands
            .iter()
            .any(|command| matches!(command, GpuCommand::Blit { flip_vertical: true, .. })));
    }

    #[test]
    fn test_double_begin_is_rejected() {
        let mut session = SimulatedSession::new();
        let mut manager = manager(&mut session);

        let handle = manager.begin_frame(&mut session).expect("begin");
        assert!(matches!(manager.begin_frame(&mut session), Err(FrameError::FrameAlreadyOpen)));

        let frame = submission(&manager, 1);
        assert!(manager.end_frame(&mut session, handle, &frame).is_ok());
        assert!(matches!(
            manager.end_frame(&mut session, handle, &frame),
            Err(FrameError::NoFrameOpen)
        ));
    }

    #[test]
    fn test_submit_retry_drops_frame_without_blit() {
        let mut session = SimulatedSession::new();
        let mut manager = manager(&mut session);
        manager.gpu_mut().take_commands();
        session.queue_submit_failure(DeviceError::SubmitRetry("compositor busy".into()));

        let handle = manager.begin_frame(&mut session).expect("begin");
        let frame = submission(&manager, 1);
        let outcome = manager.end_frame(&mut session, handle, &frame).expect("dropped, not failed");

        assert_eq!(outcome, FrameOutcome::Dropped);
        assert_eq!(session.acquire_count(), 1);
        assert_eq!(session.commit_count(), 1);
        assert!(!manager
            .gpu()
            .commands()
            .iter()
            .any(|command| matches!(command, GpuCommand::Blit { .. })));

        // The next frame goes through normally
        let handle = manager.begin_frame(&mut session).expect("begin");
        let frame = submission(&manager, 2);
        assert_eq!(manager.end_frame(&mut session, handle, &frame).expect("end"), FrameOutcome::Presented);
        assert_eq!(session.acquire_count(), session.commit_count());
        assert_eq!(session.submissions().len(), 1);
    }

    #[test]
    fn test_device_lost_is_returned() {
        let mut session = SimulatedSession::new();
        let mut manager = manager(&mut session);
        session.queue_submit_failure(DeviceError::DeviceLost("hmd unplugged".into()));

        let handle = manager.begin_frame(&mut session).expect("begin");
        let frame = submission(&manager, 1);
        let error = manager.end_frame(&mut session, handle, &frame).expect_err("fatal");
        assert!(error.is_fatal());
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let mut session = SimulatedSession::new();
        let manager = manager(&mut session);
        assert_eq!(session.live_surfaces(), (1, 1));

        let gpu = manager.shutdown(&mut session);
        assert_eq!(gpu.live_objects(), 0);
        assert_eq!(session.live_surfaces(), (0, 0));
    }

    #[test]
    fn test_depth_failure_releases_framebuffer_and_surface() {
        let mut gpu = HeadlessGraphics::new().fail_depth_buffer();
        let result = RenderTargetManager::create_draw_framebuffer(&mut gpu, Extent::new(64, 32));
        assert!(matches!(result, Err(FrameError::Render(RenderError::ResourceCreationFailed(_)))));
        assert_eq!(gpu.live_objects(), 0);

        let mut session = SimulatedSession::new();
        let descs = EyeIndex::ALL.map(|eye| session.eye_render_desc(eye));
        let result = RenderTargetManager::initialize(
            &mut session,
            HeadlessGraphics::new().fail_depth_buffer(),
            EyeLayout::side_by_side(&descs),
            &RenderConfig::default(),
        );
        assert!(matches!(result, Err(FrameError::Render(RenderError::ResourceCreationFailed(_)))));
        assert_eq!(session.live_surfaces(), (0, 0));
    }

    #[test]
    fn test_incomplete_framebuffer_releases_everything() {
        let mut gpu = HeadlessGraphics::new().incomplete_framebuffer();
        let result = RenderTargetManager::create_draw_framebuffer(&mut gpu, Extent::new(64, 32));
        assert!(matches!(result, Err(FrameError::Render(RenderError::IncompleteFramebuffer(_)))));
        assert_eq!(gpu.live_objects(), 0);
        assert_eq!(gpu.commands().last(), Some(&GpuCommand::DeleteRenderbuffer(RenderbufferId(2))));

        let mut session = SimulatedSession::new();
        let descs = EyeIndex::ALL.map(|eye| session.eye_render_desc(eye));
        let result = RenderTargetManager::initialize(
            &mut session,
            HeadlessGraphics::new().incomplete_framebuffer(),
            EyeLayout::side_by_side(&descs),
            &RenderConfig::default(),
        );
        assert!(matches!(result, Err(FrameError::Render(RenderError::IncompleteFramebuffer(_)))));
        assert_eq!(session.live_surfaces(), (0, 0));
    }

    #[test]
    fn test_uneven_eye_sizes() {
        let mut narrow = SimulatedSession::new().eye_render_desc(EyeIndex::Right);
        narrow.recommended_size = Extent::new(1000, 1700);
        let mut session = SimulatedSession::new().with_eye_desc(EyeIndex::Right, narrow);
        let manager = manager(&mut session);

        assert_eq!(manager.layout().render_target(), Extent::new(2332, 1700));
        assert_eq!(manager.layout().viewport(EyeIndex::Right).x, 1332);
        assert_eq!(manager.mirror_extent(), Extent::new(583, 425));
    }
}
