//! Surface callback contract and the ordering rules the host follows.

use super::gl::GlesApi;

/// Callbacks a surface host invokes on its renderer, all on the render thread.
pub trait SurfaceRenderer<G: GlesApi> {
    /// Once per surface instance, before any other callback.
    fn on_surface_created(&mut self, gl: &G);

    /// Whenever the drawable area changes. Dimensions are never zero.
    fn on_surface_resized(&mut self, gl: &G, width: u32, height: u32);

    /// Once per redraw.
    fn on_draw_frame(&mut self, gl: &G);

    fn on_pause(&mut self, gl: &G) {
        let _ = gl;
    }

    fn on_resume(&mut self, gl: &G) {
        let _ = gl;
    }

    /// The host is tearing the surface down; release GL objects.
    fn on_surface_destroyed(&mut self, gl: &G) {
        let _ = gl;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePhase {
    Uncreated,
    /// Created but no usable size reported yet.
    Created,
    Sized { width: u32, height: u32 },
}

/// Drives a [`SurfaceRenderer`] in create -> (resize)* -> (draw)* order.
#[derive(Debug)]
pub struct SurfaceDriver<R> {
    renderer: R,
    phase: SurfacePhase,
    paused: bool,
    frames: u64,
}

impl<R> SurfaceDriver<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            phase: SurfacePhase::Uncreated,
            paused: false,
            frames: 0,
        }
    }

    pub fn phase(&self) -> SurfacePhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Frames drawn since the surface was created.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn create<G>(&mut self, gl: &G)
    where
        G: GlesApi,
        R: SurfaceRenderer<G>,
    {
        if self.phase != SurfacePhase::Uncreated {
            log::warn!("surface already created; ignoring create");
            return;
        }
        self.renderer.on_surface_created(gl);
        self.phase = SurfacePhase::Created;
        self.frames = 0;
    }

    pub fn resize<G>(&mut self, gl: &G, width: u32, height: u32)
    where
        G: GlesApi,
        R: SurfaceRenderer<G>,
    {
        if self.phase == SurfacePhase::Uncreated {
            self.create(gl);
        }
        if width == 0 || height == 0 {
            log::debug!("ignoring zero-sized surface {}x{}", width, height);
            return;
        }
        if self.phase == (SurfacePhase::Sized { width, height }) {
            return;
        }
        self.renderer.on_surface_resized(gl, width, height);
        self.phase = SurfacePhase::Sized { width, height };
    }

    /// Returns whether a frame was submitted.
    pub fn draw<G>(&mut self, gl: &G) -> bool
    where
        G: GlesApi,
        R: SurfaceRenderer<G>,
    {
        if self.paused || !matches!(self.phase, SurfacePhase::Sized { .. }) {
            return false;
        }
        self.renderer.on_draw_frame(gl);
        self.frames += 1;
        true
    }

    pub fn pause<G>(&mut self, gl: &G)
    where
        G: GlesApi,
        R: SurfaceRenderer<G>,
    {
        if !self.paused {
            self.paused = true;
            self.renderer.on_pause(gl);
        }
    }

    pub fn resume<G>(&mut self, gl: &G)
    where
        G: GlesApi,
        R: SurfaceRenderer<G>,
    {
        if self.paused {
            self.paused = false;
            self.renderer.on_resume(gl);
        }
    }

    /// Releases the renderer's surface objects and returns to `Uncreated`.
    ///
    /// The pause flag survives: a surface torn down while paused stays paused
    /// after the next `create` until `resume` is called. The frame counter is
    /// reset by `create`.
    pub fn destroy<G>(&mut self, gl: &G)
    where
        G: GlesApi,
        R: SurfaceRenderer<G>,
    {
        if self.phase == SurfacePhase::Uncreated {
            return;
        }
        self.renderer.on_surface_destroyed(gl);
        self.phase = SurfacePhase::Uncreated;
    }
}
