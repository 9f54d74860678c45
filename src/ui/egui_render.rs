use std::sync::Arc;

use anyhow::{anyhow, Result};
use egui::{Context as EguiContext, ViewportId};
use egui_winit::State as EguiWinitState;
use winit::event::WindowEvent;
use winit::event_loop::EventLoopWindowTarget;
use winit::window::Window;

/// egui input, layout and painting on top of the shared glow context.
pub struct EguiLayer {
    ctx: EguiContext,
    state: EguiWinitState,
    painter: egui_glow::Painter,
}

impl EguiLayer {
    pub fn new(
        window: &Window,
        target: &EventLoopWindowTarget<()>,
        gl: Arc<glow::Context>,
    ) -> Result<Self> {
        let ctx = EguiContext::default();
        let state = EguiWinitState::new(
            ctx.clone(),
            ViewportId::ROOT,
            target,
            Some(window.scale_factor() as f32),
            None,
        );
        let painter = egui_glow::Painter::new(gl, "", None)
            .map_err(|e| anyhow!("failed to create egui painter: {e}"))?;

        Ok(Self {
            ctx,
            state,
            painter,
        })
    }

    /// Returns whether egui consumed the event.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Runs one egui frame and paints it into the current framebuffer.
    pub fn paint(&mut self, window: &Window, ui: impl FnMut(&EguiContext)) {
        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, ui);

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let clipped_primitives = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let size = window.inner_size();
        self.painter.paint_and_update_textures(
            [size.width, size.height],
            full_output.pixels_per_point,
            &clipped_primitives,
            &full_output.textures_delta,
        );
    }

    pub fn destroy(&mut self) {
        self.painter.destroy();
    }
}
