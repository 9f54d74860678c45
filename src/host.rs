//! Window, GL context and screen switching.
//!
//! The host owns everything platform-specific: the `winit` event loop, the
//! `glutin` display/context/surface and the `glow` function table. Renderers
//! only ever see `&glow::Context` through
//! [`SurfaceRenderer`](crate::render::SurfaceRenderer) callbacks.

use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glow::HasContext;
use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributes, ContextAttributesBuilder, GlProfile, NotCurrentContext,
    PossiblyCurrentContext, Version,
};
use glutin::display::{Display, GetGlDisplay};
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::{HasRawWindowHandle, RawWindowHandle};
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::config::{AppConfig, GlApi};
use crate::render::{SurfaceDriver, TriangleRenderer, TriangleStyle};
use crate::ui::{BackAction, EguiLayer, LauncherMenu, Navigator, Screen, Transition};

const LAUNCHER_CLEAR: [f32; 4] = [0.1, 0.1, 0.1, 1.0];

enum ContextState {
    NotCurrent(NotCurrentContext),
    Current(PossiblyCurrentContext),
}

pub struct SurfaceHost {
    config: AppConfig,
    window_builder: WindowBuilder,
    gl_config: Config,
    window: Option<Window>,
    context: Option<ContextState>,
    surface: Option<Surface<WindowSurface>>,
    gl: Option<Arc<glow::Context>>,
    egui: Option<EguiLayer>,
    navigator: Navigator,
    launcher: LauncherMenu,
    triangle: Option<SurfaceDriver<TriangleRenderer<glow::Context>>>,
    fatal: Option<anyhow::Error>,
}

impl SurfaceHost {
    /// Opens the window and runs the event loop until the user quits.
    pub fn run(config: AppConfig) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        let mut host = Self::new(config, &event_loop)?;

        event_loop
            .run(|event, elwt| host.handle_event(event, elwt))
            .context("event loop terminated with error")?;

        match host.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn new(config: AppConfig, event_loop: &EventLoop<()>) -> Result<Self> {
        let window_builder = WindowBuilder::new()
            .with_title(config.window.title.clone())
            .with_inner_size(LogicalSize::new(config.window.width, config.window.height));

        let template = ConfigTemplateBuilder::new().with_alpha_size(8);

        // Android only hands out a native window once the app is resumed.
        let display_builder = DisplayBuilder::new()
            .with_window_builder(cfg!(not(target_os = "android")).then(|| window_builder.clone()));

        let (window, gl_config) = display_builder
            .build(event_loop, template, |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    // glutin only calls the picker with a non-empty set.
                    .expect("display offered no GL configs")
            })
            .map_err(|e| anyhow!("failed to build GL display: {e}"))?;

        log::info!("picked GL config with {} samples", gl_config.num_samples());

        let raw_window_handle = window.as_ref().map(|w| w.raw_window_handle());
        let context = create_context(&gl_config, config.render.gl_api, raw_window_handle)?;

        Ok(Self {
            launcher: LauncherMenu::new(config.window.title.clone()),
            config,
            window_builder,
            gl_config,
            window,
            context: Some(ContextState::NotCurrent(context)),
            surface: None,
            gl: None,
            egui: None,
            navigator: Navigator::default(),
            triangle: None,
            fatal: None,
        })
    }

    fn handle_event(&mut self, event: Event<()>, elwt: &EventLoopWindowTarget<()>) {
        match event {
            Event::Resumed => {
                if let Err(e) = self.resume(elwt) {
                    self.fail(e, elwt);
                }
            }
            Event::Suspended => self.suspend(),
            Event::WindowEvent { event, .. } => self.handle_window_event(event, elwt),
            Event::AboutToWait => {
                // Render continuously, one frame per display refresh.
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            Event::LoopExiting => self.shutdown(),
            _ => (),
        }
    }

    fn handle_window_event(&mut self, event: WindowEvent, elwt: &EventLoopWindowTarget<()>) {
        if self.navigator.current() == Screen::Launcher {
            if let (Some(egui), Some(window)) = (&mut self.egui, &self.window) {
                if egui.on_window_event(window, &event) {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape | NamedKey::BrowserBack),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match self.navigator.back() {
                BackAction::Navigate(transition) => self.apply_transition(transition),
                BackAction::Exit => elwt.exit(),
            },
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(e, elwt);
                }
            }
            _ => (),
        }
    }

    fn fail(&mut self, error: anyhow::Error, elwt: &EventLoopWindowTarget<()>) {
        log::error!("{error:#}");
        self.fatal = Some(error);
        elwt.exit();
    }

    fn resume(&mut self, elwt: &EventLoopWindowTarget<()>) -> Result<()> {
        log::debug!("resumed");
        elwt.set_control_flow(ControlFlow::Poll);

        let window = match self.window.take() {
            Some(window) => window,
            None => glutin_winit::finalize_window(elwt, self.window_builder.clone(), &self.gl_config)
                .context("failed to create window")?,
        };

        let attrs = window.build_surface_attributes(Default::default());
        let surface = unsafe {
            self.gl_config
                .display()
                .create_window_surface(&self.gl_config, &attrs)
                .context("failed to create GL window surface")?
        };

        let context = match self.context.take() {
            Some(ContextState::NotCurrent(context)) => context
                .make_current(&surface)
                .context("failed to make GL context current")?,
            Some(ContextState::Current(context)) => {
                context
                    .make_current(&surface)
                    .context("failed to make GL context current")?;
                context
            }
            None => return Err(anyhow!("GL context was lost")),
        };

        let interval = if self.config.window.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            log::warn!("could not set swap interval: {e}");
        }

        let gl = match &self.gl {
            Some(gl) => gl.clone(),
            None => {
                let display = self.gl_config.display();
                let gl = Arc::new(load_glow(&display));
                log_gl_info(&gl);
                self.gl = Some(gl.clone());
                gl
            }
        };

        if self.egui.is_none() {
            self.egui = Some(EguiLayer::new(&window, elwt, gl.clone())?);
        }

        let size = window.inner_size();
        window.request_redraw();
        self.window = Some(window);
        self.surface = Some(surface);
        self.context = Some(ContextState::Current(context));

        if let Some(driver) = &mut self.triangle {
            driver.resume(&*gl);
        }
        self.resize(size);
        Ok(())
    }

    fn suspend(&mut self) {
        log::debug!("suspended");
        if let (Some(driver), Some(gl)) = (&mut self.triangle, &self.gl) {
            driver.pause(&**gl);
        }

        // The native window goes away on Android; the context outlives it.
        self.context = match self.context.take() {
            Some(ContextState::Current(context)) => match context.make_not_current() {
                Ok(context) => Some(ContextState::NotCurrent(context)),
                Err(e) => {
                    log::error!("failed to release GL context: {e}");
                    None
                }
            },
            other => other,
        };
        self.surface = None;
        if cfg!(target_os = "android") {
            self.window = None;
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return;
        };
        if let (Some(surface), Some(ContextState::Current(context))) = (&self.surface, &self.context)
        {
            surface.resize(context, width, height);
        }
        if let (Some(driver), Some(gl)) = (&mut self.triangle, &self.gl) {
            driver.resize(&**gl, size.width, size.height);
        }
    }

    fn redraw(&mut self) -> Result<()> {
        let (Some(surface), Some(ContextState::Current(context)), Some(gl), Some(window)) =
            (&self.surface, &self.context, &self.gl, &self.window)
        else {
            return Ok(());
        };

        let mut picked = None;
        match self.navigator.current() {
            Screen::Launcher => {
                unsafe {
                    gl.clear_color(
                        LAUNCHER_CLEAR[0],
                        LAUNCHER_CLEAR[1],
                        LAUNCHER_CLEAR[2],
                        LAUNCHER_CLEAR[3],
                    );
                    gl.clear(glow::COLOR_BUFFER_BIT);
                }
                if let Some(egui) = &mut self.egui {
                    let launcher = &mut self.launcher;
                    egui.paint(window, |ctx| {
                        if let Some(screen) = launcher.show(ctx) {
                            picked = Some(screen);
                        }
                    });
                }
            }
            Screen::Triangle => {
                if let Some(driver) = &mut self.triangle {
                    driver.draw(&**gl);
                }
            }
        }

        window.pre_present_notify();
        surface
            .swap_buffers(context)
            .context("failed to swap buffers")?;

        if let Some(screen) = picked {
            if let Some(transition) = self.navigator.open(screen) {
                self.apply_transition(transition);
            }
        }
        Ok(())
    }

    fn apply_transition(&mut self, transition: Transition) {
        log::info!("{:?} -> {:?}", transition.from, transition.to);
        let Some(gl) = self.gl.clone() else {
            return;
        };

        if transition.from == Screen::Triangle {
            if let Some(mut driver) = self.triangle.take() {
                driver.destroy(&*gl);
            }
        }

        if transition.to == Screen::Triangle {
            reset_pipeline_state(&gl);
            let renderer = TriangleRenderer::new(TriangleStyle::from(&self.config.render));
            let mut driver = SurfaceDriver::new(renderer);
            driver.create(&*gl);
            if let Some(window) = &self.window {
                let size = window.inner_size();
                driver.resize(&*gl, size.width, size.height);
            }
            self.triangle = Some(driver);
        }
    }

    fn shutdown(&mut self) {
        if let Some(gl) = self.gl.clone() {
            if let Some(mut driver) = self.triangle.take() {
                driver.destroy(&*gl);
            }
        }
        if let Some(mut egui) = self.egui.take() {
            egui.destroy();
        }
        log::info!("shut down");
    }
}

fn context_attributes(api: GlApi, raw_window_handle: Option<RawWindowHandle>) -> ContextAttributes {
    match api {
        GlApi::Gles => ContextAttributesBuilder::new()
            .with_context_api(ContextApi::Gles(Some(Version::new(2, 0))))
            .build(raw_window_handle),
        GlApi::Gl => ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Compatibility)
            .build(raw_window_handle),
    }
}

/// Tries the configured API first, then the other one.
fn create_context(
    gl_config: &Config,
    preferred: GlApi,
    raw_window_handle: Option<RawWindowHandle>,
) -> Result<NotCurrentContext> {
    let fallback = match preferred {
        GlApi::Gles => GlApi::Gl,
        GlApi::Gl => GlApi::Gles,
    };
    let display = gl_config.display();

    let primary = unsafe {
        display.create_context(gl_config, &context_attributes(preferred, raw_window_handle))
    };
    match primary {
        Ok(context) => Ok(context),
        Err(e) => {
            log::warn!("{preferred:?} context unavailable ({e}), trying {fallback:?}");
            unsafe {
                display
                    .create_context(gl_config, &context_attributes(fallback, raw_window_handle))
                    .context("failed to create any GL context")
            }
        }
    }
}

fn load_glow(display: &Display) -> glow::Context {
    unsafe { glow::Context::from_loader_function_cstr(|symbol| display.get_proc_address(symbol)) }
}

fn log_gl_info(gl: &glow::Context) {
    unsafe {
        log::info!(
            "GL renderer: {} ({})",
            gl.get_parameter_string(glow::RENDERER),
            gl.get_parameter_string(glow::VERSION)
        );
    }
}

/// Leaves fixed-function state the way a fresh context has it, undoing
/// whatever the launcher's egui pass enabled.
fn reset_pipeline_state(gl: &glow::Context) {
    unsafe {
        gl.disable(glow::SCISSOR_TEST);
        gl.disable(glow::BLEND);
        gl.disable(glow::CULL_FACE);
        gl.disable(glow::DEPTH_TEST);
    }
}
