use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use glium::{Display, Frame, Surface};
use glutin::window::WindowBuilder;
use imgui_glium_renderer::imgui::{Context, FontConfig, FontSource, Ui};
use imgui_glium_renderer::Renderer;
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use log::{error, info, warn};
use thiserror::Error;
use winit::event::{DeviceEvent, Event, VirtualKeyCode};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit_input_helper::WinitInputHelper;

use crate::config::{AppConfig, DEFAULT_CLEAR_COLOR};

/// Window or GL context could not be created.
#[derive(Debug, Error)]
#[error("failed to initialize {stage}: {message}")]
pub struct BootstrapError {
    stage: &'static str,
    message: String,
}

impl BootstrapError {
    fn from_panic(stage: &'static str, panic: Box<dyn Any + Send>) -> Self {
        BootstrapError {
            stage,
            message: panic_message(panic),
        }
    }

    fn from_error(stage: &'static str, err: impl fmt::Display) -> Self {
        BootstrapError {
            stage,
            message: err.to_string(),
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

/// winit panics instead of failing when no display server is reachable.
fn create_event_loop() -> Result<EventLoop<()>, BootstrapError> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    event_loop.map_err(|panic| BootstrapError::from_panic("event loop", panic))
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame, never negative.
    pub delta: f32,
    /// Seconds since the loop started.
    pub elapsed: f32,
    /// Cursor position rebuilt from raw mouse motion while the cursor is
    /// grabbed. Some platforms stop reporting `CursorMoved` during a grab.
    pub look_cursor: Option<(f32, f32)>,
}

impl FrameTime {
    pub fn fps(&self) -> f32 {
        if self.delta > 0.0 {
            1.0 / self.delta
        } else {
            0.0
        }
    }
}

pub struct FrameClock {
    start: Instant,
    last: Instant,
}

impl FrameClock {
    pub fn new(now: Instant) -> Self {
        FrameClock { start: now, last: now }
    }

    pub fn tick(&mut self, now: Instant) -> (FrameTime, Duration) {
        let delta = now.saturating_duration_since(self.last);
        self.last = now.max(self.last);
        let frame = FrameTime {
            delta: delta.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
            look_cursor: None,
        };
        (frame, delta)
    }
}

/// Virtual cursor moved by raw device motion, starting at the window centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookCursor {
    x: f32,
    y: f32,
}

impl LookCursor {
    pub fn centered(width: u32, height: u32) -> Self {
        LookCursor {
            x: width as f32 / 2.0,
            y: height as f32 / 2.0,
        }
    }

    pub fn apply(&mut self, (dx, dy): (f64, f64)) {
        self.x += dx as f32;
        self.y += dy as f32;
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// One cookbook program: owns its GPU resources and draws one frame at a time.
pub trait Recipe {
    fn title(&self) -> &str;

    fn clear_color(&self) -> (f32, f32, f32, f32) {
        DEFAULT_CLEAR_COLOR
    }

    /// Hide and confine the cursor for mouse look.
    fn grabs_cursor(&self) -> bool {
        false
    }

    fn update(&mut self, _input: &WinitInputHelper, _frame: &FrameTime) {}

    fn draw(&self, target: &mut Frame, frame: &FrameTime) -> Result<()>;

    fn overlay(&self, _ui: &Ui) {}
}

pub fn create_display(config: &AppConfig, event_loop: &EventLoop<()>) -> Result<Display, BootstrapError> {
    let context = glutin::ContextBuilder::new()
        .with_vsync(config.vsync)
        .with_gl(glutin::GlRequest::Specific(glutin::Api::OpenGl, (3, 3)))
        .with_gl_profile(glutin::GlProfile::Core)
        .with_depth_buffer(24);
    let builder = WindowBuilder::new()
        .with_title(config.title.to_owned())
        .with_resizable(false)
        .with_inner_size(glutin::dpi::LogicalSize::new(config.width as f64, config.height as f64));
    Display::new(builder, context, event_loop).map_err(|err| BootstrapError::from_error("display", err))
}

/// Opens the window, builds the recipe and runs it until Escape or close.
pub fn run<F>(config: AppConfig, build: F) -> Result<()>
where
    F: FnOnce(&Display, &AppConfig) -> Result<Box<dyn Recipe>>,
{
    let mut event_loop = create_event_loop()?;
    let display = create_display(&config, &event_loop)?;
    info!("opened {}x{} window \"{}\"", config.width, config.height, config.title);

    let mut imgui = Context::create();
    imgui.set_ini_filename(None);

    let mut platform = WinitPlatform::init(&mut imgui);
    {
        let gl_window = display.gl_window();
        let window = gl_window.window();
        platform.attach_window(imgui.io_mut(), window, HiDpiMode::Rounded);
    }

    let hidpi_factor = platform.hidpi_factor();
    let font_size = (13.0 * hidpi_factor) as f32;
    imgui.fonts().add_font(&[FontSource::DefaultFontData {
        config: Some(FontConfig {
            size_pixels: font_size,
            ..FontConfig::default()
        }),
    }]);
    imgui.io_mut().font_global_scale = (1.0 / hidpi_factor) as f32;

    let mut renderer = Renderer::init(&mut imgui, &display)
        .map_err(|err| BootstrapError::from_error("overlay renderer", format!("{:?}", err)))?;

    let mut recipe = build(&display, &config)?;
    let mut look = None;
    if recipe.grabs_cursor() {
        look = Some(LookCursor::centered(config.width, config.height));
        let gl_window = display.gl_window();
        let window = gl_window.window();
        if let Err(err) = window.set_cursor_grab(true) {
            warn!("could not grab cursor: {}", err);
        }
        window.set_cursor_visible(false);
    }
    info!("running {}", recipe.title());

    let mut input = WinitInputHelper::new();
    let mut clock = FrameClock::new(Instant::now());
    let mut frame = FrameTime::default();
    let mut last_error: Option<anyhow::Error> = None;

    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        {
            let gl_window = display.gl_window();
            platform.handle_event(imgui.io_mut(), gl_window.window(), &event);
        }

        match &event {
            Event::NewEvents(_) => {
                let (next, delta) = clock.tick(Instant::now());
                imgui.io_mut().update_delta_time(delta);
                frame = next;
            }
            Event::RedrawRequested(_) => {
                let ui = imgui.frame();
                overlay(&ui, recipe.as_ref(), &frame);

                let gl_window = display.gl_window();
                let mut target = display.draw();
                target.clear_color_and_depth(recipe.clear_color(), 1.0);
                let drawn = recipe.draw(&mut target, &frame);

                platform.prepare_render(&ui, gl_window.window());
                let draw_data = ui.render();
                let overlaid = renderer
                    .render(&mut target, draw_data)
                    .map_err(|err| anyhow!("overlay render failed: {:?}", err));
                let finished = target
                    .finish()
                    .map_err(|err| anyhow!("failed to swap buffers: {:?}", err));

                if let Err(err) = drawn.and(overlaid).and(finished) {
                    error!("{:#}", err);
                    last_error = Some(err);
                    *control_flow = ControlFlow::Exit;
                }
            }
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                if let Some(look) = look.as_mut() {
                    look.apply(*delta);
                }
            }
            _ => {}
        }

        if input.update(&event) {
            if input.key_pressed(VirtualKeyCode::Escape) || input.quit() {
                *control_flow = ControlFlow::Exit;
                return;
            }
            frame.look_cursor = look.map(|look| look.position());
            recipe.update(&input, &frame);

            let gl_window = display.gl_window();
            if let Err(err) = platform.prepare_frame(imgui.io_mut(), gl_window.window()) {
                warn!("failed to prepare overlay frame: {}", err);
            }
            gl_window.window().request_redraw();
        }
    });

    match last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn overlay(ui: &Ui, recipe: &dyn Recipe, frame: &FrameTime) {
    ui.text(recipe.title());
    ui.text(format!("{:.1} fps ({:.2} ms)", frame.fps(), frame.delta * 1000.0));
    ui.separator();
    recipe.overlay(ui);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_measures_delta_and_elapsed() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start);
        let (frame, _) = clock.tick(start + Duration::from_millis(16));
        assert!((frame.delta - 0.016).abs() < 1e-6);
        let (frame, _) = clock.tick(start + Duration::from_millis(48));
        assert!((frame.delta - 0.032).abs() < 1e-6);
        assert!((frame.elapsed - 0.048).abs() < 1e-6);
    }

    #[test]
    fn clock_never_goes_backwards() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start + Duration::from_millis(10));
        let (frame, delta) = clock.tick(start);
        assert_eq!(frame.delta, 0.0);
        assert_eq!(delta, Duration::from_secs(0));
    }

    #[test]
    fn bootstrap_error_names_the_stage() {
        let err = BootstrapError::from_error("display", "no GL 3.3 context");
        assert_eq!(err.to_string(), "failed to initialize display: no GL 3.3 context");
        let err = BootstrapError::from_panic("event loop", Box::new("no DISPLAY"));
        assert_eq!(err.to_string(), "failed to initialize event loop: no DISPLAY");
    }

    #[test]
    fn look_cursor_follows_raw_motion() {
        let mut look = LookCursor::centered(800, 600);
        assert_eq!(look.position(), (400.0, 300.0));
        look.apply((12.0, -3.5));
        look.apply((-2.0, 0.5));
        assert_eq!(look.position(), (410.0, 297.0));
    }

    #[test]
    fn fps_of_idle_frame_is_zero() {
        assert_eq!(FrameTime::default().fps(), 0.0);
        let frame = FrameTime {
            delta: 0.02,
            elapsed: 1.0,
            ..FrameTime::default()
        };
        assert!((frame.fps() - 50.0).abs() < 1e-3);
    }
}
