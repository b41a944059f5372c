use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{info, warn};
use pollster::block_on;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, Event, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::window::WindowBuilder;

use shadow_lab::{
    Clock, Demo, DemoConfig, DemoEvent, Key, PointerButton, Reaction, Renderer,
    SceneTextures, Variant, Viewport,
};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run() -> Result<()> {
    let Some(options) = CliOptions::parse(env::args().skip(1))? else {
        println!("{USAGE}");
        return Ok(());
    };
    let config = options.resolve_config()?;

    println!("Scene: {}", config.variant);

    if options.headless {
        run_headless(&config, &options)
    } else {
        match run_interactive(&config) {
            Ok(()) => Ok(()),
            Err(err) => {
                if err.downcast_ref::<WindowInitError>().is_some() {
                    eprintln!(
                        "{err}. Falling back to --headless mode (set DISPLAY or install X11 libs to enable rendering)."
                    );
                    run_headless(&config, &options)
                } else {
                    Err(err)
                }
            }
        }
    }
}

fn run_headless(config: &DemoConfig, options: &CliOptions) -> Result<()> {
    let viewport = Viewport::new(config.width as f64, config.height as f64, 1.0);
    let mut demo = Demo::new(config, viewport, Clock::manual());

    for key in press_sequence(&options.press) {
        demo.dispatch(DemoEvent::KeyDown(key));
    }
    for _ in 0..options.frames {
        demo.dispatch(DemoEvent::Frame);
        demo.clock_mut().advance(options.frame_time);
    }

    print_final_state(&demo);
    Ok(())
}

fn run_interactive(config: &DemoConfig) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(LogicalSize::new(config.width as f64, config.height as f64))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let textures = SceneTextures::load(&config.baked_shadow_texture, &config.simple_shadow_texture);
    let scale = window.scale_factor();
    let size = window.inner_size().to_logical::<f64>(scale);
    let mut demo = Demo::new(config, Viewport::new(size.width, size.height, scale), Clock::start());
    let mut renderer = block_on(Renderer::new(Arc::clone(&window), &demo.scene, &textures))?;
    let (width, height) = demo.viewport.drawing_buffer_size();
    renderer.resize(width, height);

    let mut app = AppState {
        title: config.title.clone(),
        demo,
        renderer,
        cursor: Vec2::ZERO,
        last_error: None,
    };
    app.refresh_title();

    event_loop
        .run(|event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);
            if let Err(err) = app.process_event(&event, elwt) {
                app.last_error = Some(err);
                elwt.exit();
            }
        })
        .context("event loop terminated abnormally")?;

    print_final_state(&app.demo);

    if let Some(err) = app.last_error {
        return Err(err);
    }

    Ok(())
}

struct AppState {
    title: String,
    demo: Demo,
    renderer: Renderer,
    /// Last cursor position in logical pixels.
    cursor: Vec2,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

impl AppState {
    fn process_event(&mut self, event: &Event<()>, elwt: &EventLoopWindowTarget<()>) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                        self.handle_resize();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state == ElementState::Pressed {
                            if let Some(key) = Key::from_winit(&event.logical_key) {
                                self.dispatch(DemoEvent::KeyDown(key));
                            }
                        }
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        if let Some(button) = PointerButton::from_winit(*button) {
                            let event = match state {
                                ElementState::Pressed => DemoEvent::PointerDown {
                                    button,
                                    position: self.cursor,
                                },
                                ElementState::Released => DemoEvent::PointerUp { button },
                            };
                            self.dispatch(event);
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        self.cursor = self.logical_position(*position);
                        self.dispatch(DemoEvent::PointerMove {
                            position: self.cursor,
                        });
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let delta_y = match delta {
                            MouseScrollDelta::LineDelta(_, y) => -*y,
                            MouseScrollDelta::PixelDelta(position) => -position.y as f32,
                        };
                        self.dispatch(DemoEvent::Wheel { delta_y });
                    }
                    WindowEvent::RedrawRequested => {
                        self.dispatch(DemoEvent::Frame);
                        if let Err(err) = self.renderer.render(&self.demo) {
                            match err {
                                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                                    self.renderer.reconfigure();
                                }
                                wgpu::SurfaceError::OutOfMemory => {
                                    return Err(anyhow!("GPU is out of memory"));
                                }
                                wgpu::SurfaceError::Timeout => {
                                    info!("Surface timeout; retrying next frame");
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_resize(&mut self) {
        let window = self.renderer.window();
        let scale = window.scale_factor();
        let size = window.inner_size().to_logical::<f64>(scale);
        self.dispatch(DemoEvent::Resized {
            width: size.width,
            height: size.height,
            device_pixel_ratio: scale,
        });
    }

    fn dispatch(&mut self, event: DemoEvent) {
        match self.demo.dispatch(event) {
            Reaction::ResizeSurface { width, height } => self.renderer.resize(width, height),
            Reaction::PanelChanged => self.refresh_title(),
            Reaction::HelperToggled { .. } | Reaction::Draw | Reaction::None => {}
        }
    }

    fn logical_position(&self, position: PhysicalPosition<f64>) -> Vec2 {
        let logical = position.to_logical::<f64>(self.renderer.window().scale_factor());
        Vec2::new(logical.x as f32, logical.y as f32)
    }

    /// Shows the selected debug-panel control in the window title.
    fn refresh_title(&self) {
        let status = self.demo.panel.status_line(&self.demo.scene);
        self.renderer
            .window()
            .set_title(&format!("{} | {status} (arrows to adjust)", self.title));
    }
}

fn print_final_state(demo: &Demo) {
    println!("Final state after {} frame(s):", demo.frames());
    for line in demo.summary() {
        println!("{line}");
    }
}

/// Keys replayed by `--press`: named keys separated by commas or spaces,
/// anything else one character per press.
fn press_sequence(keys: &str) -> Vec<Key> {
    let mut sequence = Vec::new();
    for token in keys.split([',', ' ']).filter(|token| !token.is_empty()) {
        match Key::from_name(token) {
            Some(key @ Key::Named(_)) if token.chars().count() > 1 => sequence.push(key),
            _ => sequence.extend(token.chars().map(Key::Character)),
        }
    }
    sequence
}

const USAGE: &str = "Usage: shadow-lab [--variant realtime|baked] [--config FILE] [--baked-plane] \
[--headless] [--frames N] [--frame-time SECS] [--press KEYS]";

struct CliOptions {
    variant: Option<Variant>,
    config: Option<PathBuf>,
    baked_plane: bool,
    headless: bool,
    frames: u32,
    frame_time: f64,
    press: String,
}

impl CliOptions {
    /// Returns `None` when help was requested.
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Self>> {
        let mut options = Self {
            variant: None,
            config: None,
            baked_plane: false,
            headless: false,
            frames: 1,
            frame_time: 1.0 / 60.0,
            press: String::new(),
        };
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--variant" => {
                    let value = next_value(&mut args, &arg)?;
                    options.variant = Some(value.parse()?);
                }
                "--config" => options.config = Some(next_value(&mut args, &arg)?.into()),
                "--baked-plane" => options.baked_plane = true,
                "--headless" => options.headless = true,
                "--frames" => {
                    let value = next_value(&mut args, &arg)?;
                    options.frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count: {value}"))?;
                }
                "--frame-time" => {
                    let value = next_value(&mut args, &arg)?;
                    options.frame_time = value
                        .parse()
                        .with_context(|| format!("invalid frame time: {value}"))?;
                }
                "--press" => options.press = next_value(&mut args, &arg)?,
                "-h" | "--help" => return Ok(None),
                other => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
            }
        }
        Ok(Some(options))
    }

    /// Loads the optional config file and layers the CLI flags on top.
    fn resolve_config(&self) -> Result<DemoConfig> {
        let mut config = match &self.config {
            Some(path) => DemoConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => DemoConfig::default(),
        };
        if let Some(variant) = self.variant {
            config.variant = variant;
        }
        if self.baked_plane {
            config.baked_plane = true;
        }
        if config.baked_plane && config.variant == Variant::Realtime {
            warn!("--baked-plane paints the baked shadow onto the realtime scene as well");
        }
        config.validate()?;
        Ok(config)
    }
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("Missing value for {flag}. {USAGE}"))
}
