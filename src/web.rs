#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use glam::Vec2;
use gloo_events::EventListener;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, Document, HtmlCanvasElement, HtmlElement, HtmlInputElement, KeyboardEvent};
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, Event, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::platform::web::{EventLoopExtWebSys, WindowBuilderExtWebSys};
use winit::window::{Window, WindowBuilder};

use crate::{
    Clock, Demo, DemoConfig, DemoEvent, PointerButton, Reaction, Renderer, SceneTextures,
    TextureData, Variant, Viewport,
};

const CANVAS_SELECTOR: &str = "canvas.webgl";

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}

/// Starts the demo on the page's `canvas.webgl` element.
///
/// Texture bytes are fetched by the host page; missing or undecodable images
/// fall back to a blank texture.
#[wasm_bindgen]
pub async fn run(
    variant: String,
    baked_shadow: Option<js_sys::Uint8Array>,
    simple_shadow: Option<js_sys::Uint8Array>,
    baked_plane: bool,
) -> Result<(), JsValue> {
    let variant: Variant = variant
        .parse()
        .map_err(|err| JsValue::from_str(&format!("{err}")))?;
    let config = DemoConfig {
        variant,
        baked_plane,
        ..DemoConfig::default()
    };
    let textures = SceneTextures {
        baked_shadow: texture_or_white("baked-shadow", baked_shadow),
        simple_shadow: texture_or_white("simple-shadow", simple_shadow),
    };

    let browser = web_sys::window().ok_or_else(|| JsValue::from_str("missing window"))?;
    let document = browser
        .document()
        .ok_or_else(|| JsValue::from_str("missing document"))?;
    let canvas: HtmlCanvasElement = document
        .query_selector(CANVAS_SELECTOR)?
        .ok_or_else(|| JsValue::from_str("canvas.webgl element not found"))?
        .dyn_into()
        .map_err(|_| JsValue::from_str("canvas.webgl is not a canvas"))?;

    let event_loop = EventLoop::new()
        .map_err(|err| JsValue::from_str(&format!("failed to create event loop: {err}")))?;
    let (width, height) = browser_size(&browser);
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_canvas(Some(canvas))
            .with_prevent_default(true)
            .with_inner_size(LogicalSize::new(width, height))
            .build(&event_loop)
            .map_err(|err| JsValue::from_str(&format!("window error: {err}")))?,
    );

    let viewport = Viewport::new(width, height, browser.device_pixel_ratio());
    let demo = Demo::new(&config, viewport, Clock::start());
    let mut renderer = Renderer::new(Arc::clone(&window), &demo.scene, &textures)
        .await
        .map_err(|err| JsValue::from_str(&format!("renderer error: {err:?}")))?;
    let (buffer_width, buffer_height) = demo.viewport.drawing_buffer_size();
    renderer.resize(buffer_width, buffer_height);

    let demo = Rc::new(RefCell::new(demo));
    let (inputs, mut listeners) = build_panel(&document, &demo)?;
    listeners.push(follow_browser_size(&browser, Arc::clone(&window)));
    listeners.push(listen_for_keys(&browser, Rc::clone(&demo), inputs.clone()));

    let mut app = WebAppState {
        renderer,
        demo,
        inputs,
        cursor: Vec2::ZERO,
        _listeners: listeners,
    };

    event_loop.spawn(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);
        if let Err(err) = app.process_event(&event, elwt) {
            log_to_console(&format!("Error: {err}"));
            elwt.exit();
        }
    });

    Ok(())
}

fn texture_or_white(label: &str, bytes: Option<js_sys::Uint8Array>) -> TextureData {
    let Some(bytes) = bytes else {
        log::warn!("no image supplied for {label}; using a blank texture instead");
        return TextureData::white(label);
    };
    match TextureData::from_bytes(label, &bytes.to_vec()) {
        Ok(texture) => texture,
        Err(err) => {
            log::warn!("{err}; using a blank texture instead");
            TextureData::white(label)
        }
    }
}

fn browser_size(browser: &web_sys::Window) -> (f64, f64) {
    let read = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
    (read(browser.inner_width()), read(browser.inner_height()))
}

/// Keeps the canvas the size of the browser window; winit reports the change
/// back as a regular resize event.
fn follow_browser_size(browser: &web_sys::Window, window: Arc<Window>) -> EventListener {
    let target = browser.clone();
    EventListener::new(browser, "resize", move |_| {
        let (width, height) = browser_size(&target);
        let _ = window.request_inner_size(LogicalSize::new(width, height));
    })
}

/// Key presses are taken from the whole window so the toggles keep working
/// while a panel slider has focus.
fn listen_for_keys(
    browser: &web_sys::Window,
    demo: Rc<RefCell<Demo>>,
    inputs: Vec<HtmlInputElement>,
) -> EventListener {
    EventListener::new(browser, "keydown", move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let reaction = demo.borrow_mut().key_down_named(&event.key());
        if reaction != Reaction::None {
            event.prevent_default();
        }
        if reaction == Reaction::PanelChanged {
            sync_panel(&demo.borrow(), &inputs);
        }
    })
}

/// Builds one range input per panel binding in a fixed overlay.
fn build_panel(
    document: &Document,
    demo: &Rc<RefCell<Demo>>,
) -> Result<(Vec<HtmlInputElement>, Vec<EventListener>), JsValue> {
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("missing document body"))?;
    let container: HtmlElement = document.create_element("div")?.dyn_into()?;
    container.set_class_name("shadow-lab-panel");
    let style = container.style();
    style.set_property("position", "fixed")?;
    style.set_property("top", "8px")?;
    style.set_property("right", "8px")?;
    style.set_property("padding", "8px")?;
    style.set_property("background", "rgba(26, 26, 26, 0.85)")?;
    style.set_property("color", "#eee")?;
    style.set_property("font", "11px sans-serif")?;

    let bindings = demo.borrow().panel.bindings().to_vec();
    let mut inputs = Vec::with_capacity(bindings.len());
    let mut listeners = Vec::with_capacity(bindings.len());
    for (index, binding) in bindings.iter().enumerate() {
        let row = document.create_element("label")?;
        row.set_attribute("style", "display: block")?;
        row.set_text_content(Some(binding.label));

        let input: HtmlInputElement = document.create_element("input")?.dyn_into()?;
        input.set_type("range");
        input.set_min(&binding.min.to_string());
        input.set_max(&binding.max.to_string());
        input.set_step(&binding.step.to_string());
        input.set_value(&binding.target.get(&demo.borrow().scene).to_string());

        let shared = Rc::clone(demo);
        let source = input.clone();
        listeners.push(EventListener::new(&input, "input", move |_| {
            let mut guard = shared.borrow_mut();
            let demo = &mut *guard;
            demo.panel
                .set(&mut demo.scene, index, source.value_as_number() as f32);
        }));

        row.append_child(&input)?;
        container.append_child(&row)?;
        inputs.push(input);
    }
    body.append_child(&container)?;
    Ok((inputs, listeners))
}

struct WebAppState {
    renderer: Renderer,
    demo: Rc<RefCell<Demo>>,
    inputs: Vec<HtmlInputElement>,
    cursor: Vec2,
    _listeners: Vec<EventListener>,
}

impl WebAppState {
    fn process_event(
        &mut self,
        event: &Event<()>,
        elwt: &EventLoopWindowTarget<()>,
    ) -> Result<(), String> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                        let window = self.renderer.window();
                        let scale = window.scale_factor();
                        let size = window.inner_size().to_logical::<f64>(scale);
                        self.dispatch(DemoEvent::Resized {
                            width: size.width,
                            height: size.height,
                            device_pixel_ratio: scale,
                        });
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        if let Some(button) = PointerButton::from_winit(*button) {
                            self.dispatch(match state {
                                ElementState::Pressed => DemoEvent::PointerDown {
                                    button,
                                    position: self.cursor,
                                },
                                ElementState::Released => DemoEvent::PointerUp { button },
                            });
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
                        let demo = self.demo.borrow();
                        if let Err(err) = self.renderer.render(&demo) {
                            match err {
                                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                                    self.renderer.reconfigure();
                                }
                                wgpu::SurfaceError::OutOfMemory => {
                                    return Err("GPU is out of memory".to_string());
                                }
                                wgpu::SurfaceError::Timeout => {
                                    log_to_console("Surface timeout; retrying next frame");
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

    fn dispatch(&mut self, event: DemoEvent) {
        let reaction = self.demo.borrow_mut().dispatch(event);
        match reaction {
            Reaction::ResizeSurface { width, height } => self.renderer.resize(width, height),
            Reaction::PanelChanged => sync_panel(&self.demo.borrow(), &self.inputs),
            Reaction::HelperToggled { .. } | Reaction::Draw | Reaction::None => {}
        }
    }

    fn logical_position(&self, position: PhysicalPosition<f64>) -> Vec2 {
        let logical = position.to_logical::<f64>(self.renderer.window().scale_factor());
        Vec2::new(logical.x as f32, logical.y as f32)
    }
}

/// Pushes keyboard-driven panel changes back into the range inputs.
fn sync_panel(demo: &Demo, inputs: &[HtmlInputElement]) {
    for (index, input) in inputs.iter().enumerate() {
        if let Some(value) = demo.panel.get(&demo.scene, index) {
            input.set_value(&value.to_string());
        }
    }
}

fn log_to_console(message: &str) {
    console::log_1(&JsValue::from_str(message));
}
