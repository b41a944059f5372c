use glam::{Vec2, Vec3};
use log::{debug, info};

use crate::animation::{Clock, HopFrame};
use crate::camera::PerspectiveCamera;
use crate::config::DemoConfig;
use crate::controls::OrbitControls;
use crate::helpers::{HelperKind, HelperToggles};
use crate::input::{Key, NamedKey, PointerButton};
use crate::panel::ParamPanel;
use crate::scene::{MeshMaterial, Scene, SurfaceMap};

/// Largest device pixel ratio the renderer will honour.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Logical viewport size plus the pixel ratio used for the drawing buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    /// A ratio that is not a finite number falls back to 1.
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        let pixel_ratio = if device_pixel_ratio.is_finite() {
            device_pixel_ratio.clamp(f64::MIN_POSITIVE, MAX_PIXEL_RATIO)
        } else {
            1.0
        };
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height <= 0.0 {
            1.0
        } else {
            (self.width / self.height) as f32
        }
    }

    /// Size in physical pixels of the buffer the renderer draws into.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        (
            (self.width * self.pixel_ratio).round().max(0.0) as u32,
            (self.height * self.pixel_ratio).round().max(0.0) as u32,
        )
    }
}

/// External events routed through [`Demo::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DemoEvent {
    Resized {
        width: f64,
        height: f64,
        device_pixel_ratio: f64,
    },
    KeyDown(Key),
    PointerDown {
        button: PointerButton,
        position: Vec2,
    },
    PointerMove {
        position: Vec2,
    },
    PointerUp {
        button: PointerButton,
    },
    /// Wheel delta in DOM convention: negative scrolls towards the scene.
    Wheel {
        delta_y: f32,
    },
    Frame,
}

/// What the host should do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    None,
    /// The drawing buffer must be resized to the new viewport.
    ResizeSurface { width: u32, height: u32 },
    /// A debug-panel value or the selection changed.
    PanelChanged,
    HelperToggled { kind: HelperKind, visible: bool },
    /// Scene state for this frame is ready to draw.
    Draw,
}

/// The single context owned by the event loop.
#[derive(Debug, Clone)]
pub struct Demo {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub toggles: HelperToggles,
    pub panel: ParamPanel,
    pub viewport: Viewport,
    clock: Clock,
    frames: u64,
}

impl Demo {
    pub fn new(config: &DemoConfig, viewport: Viewport, clock: Clock) -> Self {
        let mut scene = Scene::assemble(config.variant);
        if config.baked_plane {
            scene.plane.map = SurfaceMap::BakedShadow;
        }

        let mut camera = PerspectiveCamera::new(75.0, viewport.aspect(), 0.1, 100.0);
        camera.position = Vec3::new(1.0, 1.0, 2.0);

        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.enable_damping = true;
        controls.damping_factor = config.damping_factor;
        camera.look_at(controls.target);

        info!(
            "Assembled {} scene ({} meshes, shadows {})",
            config.variant,
            scene.meshes().len(),
            if scene.shadows.enabled { "on" } else { "off" }
        );

        Self {
            scene,
            camera,
            controls,
            toggles: HelperToggles::new(config.variant),
            panel: ParamPanel::new(),
            viewport,
            clock,
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    pub fn dispatch(&mut self, event: DemoEvent) -> Reaction {
        match event {
            DemoEvent::Resized {
                width,
                height,
                device_pixel_ratio,
            } => self.resize(width, height, device_pixel_ratio),
            DemoEvent::KeyDown(key) => self.key_down(key),
            DemoEvent::PointerDown { button, position } => {
                self.controls.pointer_down(button, position);
                Reaction::None
            }
            DemoEvent::PointerMove { position } => {
                self.controls
                    .pointer_move(position, self.viewport.height as f32, &self.camera);
                Reaction::None
            }
            DemoEvent::PointerUp { .. } => {
                self.controls.pointer_up();
                Reaction::None
            }
            DemoEvent::Wheel { delta_y } => {
                self.controls.wheel(delta_y);
                Reaction::None
            }
            DemoEvent::Frame => {
                self.frame();
                Reaction::Draw
            }
        }
    }

    /// Handles a key-down reported by DOM name (`KeyboardEvent.key`).
    pub fn key_down_named(&mut self, name: &str) -> Reaction {
        match Key::from_name(name) {
            Some(key) => self.dispatch(DemoEvent::KeyDown(key)),
            None => Reaction::None,
        }
    }

    fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> Reaction {
        self.viewport = Viewport::new(width, height, device_pixel_ratio);
        self.camera.set_aspect(self.viewport.aspect());
        let (width, height) = self.viewport.drawing_buffer_size();
        debug!("Viewport resized to {width}x{height}");
        Reaction::ResizeSurface { width, height }
    }

    fn key_down(&mut self, key: Key) -> Reaction {
        if let Some((kind, visible)) = self.toggles.handle_key(key) {
            info!(
                "{} shadow camera helper {}",
                kind.label(),
                if visible { "shown" } else { "hidden" }
            );
            return Reaction::HelperToggled { kind, visible };
        }
        match key {
            Key::Named(NamedKey::ArrowUp) => self.panel.select_previous(),
            Key::Named(NamedKey::ArrowDown) => self.panel.select_next(),
            Key::Named(NamedKey::ArrowLeft) => {
                self.panel.nudge_selected(&mut self.scene, -1);
            }
            Key::Named(NamedKey::ArrowRight) => {
                self.panel.nudge_selected(&mut self.scene, 1);
            }
            _ => return Reaction::None,
        }
        Reaction::PanelChanged
    }

    /// Per-frame update: animation, fake shadow, controller damping.
    fn frame(&mut self) {
        let elapsed = self.clock.elapsed() as f32;
        if self.scene.is_animated() {
            let hop = HopFrame::at(elapsed);
            self.scene.sphere.position = hop.sphere;
            if let Some(shadow) = self.scene.sphere_shadow.as_mut() {
                shadow.position.x = hop.shadow_xz.0;
                shadow.position.z = hop.shadow_xz.1;
                if let MeshMaterial::ShadowProxy { opacity, .. } = &mut shadow.material {
                    *opacity = hop.shadow_opacity;
                }
            }
        }
        self.controls.update(&mut self.camera);
        self.frames += 1;
    }

    /// Current opacity of the fake shadow, if the scene has one.
    pub fn shadow_opacity(&self) -> Option<f32> {
        match self.scene.sphere_shadow.as_ref()?.material {
            MeshMaterial::ShadowProxy { opacity, .. } => Some(opacity),
            MeshMaterial::Standard => None,
        }
    }

    /// Human-readable snapshot printed at the end of a run.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let sphere = self.scene.sphere.position;
        lines.push(format!(
            " - sphere pos=({:.2}, {:.2}, {:.2})",
            sphere.x, sphere.y, sphere.z
        ));
        if let (Some(shadow), Some(opacity)) =
            (self.scene.sphere_shadow.as_ref(), self.shadow_opacity())
        {
            lines.push(format!(
                " - sphere-shadow pos=({:.2}, {:.2}) opacity={:.2}",
                shadow.position.x, shadow.position.z, opacity
            ));
        }
        for (kind, visible) in self.toggles.helpers() {
            lines.push(format!(
                " - {} helper {}",
                kind.label(),
                if visible { "visible" } else { "hidden" }
            ));
        }
        let camera = self.camera.position;
        lines.push(format!(
            " - camera pos=({:.2}, {:.2}, {:.2}) aspect={:.3}",
            camera.x, camera.y, camera.z, self.camera.aspect
        ));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn demo(variant: Variant) -> Demo {
        let config = DemoConfig {
            variant,
            ..DemoConfig::default()
        };
        Demo::new(&config, Viewport::new(800.0, 600.0, 1.0), Clock::manual())
    }

    #[test]
    fn resize_updates_aspect_and_caps_pixel_ratio() {
        let mut demo = demo(Variant::Realtime);
        let reaction = demo.dispatch(DemoEvent::Resized {
            width: 1000.0,
            height: 500.0,
            device_pixel_ratio: 3.0,
        });
        assert_eq!(
            reaction,
            Reaction::ResizeSurface {
                width: 2000,
                height: 1000
            }
        );
        assert_relative_eq!(demo.camera.aspect, 2.0);
        assert_eq!((demo.viewport.width, demo.viewport.height), (1000.0, 500.0));
        assert_eq!(demo.viewport.pixel_ratio, 2.0);
    }

    #[test]
    fn unusable_pixel_ratio_falls_back_to_one() {
        let mut demo = demo(Variant::Realtime);
        let reaction = demo.dispatch(DemoEvent::Resized {
            width: 800.0,
            height: 400.0,
            device_pixel_ratio: f64::NAN,
        });
        assert_eq!(
            reaction,
            Reaction::ResizeSurface {
                width: 800,
                height: 400
            }
        );
        assert_eq!(demo.viewport.pixel_ratio, 1.0);
        assert_eq!(Viewport::new(10.0, 10.0, f64::INFINITY).pixel_ratio, 1.0);
    }

    #[test]
    fn repeated_identical_resizes_are_idempotent() {
        let mut demo = demo(Variant::Baked);
        let event = DemoEvent::Resized {
            width: 640.0,
            height: 480.0,
            device_pixel_ratio: 1.5,
        };
        let first = demo.dispatch(event);
        let projection = demo.camera.projection_matrix();
        assert_eq!(demo.dispatch(event), first);
        assert_eq!(demo.camera.projection_matrix(), projection);
    }

    #[test]
    fn frames_move_the_sphere_and_its_fake_shadow() {
        let mut demo = demo(Variant::Baked);
        assert_eq!(demo.dispatch(DemoEvent::Frame), Reaction::Draw);
        assert_eq!(demo.scene.sphere.position, Vec3::new(1.5, 0.0, 0.0));
        assert_relative_eq!(demo.shadow_opacity().unwrap(), 0.3);

        demo.clock_mut().advance(FRAC_PI_2);
        demo.dispatch(DemoEvent::Frame);
        let sphere = demo.scene.sphere.position;
        let shadow = demo.scene.sphere_shadow.as_ref().unwrap().position;
        assert_eq!((shadow.x, shadow.z), (sphere.x, sphere.z));
        assert_relative_eq!(sphere.y, 1.0, epsilon = 1e-5);
        assert!(demo.shadow_opacity().unwrap().abs() < 1e-5);
        assert_eq!(demo.frames(), 2);
    }

    #[test]
    fn realtime_sphere_stays_put() {
        let mut demo = demo(Variant::Realtime);
        demo.clock_mut().advance(1.0);
        demo.dispatch(DemoEvent::Frame);
        assert_eq!(demo.scene.sphere.position, Vec3::ZERO);
        assert_eq!(demo.shadow_opacity(), None);
    }

    #[test]
    fn keys_toggle_helpers_and_drive_the_panel() {
        let mut demo = demo(Variant::Realtime);
        assert_eq!(
            demo.dispatch(DemoEvent::KeyDown(Key::Character('h'))),
            Reaction::HelperToggled {
                kind: HelperKind::Directional,
                visible: true
            }
        );
        assert_eq!(
            demo.dispatch(DemoEvent::KeyDown(Key::Named(NamedKey::ArrowRight))),
            Reaction::PanelChanged
        );
        assert_relative_eq!(demo.scene.ambient.intensity, 1.03, epsilon = 1e-4);
        assert_eq!(
            demo.dispatch(DemoEvent::KeyDown(Key::Character('x'))),
            Reaction::None
        );
    }

    #[test]
    fn dom_key_names_reach_toggles_and_panel() {
        let mut demo = demo(Variant::Baked);
        assert_eq!(
            demo.key_down_named("p"),
            Reaction::HelperToggled {
                kind: HelperKind::Point,
                visible: true
            }
        );
        assert_eq!(demo.key_down_named("ArrowDown"), Reaction::PanelChanged);
        assert_eq!(demo.key_down_named("Unidentified"), Reaction::None);
        assert_eq!(demo.key_down_named("h"), Reaction::None);
    }

    #[test]
    fn camera_starts_looking_at_the_origin() {
        let mut demo = demo(Variant::Realtime);
        demo.dispatch(DemoEvent::Frame);
        assert_relative_eq!(demo.camera.position.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(demo.camera.position.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(demo.camera.position.z, 2.0, epsilon = 1e-5);
        assert_eq!(demo.camera.target, Vec3::ZERO);
    }

    #[test]
    fn baked_plane_option_maps_the_ground() {
        let config = DemoConfig {
            variant: Variant::Baked,
            baked_plane: true,
            ..DemoConfig::default()
        };
        let demo = Demo::new(&config, Viewport::new(1.0, 1.0, 1.0), Clock::manual());
        assert_eq!(demo.scene.plane.map, SurfaceMap::BakedShadow);
    }
}
