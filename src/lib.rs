//! Shadow Lab: a small scene for comparing shadow techniques.
//!
//! A sphere sits above a ground plane and is lit either with a real-time
//! directional shadow map or with cheap substitutes (a baked shadow texture
//! and an alpha-mapped plane that follows a hopping sphere). Scene state,
//! input handling and animation live in plain modules so they can be driven
//! headlessly; [`render`] owns everything that touches the GPU.

pub mod animation;
pub mod app;
pub mod camera;
pub mod config;
pub mod controls;
pub mod geometry;
pub mod helpers;
pub mod input;
pub mod panel;
pub mod render;
pub mod scene;
pub mod texture;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use animation::{Clock, HopFrame};
pub use app::{Demo, DemoEvent, Reaction, Viewport};
pub use camera::PerspectiveCamera;
pub use config::{ConfigError, DemoConfig, Variant};
pub use controls::OrbitControls;
pub use helpers::{HelperKind, HelperToggles};
pub use input::{Key, NamedKey, PointerButton};
pub use panel::{ParamBinding, ParamPanel, ParamTarget};
pub use render::Renderer;
pub use scene::Scene;
pub use texture::{SceneTextures, TextureData, TextureError};
