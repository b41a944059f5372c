//! Shadow-camera frustum helpers and the keys that toggle them.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::Variant;
use crate::input::Key;
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelperKind {
    Directional,
    Spot,
    Point,
}

impl HelperKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Directional => "directional",
            Self::Spot => "spot",
            Self::Point => "point",
        }
    }

    /// Line color used when drawing the helper.
    pub fn color(self) -> Vec3 {
        match self {
            Self::Directional => Vec3::new(1.0, 0.67, 0.0),
            Self::Spot => Vec3::new(0.2, 0.8, 1.0),
            Self::Point => Vec3::new(1.0, 0.3, 0.6),
        }
    }
}

/// Key-to-helper mapping for a variant. The two variants use different keys
/// for the directional helper and are kept as-is.
pub fn key_bindings(variant: Variant) -> &'static [(char, HelperKind)] {
    match variant {
        Variant::Realtime => &[('h', HelperKind::Directional)],
        Variant::Baked => &[
            ('d', HelperKind::Directional),
            ('s', HelperKind::Spot),
            ('p', HelperKind::Point),
        ],
    }
}

/// Two-state visibility per helper, starting hidden.
#[derive(Debug, Clone, PartialEq)]
pub struct HelperToggles {
    bindings: &'static [(char, HelperKind)],
    visible: Vec<(HelperKind, bool)>,
}

impl HelperToggles {
    pub fn new(variant: Variant) -> Self {
        let bindings = key_bindings(variant);
        Self {
            bindings,
            visible: bindings.iter().map(|(_, kind)| (*kind, false)).collect(),
        }
    }

    /// Flips the helper bound to `key`, returning it and its new visibility.
    pub fn handle_key(&mut self, key: Key) -> Option<(HelperKind, bool)> {
        let ch = key.as_char()?;
        let bindings = self.bindings;
        let (_, kind) = bindings.iter().find(|(bound, _)| *bound == ch)?;
        let entry = self.visible.iter_mut().find(|(k, _)| k == kind)?;
        entry.1 = !entry.1;
        Some(*entry)
    }

    pub fn is_visible(&self, kind: HelperKind) -> bool {
        self.visible
            .iter()
            .any(|(k, visible)| *k == kind && *visible)
    }

    pub fn helpers(&self) -> impl Iterator<Item = (HelperKind, bool)> + '_ {
        self.visible.iter().copied()
    }

    pub fn bindings(&self) -> &'static [(char, HelperKind)] {
        self.bindings
    }
}

/// Shadow camera view-projection for the light behind `kind`, if the scene has it.
pub fn shadow_view_projection(scene: &Scene, kind: HelperKind) -> Option<Mat4> {
    match kind {
        HelperKind::Directional => Some(scene.directional.shadow_view_projection()),
        HelperKind::Spot => scene.spot.as_ref().map(|spot| spot.shadow_view_projection()),
        HelperKind::Point => scene.point.as_ref().map(|point| point.shadow_view_projection()),
    }
}

/// Number of line-list vertices produced by [`frustum_lines`].
pub const FRUSTUM_LINE_VERTICES: usize = 24;

/// Wireframe edges of the volume that `view_projection` maps onto clip space.
pub fn frustum_lines(view_projection: Mat4) -> [Vec3; FRUSTUM_LINE_VERTICES] {
    let inverse = view_projection.inverse();
    let corner = |x: f32, y: f32, z: f32| inverse.project_point3(Vec3::new(x, y, z));
    // wgpu clip space: depth 0 at near, 1 at far
    let near = [
        corner(-1.0, -1.0, 0.0),
        corner(1.0, -1.0, 0.0),
        corner(1.0, 1.0, 0.0),
        corner(-1.0, 1.0, 0.0),
    ];
    let far = [
        corner(-1.0, -1.0, 1.0),
        corner(1.0, -1.0, 1.0),
        corner(1.0, 1.0, 1.0),
        corner(-1.0, 1.0, 1.0),
    ];

    let mut lines = [Vec3::ZERO; FRUSTUM_LINE_VERTICES];
    for i in 0..4 {
        let next = (i + 1) % 4;
        lines[i * 6] = near[i];
        lines[i * 6 + 1] = near[next];
        lines[i * 6 + 2] = far[i];
        lines[i * 6 + 3] = far[next];
        lines[i * 6 + 4] = near[i];
        lines[i * 6 + 5] = far[i];
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(toggles: &mut HelperToggles, ch: char, times: usize) {
        for _ in 0..times {
            toggles.handle_key(Key::Character(ch));
        }
    }

    #[test]
    fn helpers_start_hidden() {
        let toggles = HelperToggles::new(Variant::Baked);
        assert_eq!(toggles.helpers().count(), 3);
        assert!(toggles.helpers().all(|(_, visible)| !visible));
    }

    #[test]
    fn odd_presses_show_even_presses_hide() {
        let mut toggles = HelperToggles::new(Variant::Realtime);
        press(&mut toggles, 'h', 3);
        assert!(toggles.is_visible(HelperKind::Directional));
        press(&mut toggles, 'h', 1);
        assert!(!toggles.is_visible(HelperKind::Directional));
    }

    #[test]
    fn mappings_differ_per_variant() {
        let mut realtime = HelperToggles::new(Variant::Realtime);
        assert_eq!(realtime.handle_key(Key::Character('d')), None);

        let mut baked = HelperToggles::new(Variant::Baked);
        assert_eq!(baked.handle_key(Key::Character('h')), None);
        assert_eq!(
            baked.handle_key(Key::Character('d')),
            Some((HelperKind::Directional, true))
        );
        assert_eq!(
            baked.handle_key(Key::Character('p')),
            Some((HelperKind::Point, true))
        );
        assert!(!baked.is_visible(HelperKind::Spot));
    }

    #[test]
    fn uppercase_and_named_keys_are_ignored() {
        let mut toggles = HelperToggles::new(Variant::Realtime);
        assert_eq!(toggles.handle_key(Key::Character('H')), None);
        assert_eq!(
            toggles.handle_key(Key::Named(crate::input::NamedKey::Enter)),
            None
        );
        assert!(!toggles.is_visible(HelperKind::Directional));
    }

    #[test]
    fn orthographic_frustum_matches_its_bounds() {
        let projection = Mat4::orthographic_rh(-2.0, 2.0, -2.0, 2.0, 1.0, 6.0);
        let lines = frustum_lines(projection);
        for point in lines {
            assert!((point.x.abs() - 2.0).abs() < 1e-4);
            assert!((point.y.abs() - 2.0).abs() < 1e-4);
            let depth = -point.z;
            assert!((depth - 1.0).abs() < 1e-4 || (depth - 6.0).abs() < 1e-4);
        }
    }

    #[test]
    fn helpers_exist_only_for_lights_in_the_scene() {
        let realtime = Scene::assemble(Variant::Realtime);
        assert!(shadow_view_projection(&realtime, HelperKind::Directional).is_some());
        assert!(shadow_view_projection(&realtime, HelperKind::Spot).is_none());
        let baked = Scene::assemble(Variant::Baked);
        assert!(shadow_view_projection(&baked, HelperKind::Point).is_some());
    }
}
