//! Numeric scene fields exposed to the debug panel.

use serde::{Deserialize, Serialize};

use crate::scene::Scene;

/// Scene field a panel control writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamTarget {
    AmbientIntensity,
    DirectionalIntensity,
    DirectionalX,
    DirectionalY,
    DirectionalZ,
    Metalness,
    Roughness,
}

impl ParamTarget {
    fn field<'a>(self, scene: &'a mut Scene) -> &'a mut f32 {
        match self {
            Self::AmbientIntensity => &mut scene.ambient.intensity,
            Self::DirectionalIntensity => &mut scene.directional.intensity,
            Self::DirectionalX => &mut scene.directional.position.x,
            Self::DirectionalY => &mut scene.directional.position.y,
            Self::DirectionalZ => &mut scene.directional.position.z,
            Self::Metalness => &mut scene.material.metalness,
            Self::Roughness => &mut scene.material.roughness,
        }
    }

    pub fn get(self, scene: &Scene) -> f32 {
        match self {
            Self::AmbientIntensity => scene.ambient.intensity,
            Self::DirectionalIntensity => scene.directional.intensity,
            Self::DirectionalX => scene.directional.position.x,
            Self::DirectionalY => scene.directional.position.y,
            Self::DirectionalZ => scene.directional.position.z,
            Self::Metalness => scene.material.metalness,
            Self::Roughness => scene.material.roughness,
        }
    }
}

/// One registered control: target field, label and slider range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamBinding {
    pub target: ParamTarget,
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParamBinding {
    pub const fn new(
        target: ParamTarget,
        label: &'static str,
        min: f32,
        max: f32,
        step: f32,
    ) -> Self {
        Self {
            target,
            label,
            min,
            max,
            step,
        }
    }

    /// Snaps `value` to the step grid and clamps it to the range.
    pub fn constrain(&self, value: f32) -> f32 {
        let snapped = if self.step > 0.0 {
            (value / self.step).round() * self.step
        } else {
            value
        };
        snapped.clamp(self.min, self.max)
    }
}

const BINDINGS: &[ParamBinding] = &[
    ParamBinding::new(ParamTarget::AmbientIntensity, "ambient intensity", 0.0, 3.0, 0.001),
    ParamBinding::new(
        ParamTarget::DirectionalIntensity,
        "directional intensity",
        0.0,
        3.0,
        0.001,
    ),
    ParamBinding::new(ParamTarget::DirectionalX, "directional x", -5.0, 5.0, 0.001),
    ParamBinding::new(ParamTarget::DirectionalY, "directional y", -5.0, 5.0, 0.001),
    ParamBinding::new(ParamTarget::DirectionalZ, "directional z", -5.0, 5.0, 0.001),
    ParamBinding::new(ParamTarget::Metalness, "metalness", 0.0, 1.0, 0.001),
    ParamBinding::new(ParamTarget::Roughness, "roughness", 0.0, 1.0, 0.001),
];

/// Debug panel state: the registered bindings plus the keyboard selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamPanel {
    bindings: Vec<ParamBinding>,
    selected: usize,
}

impl Default for ParamPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamPanel {
    pub fn new() -> Self {
        Self {
            bindings: BINDINGS.to_vec(),
            selected: 0,
        }
    }

    pub fn bindings(&self) -> &[ParamBinding] {
        &self.bindings
    }

    pub fn selected(&self) -> Option<&ParamBinding> {
        self.bindings.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.bindings.is_empty() {
            self.selected = (self.selected + 1) % self.bindings.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.bindings.is_empty() {
            self.selected = (self.selected + self.bindings.len() - 1) % self.bindings.len();
        }
    }

    /// Writes `value` through binding `index`; returns the stored value.
    pub fn set(&self, scene: &mut Scene, index: usize, value: f32) -> Option<f32> {
        let binding = self.bindings.get(index)?;
        let value = binding.constrain(value);
        *binding.target.field(scene) = value;
        Some(value)
    }

    pub fn get(&self, scene: &Scene, index: usize) -> Option<f32> {
        self.bindings.get(index).map(|binding| binding.target.get(scene))
    }

    /// Moves the selected control by `steps` hundredths of its range.
    pub fn nudge_selected(&self, scene: &mut Scene, steps: i32) -> Option<f32> {
        let binding = self.selected()?;
        let increment = (binding.max - binding.min) / 100.0;
        let current = binding.target.get(scene);
        self.set(scene, self.selected, current + increment * steps as f32)
    }

    /// One-line summary of the selected control, e.g. for a window title.
    pub fn status_line(&self, scene: &Scene) -> String {
        match self.selected() {
            Some(binding) => format!("{} = {:.3}", binding.label, binding.target.get(scene)),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;

    fn index_of(panel: &ParamPanel, target: ParamTarget) -> usize {
        panel
            .bindings()
            .iter()
            .position(|binding| binding.target == target)
            .unwrap()
    }

    #[test]
    fn exposes_light_and_material_fields() {
        let panel = ParamPanel::new();
        let targets: Vec<_> = panel.bindings().iter().map(|b| b.target).collect();
        assert!(targets.contains(&ParamTarget::AmbientIntensity));
        assert!(targets.contains(&ParamTarget::Metalness));
        assert!(targets.contains(&ParamTarget::Roughness));
    }

    #[test]
    fn writes_are_clamped_and_snapped() {
        let panel = ParamPanel::new();
        let mut scene = Scene::assemble(Variant::Realtime);
        let roughness = index_of(&panel, ParamTarget::Roughness);
        assert_eq!(panel.set(&mut scene, roughness, 4.0), Some(1.0));
        assert_eq!(scene.material.roughness, 1.0);

        let x = index_of(&panel, ParamTarget::DirectionalX);
        let stored = panel.set(&mut scene, x, 1.23456).unwrap();
        assert!((stored - 1.235).abs() < 1e-4);
        assert_eq!(scene.directional.position.x, stored);
    }

    #[test]
    fn nudge_moves_selected_binding_and_wraps_selection() {
        let mut panel = ParamPanel::new();
        let mut scene = Scene::assemble(Variant::Realtime);
        panel.select_previous();
        assert_eq!(panel.selected().unwrap().target, ParamTarget::Roughness);
        let value = panel.nudge_selected(&mut scene, 10).unwrap();
        assert!((value - 0.8).abs() < 1e-4);
        panel.select_next();
        assert_eq!(panel.selected().unwrap().target, ParamTarget::AmbientIntensity);
        assert_eq!(panel.status_line(&scene), "ambient intensity = 1.000");
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let panel = ParamPanel::new();
        let mut scene = Scene::assemble(Variant::Baked);
        assert_eq!(panel.set(&mut scene, 99, 1.0), None);
        assert_eq!(panel.get(&scene, 99), None);
    }
}
