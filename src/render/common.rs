use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

use crate::camera::PerspectiveCamera;
use crate::helpers::{frustum_lines, shadow_view_projection, HelperToggles};
use crate::scene::{Material, Mesh, MeshMaterial, Scene, ShadowFilter};

/// Scene-wide uniform block shared by the mesh and line shaders.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub ambient: [f32; 4],
    pub directional_direction: [f32; 4],
    pub directional_color: [f32; 4],
    pub spot_position: [f32; 4],
    pub spot_direction: [f32; 4],
    pub spot_color: [f32; 4],
    pub spot_params: [f32; 4],
    pub point_position: [f32; 4],
    pub point_color: [f32; 4],
    pub point_params: [f32; 4],
    pub shadow_params: [f32; 4],
    pub shadow_bias: [f32; 4],
}

impl GlobalUniform {
    pub fn new(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let mut uniform = Self::zeroed();
        uniform.view_proj = camera.view_projection().to_cols_array_2d();
        uniform.camera_position = camera.position.extend(1.0).into();
        uniform.ambient = (scene.ambient.color * scene.ambient.intensity)
            .extend(1.0)
            .into();

        let directional = &scene.directional;
        let towards_light = (directional.position - directional.target).normalize_or_zero();
        uniform.directional_direction = towards_light.extend(directional.intensity).into();
        uniform.directional_color = directional.color.extend(1.0).into();
        uniform.light_view_proj = directional.shadow_view_projection().to_cols_array_2d();

        if let Some(spot) = scene.spot.as_ref() {
            let direction = (spot.target - spot.position).normalize_or_zero();
            let penumbra_cos = (spot.angle * (1.0 - spot.penumbra)).cos();
            uniform.spot_position = spot.position.extend(spot.intensity).into();
            uniform.spot_direction = direction.extend(spot.angle.cos()).into();
            uniform.spot_color = spot.color.extend(spot.distance).into();
            uniform.spot_params = [penumbra_cos, spot.decay, 0.0, 0.0];
        }

        if let Some(point) = scene.point.as_ref() {
            uniform.point_position = point.position.extend(point.intensity).into();
            uniform.point_color = point.color.extend(point.distance).into();
            uniform.point_params = [point.decay, 0.0, 0.0, 0.0];
        }

        let shadow = &directional.shadow;
        let enabled = scene.shadows.enabled && shadow.cast;
        uniform.shadow_params = [
            if enabled { 1.0 } else { 0.0 },
            1.0 / shadow.map_size.max(1) as f32,
            shadow.radius,
            match scene.shadows.filter {
                ShadowFilter::Pcf => 0.0,
                ShadowFilter::PcfSoft => 1.0,
            },
        ];
        uniform.shadow_bias = [shadow.bias + 0.0005, 0.0, 0.0, 0.0];
        uniform
    }
}

/// Per-mesh uniform block.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ObjectConstants {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub color: [f32; 4],
    /// roughness, metalness, receives shadow, unlit
    pub material: [f32; 4],
}

impl ObjectConstants {
    pub fn new(mesh: &Mesh, material: &Material) -> Self {
        let model = mesh.model_matrix();
        let normal = Mat3::from_mat4(model).inverse().transpose();
        let receive = if mesh.receive_shadow { 1.0 } else { 0.0 };
        let (color, material) = match mesh.material {
            MeshMaterial::Standard => (
                Vec3::ONE.extend(1.0),
                [material.roughness, material.metalness, receive, 0.0],
            ),
            MeshMaterial::ShadowProxy { color, opacity } => {
                (color.extend(opacity), [1.0, 0.0, receive, 1.0])
            }
        };
        Self {
            model: model.to_cols_array_2d(),
            normal: mat3_to_3x4(normal),
            color: color.into(),
            material,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ShadowUniform {
    pub light_view_proj: [[f32; 4]; 4],
}

impl ShadowUniform {
    pub fn new(light_view_proj: Mat4) -> Self {
        Self {
            light_view_proj: light_view_proj.to_cols_array_2d(),
        }
    }
}

/// Interleaved `position.xyz color.rgb` line vertices for every visible helper.
pub(crate) fn helper_line_vertices(scene: &Scene, toggles: &HelperToggles) -> Vec<f32> {
    let mut vertices = Vec::new();
    for (kind, visible) in toggles.helpers() {
        if !visible {
            continue;
        }
        let Some(view_proj) = shadow_view_projection(scene, kind) else {
            continue;
        };
        let color = kind.color();
        for point in frustum_lines(view_proj) {
            vertices.extend_from_slice(&point.to_array());
            vertices.extend_from_slice(&color.to_array());
        }
    }
    vertices
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;
    use crate::input::Key;

    fn camera() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0);
        camera.position = Vec3::new(1.0, 1.0, 2.0);
        camera
    }

    #[test]
    fn uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 2 * 64 + 13 * 16);
        assert_eq!(std::mem::size_of::<ObjectConstants>(), 64 + 48 + 16 + 16);
    }

    #[test]
    fn realtime_globals_enable_soft_shadows() {
        let scene = Scene::assemble(Variant::Realtime);
        let globals = GlobalUniform::new(&scene, &camera());
        assert_eq!(globals.shadow_params[0], 1.0);
        assert_eq!(globals.shadow_params[1], 1.0 / 1024.0);
        assert_eq!(globals.shadow_params[3], 1.0);
        assert_eq!(globals.spot_position[3], 0.0);
        assert_eq!(globals.directional_direction[3], 1.5);
    }

    #[test]
    fn baked_globals_disable_shadow_map_and_add_local_lights() {
        let scene = Scene::assemble(Variant::Baked);
        let globals = GlobalUniform::new(&scene, &camera());
        assert_eq!(globals.shadow_params[0], 0.0);
        assert!((globals.spot_position[3] - 3.6).abs() < 1e-6);
        assert!((globals.point_position[3] - 2.7).abs() < 1e-6);
    }

    #[test]
    fn shadow_proxy_is_unlit_and_carries_opacity() {
        let mut scene = Scene::assemble(Variant::Baked);
        if let Some(shadow) = scene.sphere_shadow.as_mut() {
            shadow.material = MeshMaterial::ShadowProxy {
                color: Vec3::ZERO,
                opacity: 0.25,
            };
        }
        let constants =
            ObjectConstants::new(scene.sphere_shadow.as_ref().unwrap(), &scene.material);
        assert_eq!(constants.color, [0.0, 0.0, 0.0, 0.25]);
        assert_eq!(constants.material[3], 1.0);

        let sphere = ObjectConstants::new(&scene.sphere, &scene.material);
        assert_eq!(sphere.material[0], 0.7);
    }

    #[test]
    fn only_visible_helpers_produce_lines() {
        let scene = Scene::assemble(Variant::Baked);
        let mut toggles = HelperToggles::new(Variant::Baked);
        assert!(helper_line_vertices(&scene, &toggles).is_empty());
        toggles.handle_key(Key::Character('s'));
        toggles.handle_key(Key::Character('p'));
        assert_eq!(helper_line_vertices(&scene, &toggles).len(), 2 * 24 * 6);
    }
}
