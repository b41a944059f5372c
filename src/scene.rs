use std::f32::consts::PI;

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::Variant;
use crate::geometry::Geometry;

/// Projection of a light's shadow camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShadowCamera {
    Orthographic {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    },
    Perspective {
        /// Vertical field of view in degrees.
        fov: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
}

impl ShadowCamera {
    pub fn projection(&self) -> Mat4 {
        match *self {
            Self::Orthographic {
                left,
                right,
                top,
                bottom,
                near,
                far,
            } => Mat4::orthographic_rh(left, right, bottom, top, near, far),
            Self::Perspective {
                fov,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(fov.to_radians(), aspect, near, far),
        }
    }

    pub fn set_near_far(&mut self, new_near: f32, new_far: f32) {
        match self {
            Self::Orthographic { near, far, .. } | Self::Perspective { near, far, .. } => {
                *near = new_near;
                *far = new_far;
            }
        }
    }
}

/// Shadow configuration of a shadow-casting light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightShadow {
    pub cast: bool,
    /// Square shadow map resolution in texels.
    pub map_size: u32,
    /// Filter radius in texels, honoured by [`ShadowFilter::Pcf`] only.
    pub radius: f32,
    pub bias: f32,
    pub camera: ShadowCamera,
}

impl LightShadow {
    fn new(camera: ShadowCamera) -> Self {
        Self {
            cast: false,
            map_size: 512,
            radius: 1.0,
            bias: 0.0,
            camera,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub shadow: LightShadow,
}

impl DirectionalLight {
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            position: Vec3::Y,
            target: Vec3::ZERO,
            shadow: LightShadow::new(ShadowCamera::Orthographic {
                left: -5.0,
                right: 5.0,
                top: 5.0,
                bottom: -5.0,
                near: 0.5,
                far: 500.0,
            }),
        }
    }

    pub fn shadow_view_projection(&self) -> Mat4 {
        self.shadow.camera.projection() * look_at(self.position, self.target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotLight {
    pub color: Vec3,
    pub intensity: f32,
    /// Range of the light; zero means unlimited.
    pub distance: f32,
    /// Half-angle of the cone in radians.
    pub angle: f32,
    pub penumbra: f32,
    pub decay: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub shadow: LightShadow,
}

impl SpotLight {
    pub fn new(color: Vec3, intensity: f32, distance: f32, angle: f32) -> Self {
        Self {
            color,
            intensity,
            distance,
            angle,
            penumbra: 0.0,
            decay: 2.0,
            position: Vec3::Y,
            target: Vec3::ZERO,
            shadow: LightShadow::new(ShadowCamera::Perspective {
                fov: (angle * 2.0).to_degrees(),
                aspect: 1.0,
                near: 0.5,
                far: 500.0,
            }),
        }
    }

    pub fn shadow_view_projection(&self) -> Mat4 {
        self.shadow.camera.projection() * look_at(self.position, self.target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub color: Vec3,
    pub intensity: f32,
    pub distance: f32,
    pub decay: f32,
    pub position: Vec3,
    pub shadow: LightShadow,
}

impl PointLight {
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            distance: 0.0,
            decay: 2.0,
            position: Vec3::ZERO,
            shadow: LightShadow::new(ShadowCamera::Perspective {
                fov: 90.0,
                aspect: 1.0,
                near: 0.5,
                far: 500.0,
            }),
        }
    }

    /// View-projection of the last cube face rendered (looking down -Y).
    pub fn shadow_view_projection(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, self.position - Vec3::Y, Vec3::Z);
        self.shadow.camera.projection() * view
    }
}

fn look_at(eye: Vec3, target: Vec3) -> Mat4 {
    let forward = (target - eye).normalize_or_zero();
    let up = if forward.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    Mat4::look_at_rh(eye, target, up)
}

/// Standard material shared by every lit mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

/// How a mesh is shaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MeshMaterial {
    /// The scene's shared [`Material`].
    Standard,
    /// Unlit, transparent color, e.g. the fake shadow under the sphere.
    ShadowProxy { color: Vec3, opacity: f32 },
}

/// Image a mesh samples in addition to its material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceMap {
    None,
    /// Baked shadow texture as the color map.
    BakedShadow,
    /// Soft shadow texture as the alpha map.
    SimpleShadowAlpha,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub geometry: Geometry,
    pub material: MeshMaterial,
    pub map: SurfaceMap,
    pub position: Vec3,
    /// Euler XYZ rotation in radians.
    pub rotation: Vec3,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(name: &str, geometry: Geometry) -> Self {
        Self {
            name: name.to_string(),
            geometry,
            material: MeshMaterial::Standard,
            map: SurfaceMap::None,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_rotation_translation(rotation, self.position)
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self.material, MeshMaterial::ShadowProxy { .. })
    }
}

/// Filtering applied when sampling a shadow map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadowFilter {
    /// Percentage-closer filtering widened by the light's shadow radius.
    Pcf,
    /// Fixed-footprint soft filtering; the shadow radius is ignored.
    PcfSoft,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowSettings {
    pub enabled: bool,
    pub filter: ShadowFilter,
}

/// Every object of the demo, constructed once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub variant: Variant,
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub spot: Option<SpotLight>,
    pub point: Option<PointLight>,
    pub material: Material,
    pub sphere: Mesh,
    pub plane: Mesh,
    /// Alpha-mapped plane that follows the sphere.
    pub sphere_shadow: Option<Mesh>,
    pub shadows: ShadowSettings,
}

pub const GROUND_Y: f32 = -0.5;

impl Scene {
    pub fn assemble(variant: Variant) -> Self {
        match variant {
            Variant::Realtime => Self::realtime(),
            Variant::Baked => Self::baked(),
        }
    }

    fn realtime() -> Self {
        let mut directional = DirectionalLight::new(Vec3::ONE, 1.5);
        directional.position = Vec3::new(2.0, 2.0, -1.0);
        directional.shadow.cast = true;
        directional.shadow.map_size = 1024;
        directional.shadow.camera = ShadowCamera::Orthographic {
            left: -2.0,
            right: 2.0,
            top: 2.0,
            bottom: -2.0,
            near: 1.0,
            far: 6.0,
        };
        directional.shadow.radius = 10.0;

        let mut sphere = sphere_mesh();
        sphere.cast_shadow = true;
        let mut plane = ground_mesh();
        plane.receive_shadow = true;

        Self {
            variant: Variant::Realtime,
            ambient: AmbientLight {
                color: Vec3::ONE,
                intensity: 1.0,
            },
            directional,
            spot: None,
            point: None,
            material: Material {
                roughness: 0.7,
                metalness: 0.0,
            },
            sphere,
            plane,
            sphere_shadow: None,
            shadows: ShadowSettings {
                enabled: true,
                filter: ShadowFilter::PcfSoft,
            },
        }
    }

    fn baked() -> Self {
        let mut directional = DirectionalLight::new(Vec3::ONE, 0.3);
        directional.position = Vec3::new(2.0, 2.0, -1.0);
        directional.shadow.cast = true;
        directional.shadow.map_size = 1024;
        directional.shadow.camera = ShadowCamera::Orthographic {
            left: -2.0,
            right: 2.0,
            top: 2.0,
            bottom: -2.0,
            near: 1.0,
            far: 6.0,
        };

        let mut spot = SpotLight::new(Vec3::ONE, 3.6, 10.0, PI * 0.3);
        spot.position = Vec3::new(0.0, 2.0, 2.0);
        spot.shadow.cast = true;
        spot.shadow.map_size = 1024;
        spot.shadow.camera.set_near_far(1.0, 6.0);

        let mut point = PointLight::new(Vec3::ONE, 2.7);
        point.position = Vec3::new(-1.0, 1.0, 0.0);
        point.shadow.cast = true;
        point.shadow.map_size = 1024;
        point.shadow.camera.set_near_far(0.1, 5.0);

        let mut sphere = sphere_mesh();
        sphere.cast_shadow = true;
        let mut plane = ground_mesh();
        plane.receive_shadow = true;

        let mut sphere_shadow = Mesh::new(
            "sphere-shadow",
            Geometry::Plane {
                width: 1.5,
                height: 1.5,
            },
        );
        sphere_shadow.material = MeshMaterial::ShadowProxy {
            color: Vec3::ZERO,
            opacity: 1.0,
        };
        sphere_shadow.map = SurfaceMap::SimpleShadowAlpha;
        sphere_shadow.rotation.x = -PI * 0.5;
        sphere_shadow.position.y = GROUND_Y + 0.01;

        Self {
            variant: Variant::Baked,
            ambient: AmbientLight {
                color: Vec3::ONE,
                intensity: 0.3,
            },
            directional,
            spot: Some(spot),
            point: Some(point),
            material: Material {
                roughness: 0.7,
                metalness: 0.0,
            },
            sphere,
            plane,
            sphere_shadow: Some(sphere_shadow),
            shadows: ShadowSettings {
                enabled: false,
                filter: ShadowFilter::PcfSoft,
            },
        }
    }

    /// Whether the per-frame hop animation drives the sphere.
    pub fn is_animated(&self) -> bool {
        self.sphere_shadow.is_some()
    }

    /// Meshes in draw order: opaque first, then transparent.
    pub fn meshes(&self) -> Vec<&Mesh> {
        let mut meshes: Vec<&Mesh> = [Some(&self.sphere), Some(&self.plane)]
            .into_iter()
            .chain(std::iter::once(self.sphere_shadow.as_ref()))
            .flatten()
            .collect();
        meshes.sort_by_key(|mesh| mesh.is_transparent());
        meshes
    }

    pub fn shadow_casters(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes().into_iter().filter(|mesh| mesh.cast_shadow)
    }
}

fn sphere_mesh() -> Mesh {
    Mesh::new(
        "sphere",
        Geometry::Sphere {
            radius: 0.5,
            width_segments: 32,
            height_segments: 32,
        },
    )
}

fn ground_mesh() -> Mesh {
    let mut plane = Mesh::new(
        "plane",
        Geometry::Plane {
            width: 5.0,
            height: 5.0,
        },
    );
    plane.rotation.x = -PI * 0.5;
    plane.position.y = GROUND_Y;
    plane
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realtime_scene_casts_onto_the_ground() {
        let scene = Scene::assemble(Variant::Realtime);
        assert!(scene.shadows.enabled);
        assert!(scene.directional.shadow.cast);
        assert_eq!(scene.directional.shadow.map_size, 1024);
        assert!(scene.sphere.cast_shadow);
        assert!(scene.plane.receive_shadow);
        assert!(!scene.is_animated());
        assert!(scene.spot.is_none() && scene.point.is_none());
    }

    #[test]
    fn baked_scene_has_fake_shadow_drawn_last() {
        let scene = Scene::assemble(Variant::Baked);
        assert!(!scene.shadows.enabled);
        assert!(scene.is_animated());
        let names: Vec<_> = scene.meshes().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["sphere", "plane", "sphere-shadow"]);
        let shadow = scene.sphere_shadow.as_ref().unwrap();
        assert!(shadow.position.y > scene.plane.position.y);
        assert_eq!(shadow.map, SurfaceMap::SimpleShadowAlpha);
    }

    #[test]
    fn ground_plane_is_rotated_to_face_up() {
        let scene = Scene::assemble(Variant::Realtime);
        let normal = scene.plane.model_matrix().transform_vector3(Vec3::Z);
        assert!((normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn directional_shadow_camera_sees_the_origin() {
        let scene = Scene::assemble(Variant::Realtime);
        let clip = scene.directional.shadow_view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn spot_shadow_fov_spans_the_cone() {
        let scene = Scene::assemble(Variant::Baked);
        let spot = scene.spot.unwrap();
        match spot.shadow.camera {
            ShadowCamera::Perspective { fov, near, far, .. } => {
                assert!((fov - 108.0).abs() < 1e-3);
                assert_eq!((near, far), (1.0, 6.0));
            }
            ShadowCamera::Orthographic { .. } => panic!("spot light needs a perspective camera"),
        }
    }
}
