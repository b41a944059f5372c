//! Orbit controller that rotates, pans and dollies a camera around a target.

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec2, Vec3};

use crate::camera::PerspectiveCamera;
use crate::input::PointerButton;

const EPS: f32 = 0.000_001;

/// Spherical coordinates with the polar angle measured from +Y.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spherical {
    pub radius: f32,
    /// Polar angle from the +Y axis.
    pub phi: f32,
    /// Azimuth around +Y, measured from +Z towards +X.
    pub theta: f32,
}

impl Spherical {
    pub fn from_vec3(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_vec3(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Rotate,
    Dolly,
    Pan,
}

/// Inertial orbit controls for a [`PerspectiveCamera`].
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    spherical_delta: Spherical,
    pan_offset: Vec3,
    scale: f32,
    drag: Option<DragMode>,
    last_pointer: Option<Vec2>,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            spherical_delta: Spherical::default(),
            pan_offset: Vec3::ZERO,
            scale: 1.0,
            drag: None,
            last_pointer: None,
        }
    }
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn pointer_down(&mut self, button: PointerButton, position: Vec2) {
        self.drag = match button {
            PointerButton::Primary => Some(DragMode::Rotate),
            PointerButton::Auxiliary => Some(DragMode::Dolly),
            PointerButton::Secondary => Some(DragMode::Pan),
        };
        self.last_pointer = Some(position);
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
        self.last_pointer = None;
    }

    /// Handles pointer motion in logical pixels over a viewport of `viewport_height`.
    pub fn pointer_move(
        &mut self,
        position: Vec2,
        viewport_height: f32,
        camera: &PerspectiveCamera,
    ) {
        let Some(mode) = self.drag else {
            return;
        };
        let Some(last) = self.last_pointer.replace(position) else {
            return;
        };
        let delta = position - last;
        let height = viewport_height.max(1.0);
        match mode {
            DragMode::Rotate => {
                self.rotate_left(TAU * delta.x / height * self.rotate_speed);
                self.rotate_up(TAU * delta.y / height * self.rotate_speed);
            }
            // Dragging down moves away, like scrolling away from the user.
            DragMode::Dolly => self.wheel(delta.y),
            DragMode::Pan => self.pan(delta * self.pan_speed, height, camera),
        }
    }

    /// Handles a wheel event using the DOM sign convention (positive is away from the user).
    pub fn wheel(&mut self, delta_y: f32) {
        let zoom_scale = 0.95_f32.powf(self.zoom_speed);
        if delta_y < 0.0 {
            self.scale *= zoom_scale;
        } else if delta_y > 0.0 {
            self.scale /= zoom_scale;
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    fn pan(&mut self, delta: Vec2, viewport_height: f32, camera: &PerspectiveCamera) {
        let offset = camera.position - self.target;
        let target_distance = offset.length() * (camera.fov.to_radians() / 2.0).tan();
        let camera_matrix = Mat4::look_at_rh(camera.position, self.target, camera.up).inverse();
        let left = -camera_matrix.x_axis.truncate()
            * (2.0 * delta.x * target_distance / viewport_height);
        let up =
            camera_matrix.y_axis.truncate() * (2.0 * delta.y * target_distance / viewport_height);
        self.pan_offset += left + up;
    }

    /// Advances the controller one frame and writes the result into `camera`.
    ///
    /// Returns `true` when the camera moved noticeably.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_vec3(offset);

        if self.enable_damping {
            spherical.theta += self.spherical_delta.theta * self.damping_factor;
            spherical.phi += self.spherical_delta.phi * self.damping_factor;
        } else {
            spherical.theta += self.spherical_delta.theta;
            spherical.phi += self.spherical_delta.phi;
        }
        spherical.make_safe();
        spherical.radius =
            (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            self.target += self.pan_offset * self.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        let previous = camera.position;
        camera.position = self.target + spherical.to_vec3();
        camera.look_at(self.target);

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= decay;
            self.spherical_delta.phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        previous.distance_squared(camera.position) > EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera_at(position: Vec3) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0);
        camera.position = position;
        camera
    }

    #[test]
    fn spherical_conversion_matches_cartesian() {
        let v = Vec3::new(1.0, 1.0, 2.0);
        let back = Spherical::from_vec3(v).to_vec3();
        assert_relative_eq!(back.x, v.x, epsilon = 1e-5);
        assert_relative_eq!(back.y, v.y, epsilon = 1e-5);
        assert_relative_eq!(back.z, v.z, epsilon = 1e-5);
    }

    #[test]
    fn update_without_input_keeps_camera_in_place() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.enable_damping = true;
        let mut camera = camera_at(Vec3::new(1.0, 1.0, 2.0));
        controls.update(&mut camera);
        assert_relative_eq!(camera.position.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.position.z, 2.0, epsilon = 1e-5);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn damped_rotation_converges_to_full_angle() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        controls.enable_damping = true;
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 2.0));
        controls.rotate_left(-0.5);

        controls.update(&mut camera);
        let first = Spherical::from_vec3(camera.position).theta;
        assert_relative_eq!(first, 0.5 * 0.05, epsilon = 1e-5);

        for _ in 0..1000 {
            controls.update(&mut camera);
        }
        let settled = Spherical::from_vec3(camera.position).theta;
        assert_relative_eq!(settled, 0.5, epsilon = 1e-3);
    }

    #[test]
    fn wheel_towards_screen_moves_closer() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 2.0));
        controls.wheel(-100.0);
        controls.update(&mut camera);
        assert_relative_eq!(camera.position.length(), 2.0 * 0.95, epsilon = 1e-5);
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 1.0, 1.0));
        controls.rotate_up(10.0);
        controls.update(&mut camera);
        assert!(camera.position.y > 0.0);
        assert!(camera.position.z.abs() < 1e-3);
    }

    #[test]
    fn primary_drag_rotates_secondary_drag_pans() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 2.0));

        controls.pointer_down(PointerButton::Primary, Vec2::new(100.0, 100.0));
        controls.pointer_move(Vec2::new(150.0, 100.0), 500.0, &camera);
        controls.pointer_up();
        controls.update(&mut camera);
        assert_eq!(controls.target, Vec3::ZERO);
        assert!(camera.position.x < 0.0);

        controls.pointer_down(PointerButton::Secondary, Vec2::new(0.0, 0.0));
        controls.pointer_move(Vec2::new(10.0, 0.0), 500.0, &camera);
        controls.update(&mut camera);
        assert!(controls.target.length() > 0.0);
        assert!(controls.is_dragging());
    }

    #[test]
    fn middle_drag_dollies_without_moving_the_target() {
        let mut controls = OrbitControls::new(Vec3::ZERO);
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 2.0));

        controls.pointer_down(PointerButton::Auxiliary, Vec2::new(50.0, 50.0));
        controls.pointer_move(Vec2::new(50.0, 60.0), 500.0, &camera);
        controls.update(&mut camera);
        assert_eq!(controls.target, Vec3::ZERO);
        assert_relative_eq!(camera.position.length(), 2.0 / 0.95, epsilon = 1e-5);

        controls.pointer_move(Vec2::new(50.0, 40.0), 500.0, &camera);
        controls.update(&mut camera);
        assert_relative_eq!(camera.position.length(), 2.0, epsilon = 1e-5);
        assert_relative_eq!(camera.position.z, 2.0, epsilon = 1e-5);
    }
}
