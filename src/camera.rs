use glam::{Mat4, Vec3};

/// Perspective camera that keeps its projection in sync with the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recomputes the projection after `fov`, `aspect`, `near` or `far` changed.
    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect.max(0.01),
            self.near,
            self.far,
        );
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn aspect_change_rebuilds_projection() {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0);
        let square = camera.projection_matrix();
        camera.set_aspect(2.0);
        let wide = camera.projection_matrix();
        assert_relative_eq!(wide.x_axis.x * 2.0, square.x_axis.x, epsilon = 1e-6);
        assert_relative_eq!(wide.y_axis.y, square.y_axis.y, epsilon = 1e-6);
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let mut camera = PerspectiveCamera::new(75.0, 16.0 / 9.0, 0.1, 100.0);
        camera.position = Vec3::new(1.0, 1.0, 2.0);
        camera.look_at(Vec3::ZERO);
        let clip = camera.view_projection() * Vec3::ZERO.extend(1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }
}
