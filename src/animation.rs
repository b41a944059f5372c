use glam::Vec3;

/// Radius of the horizontal orbit traced by the hopping sphere.
pub const ORBIT_RADIUS: f32 = 1.5;
/// Vertical bounce frequency relative to the orbit frequency.
pub const BOUNCE_FREQUENCY: f32 = 3.0;
/// Fake shadow opacity when the sphere touches the ground.
pub const SHADOW_MAX_OPACITY: f32 = 0.3;

/// Monotonic elapsed-time source sampled once per frame.
#[derive(Debug, Clone)]
pub struct Clock {
    start: f64,
    manual: Option<f64>,
}

impl Clock {
    /// Starts a clock backed by the host's monotonic timer.
    pub fn start() -> Self {
        Self {
            start: now_seconds(),
            manual: None,
        }
    }

    /// Creates a clock that only advances through [`Clock::advance`].
    pub fn manual() -> Self {
        Self {
            start: 0.0,
            manual: Some(0.0),
        }
    }

    pub fn advance(&mut self, seconds: f64) {
        if let Some(elapsed) = self.manual.as_mut() {
            *elapsed += seconds.max(0.0);
        }
    }

    /// Seconds since the clock started.
    pub fn elapsed(&self) -> f64 {
        match self.manual {
            Some(elapsed) => elapsed,
            None => (now_seconds() - self.start).max(0.0),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn now_seconds() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    ORIGIN.get_or_init(Instant::now).elapsed().as_secs_f64()
}

#[cfg(target_arch = "wasm32")]
fn now_seconds() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now() / 1000.0)
        .unwrap_or(0.0)
}

/// Position of the hopping sphere at elapsed time `t`.
///
/// A circular orbit of radius [`ORBIT_RADIUS`] in the XZ plane combined with
/// an absolute-value bounce at three times the angular frequency.
pub fn hop_position(t: f32) -> Vec3 {
    Vec3::new(
        t.cos() * ORBIT_RADIUS,
        (t * BOUNCE_FREQUENCY).sin().abs(),
        t.sin() * ORBIT_RADIUS,
    )
}

/// Opacity of the fake shadow under an object at height `y`.
///
/// Not clamped: heights above one produce negative opacity.
pub fn shadow_opacity(y: f32) -> f32 {
    (1.0 - y) * SHADOW_MAX_OPACITY
}

/// Result of one animation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HopFrame {
    pub sphere: Vec3,
    /// Planar position of the shadow proxy (x, z).
    pub shadow_xz: (f32, f32),
    pub shadow_opacity: f32,
}

impl HopFrame {
    pub fn at(t: f32) -> Self {
        let sphere = hop_position(t);
        Self {
            sphere,
            shadow_xz: (sphere.x, sphere.z),
            shadow_opacity: shadow_opacity(sphere.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn starts_on_the_orbit_at_ground_level() {
        let frame = HopFrame::at(0.0);
        assert_eq!(frame.sphere, Vec3::new(1.5, 0.0, 0.0));
        assert_relative_eq!(frame.shadow_opacity, 0.3);
    }

    #[test]
    fn quarter_turn_is_at_the_top_of_a_hop() {
        let frame = HopFrame::at(FRAC_PI_2);
        assert!(frame.sphere.x.abs() < 1e-5);
        assert_relative_eq!(frame.sphere.z, 1.5);
        assert_relative_eq!(frame.sphere.y, 1.0);
        assert!(frame.shadow_opacity.abs() < 1e-6);
    }

    #[test]
    fn shadow_tracks_sphere_and_height_never_goes_negative() {
        for step in 0..2000 {
            let t = step as f32 * 0.0137;
            let frame = HopFrame::at(t);
            assert_eq!(frame.shadow_xz, (frame.sphere.x, frame.sphere.z));
            assert!(frame.sphere.y >= 0.0);
            assert!(frame.shadow_opacity <= SHADOW_MAX_OPACITY);
        }
    }

    #[test]
    fn opacity_is_left_unclamped_above_unit_height() {
        assert!(shadow_opacity(1.5) < 0.0);
    }

    #[test]
    fn manual_clock_only_moves_forward() {
        let mut clock = Clock::manual();
        clock.advance(0.5);
        clock.advance(-1.0);
        clock.advance(0.25);
        assert_relative_eq!(clock.elapsed(), 0.75);
    }
}
