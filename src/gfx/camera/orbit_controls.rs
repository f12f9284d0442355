//! Damped orbit controls
//!
//! The camera orbits `target` with +Y up. Mouse input only accumulates
//! deltas; [`OrbitControls::update`] applies a fraction of them every frame
//! and lets the rest decay, which produces the eased motion. The camera's
//! current position is re-read on every update, so anything else that moves
//! the camera (the inspector, for instance) is respected.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Rad, Vector3, Zero};
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

use crate::gfx::scene::Transform;

use super::PerspectiveCamera;

/// Margin keeping the polar angle away from the poles
const EPS: f32 = 1e-6;

/// Radius scale applied per wheel notch
const ZOOM_BASE: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y
    phi: f32,
    /// Azimuth around +Y, measured from +Z
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let ring = self.phi.sin() * self.radius;
        Vector3::new(
            ring * self.theta.sin(),
            self.phi.cos() * self.radius,
            ring * self.theta.cos(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Rotate,
    Pan,
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vector3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vector3<f32>,
    pending_pan: (f32, f32),
    drag: DragState,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vector3::zero(),
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vector3::zero(),
            pending_pan: (0.0, 0.0),
            drag: DragState::Idle,
        }
    }
}

impl OrbitControls {
    pub fn new(target: Vector3<f32>) -> Self {
        Self {
            target,
            ..Default::default()
        }
    }

    /// Enables damping with `factor`, or disables it for `None`
    pub fn with_damping(mut self, factor: Option<f32>) -> Self {
        match factor {
            Some(factor) => {
                self.enable_damping = true;
                self.damping_factor = factor;
            }
            None => self.enable_damping = false,
        }
        self
    }

    pub fn with_distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Mouse drag rotation; a drag across the full viewport height is one
    /// full turn
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.rotate_left(2.0 * PI * dx / viewport_height * self.rotate_speed);
        self.rotate_up(2.0 * PI * dy / viewport_height * self.rotate_speed);
    }

    /// Queues a screen-space pan, resolved against the camera on the next update
    pub fn pan_by_pixels(&mut self, dx: f32, dy: f32) {
        self.pending_pan.0 += dx * self.pan_speed;
        self.pending_pan.1 += dy * self.pan_speed;
    }

    /// Moves toward the target for positive `notches`, away for negative
    pub fn dolly(&mut self, notches: f32) {
        let step = ZOOM_BASE.powf(self.zoom_speed * notches.abs());
        if notches > 0.0 {
            self.scale *= step;
        } else if notches < 0.0 {
            self.scale /= step;
        }
    }

    /// Left drags rotate, right and middle drags pan; any release ends the drag
    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        self.drag = match (state, button) {
            (ElementState::Pressed, MouseButton::Left) => DragState::Rotate,
            (ElementState::Pressed, MouseButton::Right | MouseButton::Middle) => DragState::Pan,
            (ElementState::Released, _) => DragState::Idle,
            (ElementState::Pressed, _) => self.drag,
        };
    }

    /// Raw mouse motion, applied only while a drag is active
    ///
    /// # Arguments
    /// * `delta` - Motion in physical pixels since the last event
    /// * `viewport_height` - Viewport height in physical pixels
    pub fn handle_mouse_motion(&mut self, delta: (f64, f64), viewport_height: f32) {
        let (dx, dy) = (delta.0 as f32, delta.1 as f32);
        match self.drag {
            DragState::Rotate => self.rotate_by_pixels(dx, dy, viewport_height),
            DragState::Pan => self.pan_by_pixels(dx, dy),
            DragState::Idle => {}
        }
    }

    /// One dolly step per wheel event, whatever its magnitude
    pub fn handle_scroll(&mut self, delta: &MouseScrollDelta) {
        let amount = match delta {
            MouseScrollDelta::LineDelta(_, y) => *y,
            MouseScrollDelta::PixelDelta(position) => position.y as f32,
        };
        if amount > 0.0 {
            self.dolly(1.0);
        } else if amount < 0.0 {
            self.dolly(-1.0);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag != DragState::Idle
    }

    /// Applies pending input to the camera transform
    ///
    /// The orbit is rebuilt from the transform's current position, so edits
    /// made elsewhere since the last frame are kept. With damping on, only a
    /// fraction of the pending rotation is applied and the rest decays.
    ///
    /// # Arguments
    /// * `transform` - Camera node transform, moved and re-aimed at the target
    /// * `camera` - Projection, for converting pan pixels to world units
    /// * `viewport_height` - Viewport height in physical pixels
    ///
    /// # Returns
    /// Whether the camera moved or turned
    pub fn update(
        &mut self,
        transform: &mut Transform,
        camera: &PerspectiveCamera,
        viewport_height: f32,
    ) -> bool {
        self.resolve_pan(transform, camera, viewport_height);

        let mut spherical = Spherical::from_offset(transform.position - self.target);
        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        spherical.theta += self.delta_theta * factor;
        spherical.phi += self.delta_phi * factor;
        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * factor;

        let previous = *transform;
        transform.position = self.target + spherical.to_offset();
        transform.look_at(self.target);

        let decay = if self.enable_damping {
            1.0 - self.damping_factor
        } else {
            0.0
        };
        self.delta_theta *= decay;
        self.delta_phi *= decay;
        self.pan_offset *= decay;
        self.scale = 1.0;

        (transform.position - previous.position).magnitude2() > EPS
            || (transform.rotation - previous.rotation).magnitude2() > EPS
    }

    fn resolve_pan(&mut self, transform: &Transform, camera: &PerspectiveCamera, viewport_height: f32) {
        let (dx, dy) = std::mem::replace(&mut self.pending_pan, (0.0, 0.0));
        if (dx == 0.0 && dy == 0.0) || viewport_height <= 0.0 {
            return;
        }

        // distance covered by half the viewport height at the target's depth
        let offset = transform.position - self.target;
        let half_fov: Rad<f32> = cgmath::Deg(camera.fov * 0.5).into();
        let target_distance = offset.magnitude() * half_fov.0.tan();

        let axes = transform.rotation_matrix();
        let left = axes.x * -(2.0 * dx * target_distance / viewport_height);
        let up = axes.y * (2.0 * dy * target_distance / viewport_height);
        self.pan_offset += left + up;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(75.0, 1.5, 0.1, 100.0)
    }

    fn azimuth(transform: &Transform) -> f32 {
        transform.position.x.atan2(transform.position.z)
    }

    #[test]
    fn test_spherical_round_trip() {
        let offset = Vector3::new(1.0, 1.0, 2.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).magnitude() < 1e-5);
    }

    #[test]
    fn test_damping_converges_to_requested_rotation() {
        let mut controls = OrbitControls::default().with_damping(Some(0.05));
        let mut transform = Transform::from_position(0.0, 0.0, 3.0);
        let start = azimuth(&transform);

        controls.rotate_left(-0.5);
        controls.update(&mut transform, &camera(), 800.0);
        let after_one = azimuth(&transform) - start;
        assert!((after_one - 0.025).abs() < 1e-4, "first step {}", after_one);

        for _ in 0..400 {
            controls.update(&mut transform, &camera(), 800.0);
        }
        assert!((azimuth(&transform) - start - 0.5).abs() < 1e-3);
        assert!((transform.position.magnitude() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_without_damping_applies_at_once() {
        let mut controls = OrbitControls::default();
        let mut transform = Transform::from_position(0.0, 0.0, 3.0);

        controls.rotate_left(-0.5);
        assert!(controls.update(&mut transform, &camera(), 800.0));
        assert!((azimuth(&transform) - 0.5).abs() < 1e-5);
        assert!(!controls.update(&mut transform, &camera(), 800.0));
    }

    #[test]
    fn test_radius_is_clamped() {
        let mut controls = OrbitControls::default().with_distance_limits(1.0, 4.0);
        let mut transform = Transform::from_position(1.0, 1.0, 2.0);

        for _ in 0..50 {
            controls.dolly(-1.0);
        }
        controls.update(&mut transform, &camera(), 800.0);
        assert!((transform.position.magnitude() - 4.0).abs() < 1e-4);

        for _ in 0..100 {
            controls.dolly(1.0);
        }
        controls.update(&mut transform, &camera(), 800.0);
        assert!((transform.position.magnitude() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_polar_angle_stays_off_the_pole() {
        let mut controls = OrbitControls::default();
        let mut transform = Transform::from_position(0.0, 1.0, 2.0);

        controls.rotate_up(10.0);
        controls.update(&mut transform, &camera(), 800.0);
        assert!(transform.position.y > 0.0);
        assert!(transform.position.x.is_finite() && transform.position.z.is_finite());
        let radius = transform.position.magnitude();
        assert!((radius - 5f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_external_moves_are_kept() {
        let mut controls = OrbitControls::default().with_damping(Some(0.05));
        let mut transform = Transform::from_position(1.0, 1.0, 2.0);
        controls.update(&mut transform, &camera(), 800.0);

        transform.position = Vector3::new(0.0, 2.0, 2.0);
        controls.update(&mut transform, &camera(), 800.0);
        assert!((transform.position - Vector3::new(0.0, 2.0, 2.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_camera_faces_target_after_update() {
        let mut controls = OrbitControls::default();
        let mut transform = Transform::from_position(1.0, 1.0, 2.0);
        controls.update(&mut transform, &camera(), 800.0);

        let forward = transform.rotation_matrix() * -Vector3::unit_z();
        let expected = (controls.target - transform.position).normalize();
        assert!((forward - expected).magnitude() < 1e-4);
    }

    #[test]
    fn test_pan_moves_target_sideways() {
        let mut controls = OrbitControls::default();
        let mut transform = Transform::from_position(0.0, 0.0, 3.0);
        controls.update(&mut transform, &camera(), 800.0);

        controls.pan_by_pixels(100.0, 0.0);
        controls.update(&mut transform, &camera(), 800.0);
        assert!(controls.target.x < 0.0);
        assert!(controls.target.y.abs() < 1e-5);
        assert!((transform.position.x - controls.target.x).abs() < 1e-5);
    }

    #[test]
    fn test_drag_state_follows_buttons() {
        let mut controls = OrbitControls::default();
        controls.handle_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert!(controls.is_dragging());

        controls.handle_mouse_motion((80.0, 0.0), 800.0);
        let mut transform = Transform::from_position(0.0, 0.0, 3.0);
        controls.update(&mut transform, &camera(), 800.0);
        assert!(transform.position.x < 0.0);

        controls.handle_mouse_button(MouseButton::Left, ElementState::Released);
        assert!(!controls.is_dragging());
        controls.handle_mouse_motion((80.0, 0.0), 800.0);
        let before = transform;
        controls.update(&mut transform, &camera(), 800.0);
        assert!((transform.position - before.position).magnitude() < 1e-6);
    }
}
