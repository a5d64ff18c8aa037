//! First-person fly camera.
//!
//! Mouse look changes yaw/pitch, WASD moves along the camera's own axes.
//! Both are scaled by the frame delta so speed does not depend on frame rate.

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Vector3};
use winit::event::VirtualKeyCode;
use winit_input_helper::WinitInputHelper;

use crate::app::FrameTime;

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_SPEED: f32 = 3.0;
pub const DEFAULT_SENSITIVITY: f32 = 5.0;
pub const PITCH_LIMIT: f32 = 89.0;

/// Keys held during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Movement {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl Movement {
    pub fn from_input(input: &WinitInputHelper) -> Self {
        Movement {
            forward: input.key_held(VirtualKeyCode::W),
            backward: input.key_held(VirtualKeyCode::S),
            left: input.key_held(VirtualKeyCode::A),
            right: input.key_held(VirtualKeyCode::D),
        }
    }

    pub fn is_idle(&self) -> bool {
        !(self.forward || self.backward || self.left || self.right)
    }
}

#[derive(Debug, Clone)]
pub struct FlyCamera {
    position: Vector3<f32>,
    direction: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    world_up: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    speed: f32,
    sensitivity: f32,
    last_cursor: (f32, f32),
    moved: bool,
}

impl Default for FlyCamera {
    fn default() -> Self {
        let mut camera = FlyCamera {
            position: Vector3::new(0.0, 0.0, 0.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
            right: Vector3::new(1.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            world_up: Vector3::new(0.0, 1.0, 0.0),
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            speed: DEFAULT_SPEED,
            sensitivity: DEFAULT_SENSITIVITY,
            last_cursor: (0.0, 0.0),
            moved: false,
        };
        camera.update_vectors();
        camera
    }
}

impl FlyCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(position: Vector3<f32>) -> Self {
        let mut camera = Self::default();
        camera.position = position;
        camera
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
    }

    /// Points the camera along `direction` without touching yaw/pitch.
    /// The next cursor update recomputes the direction from the angles.
    pub fn set_direction(&mut self, direction: Vector3<f32>) {
        if direction.magnitude2() > 0.0 {
            self.direction = direction.normalize();
            self.right = self.direction.cross(self.world_up).normalize();
            self.up = self.right.cross(self.direction).normalize();
        }
    }

    pub fn set_movement_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
    }

    pub fn set_angles(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch;
        self.update_vectors();
    }

    /// Polls the keyboard and cursor, movement first then look.
    /// A grabbed cursor is read from `frame.look_cursor` instead of the window.
    pub fn update(&mut self, input: &WinitInputHelper, frame: &FrameTime) {
        self.process_movement(Movement::from_input(input), frame.delta);
        if let Some((x, y)) = look_position(input.mouse(), frame) {
            self.process_cursor(x, y, frame.delta);
        }
    }

    pub fn process_movement(&mut self, movement: Movement, delta: f32) {
        if movement.is_idle() {
            return;
        }
        let step = self.speed * delta;
        if movement.forward {
            self.position += self.direction * step;
        }
        if movement.backward {
            self.position -= self.direction * step;
        }
        if movement.left {
            self.position -= self.right * step;
        }
        if movement.right {
            self.position += self.right * step;
        }
    }

    pub fn process_cursor(&mut self, x: f32, y: f32, delta: f32) {
        // The first reported position is not a real movement; take it as the origin.
        if !self.moved && x != 0.0 && y != 0.0 {
            self.last_cursor = (x, y);
            self.moved = true;
        }

        let x_offset = x - self.last_cursor.0;
        let y_offset = self.last_cursor.1 - y;
        self.last_cursor = (x, y);

        self.yaw += self.sensitivity * delta * x_offset;
        self.pitch += self.sensitivity * delta * y_offset;
        self.update_vectors();
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::new(self.position.x, self.position.y, self.position.z);
        Matrix4::look_at_rh(eye, eye + self.direction, self.world_up)
    }

    fn update_vectors(&mut self) {
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let yaw = Deg(self.yaw);
        let pitch = Deg(self.pitch);
        let (yaw_sin, yaw_cos) = cgmath::Angle::sin_cos(yaw);
        let (pitch_sin, pitch_cos) = cgmath::Angle::sin_cos(pitch);

        self.direction = Vector3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        self.right = self.direction.cross(self.world_up).normalize();
        self.up = self.right.cross(self.direction).normalize();
    }
}

fn look_position(window_cursor: Option<(f32, f32)>, frame: &FrameTime) -> Option<(f32, f32)> {
    frame.look_cursor.or(window_cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    const EPS: f32 = 1e-5;

    fn assert_vec_eq(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < EPS, "{:?} != {:?}", a, b);
    }

    #[test]
    fn default_looks_down_negative_z() {
        let camera = FlyCamera::new();
        assert_vec_eq(camera.direction(), Vector3::new(0.0, 0.0, -1.0));
        assert_vec_eq(camera.right(), Vector3::new(1.0, 0.0, 0.0));
        assert_vec_eq(camera.up(), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn yaw_zero_looks_down_positive_x() {
        let mut camera = FlyCamera::new();
        camera.set_angles(0.0, 0.0);
        assert_vec_eq(camera.direction(), Vector3::new(1.0, 0.0, 0.0));
        assert_vec_eq(camera.right(), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn pitch_is_clamped_before_direction_update() {
        let mut camera = FlyCamera::new();
        camera.set_angles(-90.0, 120.0);
        assert_eq!(camera.pitch(), PITCH_LIMIT);

        let expected = Vector3::new(
            0.0,
            89f32.to_radians().sin(),
            -(89f32.to_radians().cos()),
        );
        assert_vec_eq(camera.direction(), expected);

        camera.set_angles(-90.0, -400.0);
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn first_cursor_reading_does_not_turn() {
        let mut camera = FlyCamera::new();
        camera.process_cursor(400.0, 300.0, 0.016);
        assert_eq!(camera.yaw(), DEFAULT_YAW);
        assert_eq!(camera.pitch(), DEFAULT_PITCH);
    }

    #[test]
    fn cursor_at_origin_is_not_taken_as_first_reading() {
        let mut camera = FlyCamera::new();
        camera.process_cursor(0.0, 0.0, 1.0);
        camera.process_cursor(10.0, 10.0, 1.0);
        assert_eq!(camera.yaw(), DEFAULT_YAW);

        camera.process_cursor(20.0, 10.0, 0.1);
        assert!((camera.yaw() - (DEFAULT_YAW + 5.0)).abs() < EPS);
        assert!((camera.pitch() - DEFAULT_PITCH).abs() < EPS);
    }

    #[test]
    fn cursor_offsets_scale_with_sensitivity_and_delta() {
        let mut camera = FlyCamera::new();
        camera.set_sensitivity(2.0);
        camera.process_cursor(100.0, 100.0, 0.5);
        camera.process_cursor(110.0, 96.0, 0.5);
        assert!((camera.yaw() - (DEFAULT_YAW + 10.0)).abs() < EPS);
        // moving the cursor up looks up
        assert!((camera.pitch() - 4.0).abs() < EPS);
    }

    #[test]
    fn movement_integrates_speed_times_delta() {
        let mut camera = FlyCamera::new();
        let forward = Movement {
            forward: true,
            ..Movement::default()
        };
        camera.process_movement(forward, 0.5);
        assert_vec_eq(camera.position(), Vector3::new(0.0, 0.0, -1.5));

        let strafe = Movement {
            right: true,
            ..Movement::default()
        };
        camera.set_movement_speed(1.0);
        camera.process_movement(strafe, 2.0);
        assert_vec_eq(camera.position(), Vector3::new(2.0, 0.0, -1.5));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut camera = FlyCamera::new();
        camera.set_position(Vector3::new(1.0, 2.0, 3.0));
        let all = Movement {
            forward: true,
            backward: true,
            left: true,
            right: true,
        };
        assert!(!all.is_idle());
        camera.process_movement(all, 1.0);
        assert_vec_eq(camera.position(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn idle_movement_keeps_position() {
        let mut camera = FlyCamera::with_position(Vector3::new(1.0, 2.0, 3.0));
        assert!(Movement::default().is_idle());
        camera.process_movement(Movement::default(), 10.0);
        assert_eq!(camera.position(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn grabbed_cursor_wins_over_window_cursor() {
        let grabbed = FrameTime {
            look_cursor: Some((410.0, 297.0)),
            ..FrameTime::default()
        };
        assert_eq!(look_position(Some((5.0, 5.0)), &grabbed), Some((410.0, 297.0)));
        assert_eq!(look_position(None, &grabbed), Some((410.0, 297.0)));

        let free = FrameTime::default();
        assert_eq!(look_position(Some((5.0, 5.0)), &free), Some((5.0, 5.0)));
        assert_eq!(look_position(None, &free), None);
    }

    #[test]
    fn raw_motion_turns_a_grabbed_camera() {
        let mut look = crate::app::LookCursor::centered(800, 600);
        let mut camera = FlyCamera::new();
        camera.process_cursor(look.position().0, look.position().1, 0.1);
        look.apply((20.0, 0.0));
        camera.process_cursor(look.position().0, look.position().1, 0.1);
        assert!((camera.yaw() - (DEFAULT_YAW + 10.0)).abs() < EPS);
    }

    #[test]
    fn view_matrix_moves_world_opposite_to_camera() {
        let camera = FlyCamera::with_position(Vector3::new(0.0, 0.0, 5.0));
        let origin = camera.view_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin.z + 5.0).abs() < EPS);
        assert!(origin.x.abs() < EPS && origin.y.abs() < EPS);
    }

    #[test]
    fn set_direction_normalizes_and_rebuilds_basis() {
        let mut camera = FlyCamera::new();
        camera.set_direction(Vector3::new(0.0, 0.0, 4.0));
        assert_vec_eq(camera.direction(), Vector3::new(0.0, 0.0, 1.0));
        assert_vec_eq(camera.right(), Vector3::new(-1.0, 0.0, 0.0));

        camera.set_direction(Vector3::new(0.0, 0.0, 0.0));
        assert_vec_eq(camera.direction(), Vector3::new(0.0, 0.0, 1.0));
    }
}
