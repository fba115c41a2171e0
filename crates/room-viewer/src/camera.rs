use glam::{Mat4, Vec3};
use roomkit::pick::PickCamera;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Vertical field of view.
const FOV_Y_DEG: f32 = 50.0;
const Z_NEAR: f32 = 0.05;
const Z_FAR: f32 = 100.0;

/// Axis-aligned box the eye must stay inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl RoomBounds {
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    // --- Orbital Parameters (Primary State) ---
    /// Point the camera orbits around, in room meters.
    pub target: Vec3,
    /// Distance from the eye to the target (meters).
    pub radius: f32,
    /// Azimuth around +Y, measured from +Z (radians).
    pub azimuth_rad: f32,
    /// Elevation above the floor plane (radians).
    pub elevation_rad: f32,

    // --- Derived (Updated by `update()`) ---
    position: Vec3,
    bounds: RoomBounds,

    // --- Projection Matrix ---
    pub proj: Mat4,
}

impl Camera {
    pub fn new(target: Vec3, radius: f32, bounds: RoomBounds, aspect: f32) -> Self {
        let mut camera = Self {
            target,
            radius,
            azimuth_rad: 35f32.to_radians(),
            elevation_rad: 25f32.to_radians(),
            position: Vec3::ZERO,
            bounds,
            proj: Self::projection(aspect),
        };
        camera.update();
        camera
    }

    pub fn projection(aspect: f32) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEG.to_radians(), aspect.max(1e-3), Z_NEAR, Z_FAR)
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.proj = Self::projection(aspect);
    }

    /// Recomputes the eye from the orbital parameters and clamps it into the
    /// room. Call after changing any orbital parameter; frames without input
    /// reuse the cached position.
    pub fn update(&mut self) {
        let (sin_az, cos_az) = self.azimuth_rad.sin_cos();
        let (sin_el, cos_el) = self.elevation_rad.sin_cos();
        let offset = Vec3::new(
            self.radius * cos_el * sin_az,
            self.radius * sin_el,
            self.radius * cos_el * cos_az,
        );
        self.position = self.bounds.clamp(self.target + offset);
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn bounds(&self) -> RoomBounds {
        self.bounds
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view()
    }
}

impl PickCamera for Camera {
    fn view_proj(&self) -> Mat4 {
        Camera::view_proj(self)
    }
}

/// Cursor travel (pixels) below which a press/release pair counts as a click.
const CLICK_SLOP_PX: f64 = 4.0;

/// What the controller made of a window event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOutcome {
    /// Left button released without dragging.
    pub clicked: bool,
}

pub struct CameraController {
    mouse_down: bool,
    last_mouse: Option<(f64, f64)>,
    press_at: Option<(f64, f64)>,
    dragged: bool,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            mouse_down: false,
            last_mouse: None,
            press_at: None,
            dragged: false,
        }
    }

    /// Handles window events and updates the camera.
    pub fn handle_event(&mut self, event: &WindowEvent, camera: &mut Camera) -> ControllerOutcome {
        let mut out = ControllerOutcome::default();
        match event {
            WindowEvent::MouseInput { button, state, .. } if *button == MouseButton::Left => {
                out.clicked = self.handle_button(*state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor_orbit((position.x, position.y), camera);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };
                self.handle_scroll(scroll, camera);
            }
            _ => {}
        }
        out
    }

    /// Returns `true` when a release completes a click.
    fn handle_button(&mut self, pressed: bool) -> bool {
        self.mouse_down = pressed;
        if pressed {
            self.press_at = self.last_mouse;
            self.dragged = false;
            false
        } else {
            self.press_at.take().is_some() && !self.dragged
        }
    }

    /// Adjusts orbit radius based on scroll input.
    fn handle_scroll(&mut self, delta: f32, camera: &mut Camera) {
        // Positive delta = scroll up = zoom in.
        let zoom = 1.1_f32.powf(-delta);
        camera.radius = (camera.radius * zoom).clamp(1.0, 9.0);
        camera.update();
    }

    /// Rotates the camera around the target while the left button is held.
    fn handle_cursor_orbit(&mut self, xy: (f64, f64), camera: &mut Camera) {
        if let Some(last) = self.last_mouse {
            if self.mouse_down {
                if let Some(start) = self.press_at {
                    let (dx, dy) = (xy.0 - start.0, xy.1 - start.1);
                    if dx.hypot(dy) > CLICK_SLOP_PX {
                        self.dragged = true;
                    }
                }
                let dx = ((xy.0 - last.0) * 0.005) as f32;
                let dy = ((last.1 - xy.1) * 0.005) as f32;

                camera.azimuth_rad -= dx;
                camera.elevation_rad -= dy;

                // Stay above the floor and short of straight down.
                camera.elevation_rad = camera
                    .elevation_rad
                    .clamp(3f32.to_radians(), 80f32.to_radians());

                camera.update();
            }
        }
        self.last_mouse = Some(xy);
    }
}
