// viewer.rs: camera orientation, drag/wheel input and the per-frame update

use glam::{Mat4, Vec3};

use crate::mesh::{build_sphere, SphereMesh};
use crate::texture::{SphereSurface, TextureOutcome};

pub const SPHERE_RADIUS: f32 = 500.0;
pub const SPHERE_LAT_SEGMENTS: usize = 40;
pub const SPHERE_LON_SEGMENTS: usize = 60;

pub const DEFAULT_FOV: f32 = 75.0;
pub const MIN_FOV: f32 = 10.0;
pub const MAX_FOV: f32 = 75.0;
pub const NEAR_PLANE: f32 = 1.0;
pub const FAR_PLANE: f32 = 1100.0;

pub const MAX_LATITUDE: f64 = 85.0;
pub const AUTO_ROTATE_STEP: f64 = 0.05;
pub const DRAG_SENSITIVITY: f64 = 0.1;
pub const WHEEL_SENSITIVITY: f32 = 0.05;

/// Graphics collaborator. The wgpu renderer implements it; so do test fakes.
pub trait SceneBackend {
    type Error;

    fn set_projection(&mut self, projection: &Projection);
    fn set_sphere(&mut self, mesh: &SphereMesh);
    fn set_sphere_surface(&mut self, surface: SphereSurface);
    fn look_at(&mut self, target: Vec3);
    fn render_frame(&mut self) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_deg.to_radians(), self.aspect, self.near, self.far)
    }
}

/// Camera sitting at the sphere centre looking at `target`.
pub fn view_matrix(target: Vec3) -> Mat4 {
    Mat4::look_at_rh(Vec3::ZERO, target, Vec3::Y)
}

/// Angles are kept in `f64`: longitude grows without bound during idle
/// rotation and must still advance by one step after days of running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub longitude: f64,
    pub latitude: f64,
    pub field_of_view: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            longitude: 0.0,
            latitude: 0.0,
            field_of_view: DEFAULT_FOV,
        }
    }
}

impl CameraState {
    /// Spherical to Cartesian on the display sphere. Latitude is clamped for
    /// the conversion only.
    pub fn look_target(&self) -> Vec3 {
        let lat = self.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let phi = (90.0 - lat).to_radians();
        let theta = self.longitude.to_radians();

        let r = SPHERE_RADIUS as f64;
        Vec3::new(
            (r * phi.sin() * theta.cos()) as f32,
            (r * phi.cos()) as f32,
            (r * phi.sin() * theta.sin()) as f32,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionState {
    pub is_dragging: bool,
    pub drag_origin_pointer: (f32, f32),
    pub drag_origin_orientation: (f64, f64),
}

pub struct ViewerState {
    pub camera: CameraState,
    pub interaction: InteractionState,
    aspect: f32,
}

impl ViewerState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            camera: CameraState::default(),
            interaction: InteractionState::default(),
            aspect: width as f32 / height.max(1) as f32,
        }
    }

    pub fn projection(&self) -> Projection {
        Projection {
            fov_deg: self.camera.field_of_view,
            aspect: self.aspect,
            near: NEAR_PLANE,
            far: FAR_PLANE,
        }
    }

    /// Creates the camera projection and the inward-facing sphere. The
    /// background is requested separately and arrives via `apply_background`.
    pub fn init<B: SceneBackend>(&self, backend: &mut B) {
        backend.set_projection(&self.projection());
        let sphere = build_sphere(SPHERE_RADIUS, SPHERE_LAT_SEGMENTS, SPHERE_LON_SEGMENTS).inverted();
        backend.set_sphere(&sphere);
    }

    pub fn apply_background<B: SceneBackend>(&self, outcome: TextureOutcome, backend: &mut B) {
        backend.set_sphere_surface(SphereSurface::from_outcome(outcome));
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.interaction = InteractionState {
            is_dragging: true,
            drag_origin_pointer: (x, y),
            drag_origin_orientation: (self.camera.longitude, self.camera.latitude),
        };
    }

    /// Returns true when the move changed the orientation.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        if !self.interaction.is_dragging {
            return false;
        }
        let (ox, oy) = self.interaction.drag_origin_pointer;
        let (olon, olat) = self.interaction.drag_origin_orientation;

        self.camera.longitude = f64::from(ox - x) * DRAG_SENSITIVITY + olon;
        self.camera.latitude = f64::from(y - oy) * DRAG_SENSITIVITY + olat;
        true
    }

    pub fn pointer_up(&mut self) {
        self.interaction.is_dragging = false;
    }

    pub fn wheel<B: SceneBackend>(&mut self, delta_y: f32, backend: &mut B) {
        let fov = self.camera.field_of_view + delta_y * WHEEL_SENSITIVITY;
        self.camera.field_of_view = fov.clamp(MIN_FOV, MAX_FOV);
        backend.set_projection(&self.projection());
    }

    pub fn resize<B: SceneBackend>(&mut self, width: u32, height: u32, backend: &mut B) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        backend.set_projection(&self.projection());
    }

    /// Autonomous rotation, latitude clamp and look target for this frame.
    pub fn advance(&mut self) -> Vec3 {
        if !self.interaction.is_dragging {
            self.camera.longitude += AUTO_ROTATE_STEP;
        }
        self.camera.latitude = self.camera.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        self.camera.look_target()
    }

    pub fn frame<B: SceneBackend>(&mut self, backend: &mut B) -> Result<(), B::Error> {
        let target = self.advance();
        backend.look_at(target);
        backend.render_frame()
    }

    pub fn reset_view<B: SceneBackend>(&mut self, backend: &mut B) {
        self.camera = CameraState::default();
        self.interaction = InteractionState::default();
        backend.set_projection(&self.projection());
    }
}
