use catalog360::mesh::SphereMesh;
use catalog360::texture::{SphereSurface, TextureOutcome, FALLBACK_COLOR};
use catalog360::viewer::{Projection, SceneBackend, ViewerState, MAX_FOV, MIN_FOV, SPHERE_RADIUS};
use glam::Vec3;

/// Records what the viewer asks of the graphics layer.
#[derive(Default)]
struct RecordingBackend {
    projections: Vec<Projection>,
    sphere: Option<SphereMesh>,
    surfaces: Vec<SphereSurface>,
    targets: Vec<Vec3>,
    frames: usize,
}

impl SceneBackend for RecordingBackend {
    type Error = ();

    fn set_projection(&mut self, projection: &Projection) {
        self.projections.push(*projection);
    }

    fn set_sphere(&mut self, mesh: &SphereMesh) {
        self.sphere = Some(mesh.clone());
    }

    fn set_sphere_surface(&mut self, surface: SphereSurface) {
        self.surfaces.push(surface);
    }

    fn look_at(&mut self, target: Vec3) {
        self.targets.push(target);
    }

    fn render_frame(&mut self) -> Result<(), ()> {
        self.frames += 1;
        Ok(())
    }
}

#[test]
fn init_builds_camera_and_inward_sphere() {
    let viewer = ViewerState::new(1600, 900);
    let mut backend = RecordingBackend::default();
    viewer.init(&mut backend);

    let p = backend.projections.last().copied().unwrap();
    assert_eq!((p.fov_deg, p.near, p.far), (75.0, 1.0, 1100.0));
    assert!((p.aspect - 16.0 / 9.0).abs() < 1e-6);

    let sphere = backend.sphere.expect("sphere created");
    assert_eq!(sphere.radius, SPHERE_RADIUS);
    assert_eq!(sphere.triangle_count(), 40 * 60 * 2);
}

#[test]
fn failed_background_falls_back_to_flat_colour() {
    let viewer = ViewerState::new(800, 600);
    let mut backend = RecordingBackend::default();
    viewer.apply_background(TextureOutcome::Failed("not found".into()), &mut backend);
    assert_eq!(backend.surfaces, vec![SphereSurface::Color(FALLBACK_COLOR)]);
}

#[test]
fn loaded_background_is_applied_as_texture() {
    let viewer = ViewerState::new(800, 600);
    let mut backend = RecordingBackend::default();
    let img = image::RgbaImage::from_pixel(2, 1, image::Rgba([9, 9, 9, 255]));
    viewer.apply_background(TextureOutcome::Loaded(img.clone()), &mut backend);
    assert_eq!(backend.surfaces, vec![SphereSurface::Texture(img)]);
}

#[test]
fn idle_frames_rotate_longitude() {
    let mut viewer = ViewerState::new(800, 600);
    let mut backend = RecordingBackend::default();

    for _ in 0..100 {
        viewer.frame(&mut backend).unwrap();
    }
    assert!((viewer.camera.longitude - 5.0).abs() < 1e-3);
    assert_eq!(backend.frames, 100);
    assert_eq!(backend.targets.len(), 100);
}

#[test]
fn dragging_pauses_rotation() {
    let mut viewer = ViewerState::new(800, 600);
    let mut backend = RecordingBackend::default();

    viewer.pointer_down(10.0, 10.0);
    for _ in 0..10 {
        viewer.frame(&mut backend).unwrap();
    }
    assert_eq!(viewer.camera.longitude, 0.0);

    viewer.pointer_up();
    viewer.frame(&mut backend).unwrap();
    assert!((viewer.camera.longitude - 0.05).abs() < 1e-6);
}

#[test]
fn drag_is_relative_to_its_origin() {
    let mut viewer = ViewerState::new(800, 600);
    viewer.pointer_down(100.0, 100.0);
    viewer.pointer_move(80.0, 100.0);
    assert!((viewer.camera.longitude - 2.0).abs() < 1e-6);
    assert_eq!(viewer.camera.latitude, 0.0);

    // a second move recomputes from the origin, it does not accumulate
    viewer.pointer_move(90.0, 130.0);
    assert!((viewer.camera.longitude - 1.0).abs() < 1e-6);
    assert!((viewer.camera.latitude - 3.0).abs() < 1e-6);
}

#[test]
fn pointer_up_always_ends_the_drag() {
    let mut viewer = ViewerState::new(800, 600);
    viewer.pointer_up();
    assert!(!viewer.interaction.is_dragging);

    viewer.pointer_down(0.0, 0.0);
    viewer.pointer_up();
    assert!(!viewer.pointer_move(50.0, 50.0));
    assert_eq!(viewer.camera.longitude, 0.0);
}

#[test]
fn latitude_is_clamped_each_frame() {
    let mut viewer = ViewerState::new(800, 600);
    let mut backend = RecordingBackend::default();

    viewer.pointer_down(0.0, 0.0);
    viewer.pointer_move(0.0, 5000.0);
    assert_eq!(viewer.camera.latitude, 500.0);

    viewer.frame(&mut backend).unwrap();
    assert_eq!(viewer.camera.latitude, 85.0);

    viewer.pointer_move(0.0, -5000.0);
    viewer.frame(&mut backend).unwrap();
    assert_eq!(viewer.camera.latitude, -85.0);

    let t = backend.targets.last().copied().unwrap();
    let expected_y = SPHERE_RADIUS * (175.0f32).to_radians().cos();
    assert!((t.y - expected_y).abs() < 1e-2);
}

#[test]
fn wheel_keeps_fov_in_range() {
    let mut viewer = ViewerState::new(800, 600);
    let mut backend = RecordingBackend::default();

    for _ in 0..50 {
        viewer.wheel(-300.0, &mut backend);
        assert!((MIN_FOV..=MAX_FOV).contains(&viewer.camera.field_of_view));
    }
    assert_eq!(viewer.camera.field_of_view, MIN_FOV);

    viewer.wheel(100.0, &mut backend);
    assert!((viewer.camera.field_of_view - 15.0).abs() < 1e-4);

    for _ in 0..50 {
        viewer.wheel(1000.0, &mut backend);
    }
    assert_eq!(viewer.camera.field_of_view, MAX_FOV);
    assert_eq!(backend.projections.last().unwrap().fov_deg, MAX_FOV);
}

#[test]
fn resize_reapplies_projection_and_ignores_zero_size() {
    let mut viewer = ViewerState::new(800, 600);
    let mut backend = RecordingBackend::default();

    viewer.resize(1000, 500, &mut backend);
    assert_eq!(backend.projections.len(), 1);
    assert!((backend.projections[0].aspect - 2.0).abs() < 1e-6);

    viewer.resize(0, 500, &mut backend);
    assert_eq!(backend.projections.len(), 1);
    assert!((viewer.projection().aspect - 2.0).abs() < 1e-6);
}

#[test]
fn reset_view_restores_defaults() {
    let mut viewer = ViewerState::new(800, 600);
    let mut backend = RecordingBackend::default();
    viewer.pointer_down(0.0, 0.0);
    viewer.pointer_move(-300.0, 40.0);
    viewer.wheel(-200.0, &mut backend);

    viewer.reset_view(&mut backend);
    assert_eq!(viewer.camera.longitude, 0.0);
    assert_eq!(viewer.camera.latitude, 0.0);
    assert_eq!(viewer.camera.field_of_view, 75.0);
    assert!(!viewer.interaction.is_dragging);
}
