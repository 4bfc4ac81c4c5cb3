use std::f32::consts::PI;

use cgmath::{InnerSpace, Point3};
use flow_gpgpu::camera::{Camera, OrbitController};

fn camera_at(distance: f32) -> Camera {
    Camera::new(Point3::new(0.0, 0.0, distance), Point3::new(0.0, 0.0, 0.0))
}

fn distance(camera: &Camera) -> f32 {
    (camera.position - camera.target).magnitude()
}

fn azimuth(camera: &Camera) -> f32 {
    let offset = camera.position - camera.target;
    offset.x.atan2(offset.z)
}

#[test]
fn should_apply_a_whole_drag_without_damping() {
    let mut controller = OrbitController::new(1.0, 1.0);
    controller.damping_factor = 1.0;
    let mut camera = camera_at(5.0);

    // A quarter of the viewport height turns a quarter circle.
    controller.rotate(100.0, 0.0, 400.0);
    controller.update(&mut camera, 400.0);

    assert!((camera.position.x + 5.0).abs() < 1e-4);
    assert!(camera.position.y.abs() < 1e-4);
    assert!(camera.position.z.abs() < 1e-4);
}

#[test]
fn should_ease_rotation_out_over_frames() {
    let mut controller = OrbitController::new(1.0, 1.0);
    controller.damping_factor = 0.1;
    let mut camera = camera_at(5.0);
    let height = 2.0 * PI * 100.0;

    controller.rotate(100.0, 0.0, height);
    controller.update(&mut camera, height);
    assert!((azimuth(&camera) + 0.1).abs() < 1e-4);

    controller.update(&mut camera, height);
    assert!((azimuth(&camera) + 0.19).abs() < 1e-4);

    for _ in 0..200 {
        controller.update(&mut camera, height);
    }
    let settled = azimuth(&camera);
    controller.update(&mut camera, height);
    assert!((azimuth(&camera) - settled).abs() < 1e-5);
    assert!((settled + 1.0).abs() < 1e-3);
}

#[test]
fn should_keep_the_distance_within_limits() {
    let mut controller = OrbitController::new(1.0, 1.0);
    controller.min_distance = 2.0;
    controller.max_distance = 5.0;
    let mut camera = camera_at(4.0);

    for _ in 0..50 {
        controller.zoom(-1.0);
        controller.update(&mut camera, 600.0);
        assert!(distance(&camera) <= 5.0 + 1e-4);
    }
    assert!((distance(&camera) - 5.0).abs() < 1e-4);

    for _ in 0..100 {
        controller.zoom(1.0);
        controller.update(&mut camera, 600.0);
        assert!(distance(&camera) >= 2.0 - 1e-4);
    }
    assert!((distance(&camera) - 2.0).abs() < 1e-4);
}

#[test]
fn should_dolly_once_per_wheel_step() {
    let mut controller = OrbitController::new(1.0, 1.0);
    let mut camera = camera_at(4.0);

    controller.zoom(1.0);
    controller.update(&mut camera, 600.0);
    assert!((distance(&camera) - 3.8).abs() < 1e-4);

    controller.update(&mut camera, 600.0);
    assert!((distance(&camera) - 3.8).abs() < 1e-4);
}
