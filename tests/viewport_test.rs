use flow_gpgpu::viewport::{MAX_PIXEL_RATIO, Viewport};

#[test]
fn should_scale_the_resolution_by_the_pixel_ratio() {
    let mut viewport = Viewport::new(800.0, 600.0, 2.0);
    assert_eq!(viewport.resolution(), [1600.0, 1200.0]);

    viewport.resize(1024.0, 768.0, 2.0);
    assert_eq!(viewport.resolution(), [2048.0, 1536.0]);
    assert_eq!(viewport.surface_size(), (2048, 1536));
    assert!((viewport.aspect() - 4.0 / 3.0).abs() < 1e-6);
}

#[test]
fn should_cap_the_pixel_ratio() {
    let viewport = Viewport::new(100.0, 50.0, 3.0);
    assert_eq!(viewport.pixel_ratio(), MAX_PIXEL_RATIO);
    assert_eq!(viewport.resolution(), [200.0, 100.0]);
}

#[test]
fn should_fall_back_to_a_ratio_of_one() {
    let viewport = Viewport::new(100.0, 50.0, 0.0);
    assert_eq!(viewport.pixel_ratio(), 1.0);
}

#[test]
fn should_convert_physical_window_sizes() {
    let viewport = Viewport::from_physical(1600, 1200, 2.0);
    assert_eq!(viewport.width(), 800.0);
    assert_eq!(viewport.height(), 600.0);
    assert_eq!(viewport.surface_size(), (1600, 1200));
}

#[test]
fn should_never_report_an_empty_surface() {
    let viewport = Viewport::new(0.0, 0.0, 1.0);
    assert_eq!(viewport.surface_size(), (1, 1));
}

#[test]
fn should_normalize_pointer_positions() {
    let viewport = Viewport::new(800.0, 600.0, 2.0);
    assert_eq!(viewport.normalize_pointer(0.0, 0.0), [-1.0, 1.0]);
    assert_eq!(viewport.normalize_pointer(800.0, 600.0), [1.0, -1.0]);
    assert_eq!(viewport.normalize_pointer(400.0, 300.0), [0.0, 0.0]);
}
