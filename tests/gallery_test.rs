use cgmath::Deg;
use flow_gpgpu::{
    camera::{Camera, Projection},
    data_structures::{
        geometry::GeometryDesc,
        material::{Blending, Color, Side, UniformValue},
    },
    debug_panel::{ControlValue, PanelEvent},
    gallery::{Gallery, GalleryConfig, MESH_NAME, ShaderMode, hologram_geometry},
    pick::{PointerEvent, Ray},
};
use winit::keyboard::Key;

fn opened(mode: ShaderMode) -> Gallery {
    let mut gallery = Gallery::new(GalleryConfig::default());
    gallery.open(mode);
    gallery
}

#[test]
fn should_offer_one_folder_per_shader() {
    let gallery = Gallery::new(GalleryConfig::default());
    let titles: Vec<&str> = gallery.panel.folders.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Waving Texture", "Gradient", "Noise", "Water", "Smoke", "Hologram"]
    );
    assert_eq!(gallery.mode(), None);
    for mode in ShaderMode::ALL {
        assert_eq!(ShaderMode::from_title(mode.title()), Some(mode));
    }
}

#[test]
fn should_start_with_the_smoke_shader() {
    let mut gallery = Gallery::new(GalleryConfig::default());
    assert!(gallery.open_initial());

    assert_eq!(gallery.mode(), Some(ShaderMode::Smoke));
    assert_eq!(gallery.panel.open_folders(), vec!["Smoke"]);
    assert_eq!(
        gallery.mesh().geometry(),
        Some(&GeometryDesc::plane(1.0, 1.0, 16, 64))
    );
    assert_eq!(gallery.mesh().local.scale, cgmath::Vector3::new(0.75, 3.0, 0.75));

    let material = gallery.material().borrow();
    assert_eq!(material.texture("uPerlinTexture"), Some("textures/perlin.png"));
    assert_eq!(material.color("uSmokeColor"), Color::from_hex("#3f78d5").ok());
    assert_eq!(material.float("uTime"), Some(0.0));
    assert_eq!(material.side, Side::Double);
    assert!(!material.depth_write);
    assert!(material.transparent);
}

#[test]
fn should_ignore_reopening_the_current_shader() {
    let mut gallery = opened(ShaderMode::Water);
    gallery
        .material()
        .borrow_mut()
        .set("uColorOffset", UniformValue::Float(0.5));

    assert!(!gallery.transition(ShaderMode::Water));
    assert_eq!(gallery.material().borrow().float("uColorOffset"), Some(0.5));
}

#[test]
fn should_tear_down_before_building_the_next_shader() {
    let mut gallery = opened(ShaderMode::Hologram);
    gallery.tick(10.0);

    assert!(gallery.transition(ShaderMode::Gradient));

    let material = gallery.material().borrow();
    assert!(material.uniforms.is_empty());
    assert_eq!(material.side, Side::Front);
    assert!(material.depth_write);
    assert_eq!(material.blending, Blending::Normal);
    drop(material);

    assert_eq!(
        gallery.mesh().geometry(),
        Some(&GeometryDesc::plane(1.0, 1.0, 32, 32))
    );
    assert_eq!(gallery.mesh().local.scale, cgmath::Vector3::new(1.0, 1.0, 1.0));
    assert_eq!(gallery.mesh().local.rotation, cgmath::Quaternion::new(1.0, 0.0, 0.0, 0.0));

    // No tick hook is left behind.
    gallery.tick(20.0);
    assert_eq!(gallery.mesh().local.rotation, cgmath::Quaternion::new(1.0, 0.0, 0.0, 0.0));
}

#[test]
fn should_build_the_water_surface() {
    let gallery = opened(ShaderMode::Water);

    assert_eq!(
        gallery.mesh().geometry(),
        Some(&GeometryDesc::plane(2.0, 2.0, 512, 512))
    );
    let material = gallery.material().borrow();
    assert_eq!(material.color("uDepthColor"), Color::from_hex("#3f78d5").ok());
    assert_eq!(material.color("uSurfaceColor"), Color::from_hex("#a3d2f0").ok());
    assert_eq!(material.float("uColorOffset"), Some(0.1));
    assert_eq!(material.float("uColorMultiplier"), Some(2.5));
    assert_eq!(material.float("uBigWavesElevation"), Some(0.2));
    assert_eq!(material.vec2("uBigWavesFrequency"), Some([4.0, 1.5]));
    assert_eq!(material.float("uBigWavesSpeed"), Some(0.75));
    assert_eq!(material.float("uSmallWavesElevation"), Some(0.15));
    assert_eq!(material.float("uSmallWavesFrequency"), Some(3.0));
    assert_eq!(material.float("uSmallWavesSpeed"), Some(0.2));
    assert_eq!(material.float("uSmallWavesIteration"), Some(3.0));
}

#[test]
fn should_wave_the_cat_texture() {
    let gallery = opened(ShaderMode::WavingTexture);
    let material = gallery.material().borrow();
    assert_eq!(material.vec2("uFrequency"), Some([10.0, 5.0]));
    assert_eq!(material.texture("uTexture"), Some("textures/cat.jpg"));
}

#[test]
fn should_build_a_static_gradient() {
    let mut gallery = opened(ShaderMode::Gradient);
    gallery.tick(3.0);
    assert!(gallery.material().borrow().uniforms.is_empty());
    assert!(gallery.panel.folder("Gradient").unwrap().is_empty());
}

#[test]
fn should_advance_time_on_tick() {
    let mut gallery = opened(ShaderMode::Water);
    gallery.tick(1.5);
    assert_eq!(gallery.material().borrow().float("uTime"), Some(1.5));
}

#[test]
fn should_build_an_additive_hologram() {
    let gallery = opened(ShaderMode::Hologram);

    assert_eq!(gallery.mesh().geometry(), hologram_geometry(0).as_ref());
    let material = gallery.material().borrow();
    assert_eq!(material.blending, Blending::Additive);
    assert_eq!(material.side, Side::Double);
    assert!(!material.depth_write);
    assert_eq!(material.color("uHologramColor"), Color::from_hex("#23c55e").ok());
    assert_eq!(material.float("uFresnelIntensity"), Some(2.0));
    assert_eq!(material.float("uLowerFalloff"), Some(0.8));
    assert_eq!(material.float("uUpperFalloff"), Some(0.0));
    assert_eq!(material.float("uHolographicPower"), Some(1.25));
    assert_eq!(material.float("uGlitchStrength"), Some(0.25));
}

#[test]
fn should_spin_the_hologram() {
    let mut gallery = opened(ShaderMode::Hologram);
    gallery.tick(10.0);

    let mut expected = gallery.mesh().local;
    expected.set_rotation_euler(10.0f32 * 0.1, 0.0, 10.0f32 * 0.1);
    assert_eq!(gallery.mesh().local.rotation, expected.rotation);
    assert_eq!(
        gallery.mesh().world_transform().rotation,
        expected.rotation
    );
}

#[test]
fn should_swap_hologram_geometry_on_the_next_tick() {
    let mut gallery = opened(ShaderMode::Hologram);

    gallery
        .panel
        .set_value(Some("Hologram"), "geometry", ControlValue::Choice(2))
        .unwrap();
    assert_eq!(gallery.mesh().geometry(), hologram_geometry(0).as_ref());

    gallery.tick(0.1);
    assert_eq!(gallery.mesh().geometry(), Some(&GeometryDesc::cone(1.0, 1.0)));
}

#[test]
fn should_switch_shaders_from_the_keyboard() {
    let mut gallery = opened(ShaderMode::Smoke);

    let event = gallery.handle_key(&Key::Character("4".into()));

    assert_eq!(event, Some(PanelEvent::FolderOpened("Water".to_string())));
    assert_eq!(gallery.mode(), Some(ShaderMode::Water));
    assert_eq!(gallery.panel.open_folders(), vec!["Water"]);
}

#[test]
fn should_keep_controllers_bound_across_rebuilds() {
    let mut gallery = opened(ShaderMode::Water);
    gallery.transition(ShaderMode::Smoke);
    gallery.open(ShaderMode::Water);

    let folder = gallery.panel.folder("Water").unwrap();
    assert_eq!(folder.controllers.len(), 12);

    gallery
        .panel
        .set_value(Some("Water"), "uBigWavesFrequencyY", ControlValue::Number(2.0))
        .unwrap();
    assert_eq!(
        gallery.material().borrow().vec2("uBigWavesFrequency"),
        Some([4.0, 2.0])
    );
}

#[test]
fn should_expose_uniforms_that_belong_to_other_shaders_as_unbound() {
    let mut gallery = opened(ShaderMode::Smoke);
    gallery.open(ShaderMode::Water);
    gallery.open(ShaderMode::Smoke);

    // The water controllers exist but the uniforms are gone.
    let water = gallery.panel.folder_mut("Water").unwrap();
    let offset = water.controller_mut("uColorOffset").unwrap();
    assert_eq!(offset.value(), None);
}

fn camera_ray(ndc: [f32; 2]) -> Ray {
    let camera = Camera::new([0.0, 0.0, 5.0], [0.0, 0.0, 0.0]);
    let projection = Projection::new(800, 800, Deg(45.0), 0.1, 100.0);
    Ray::from_camera(ndc, &camera, &projection).expect("invertible camera")
}

#[test]
fn should_pick_the_placed_mesh() {
    let mut gallery = opened(ShaderMode::Smoke);
    gallery.tick(0.0);
    let data = gallery.mesh().geometry().expect("geometry").build();

    // 0.75 wide and 3 tall after scaling.
    assert!(gallery.hit_test(&camera_ray([0.0, 0.0]), &data).is_some());
    assert!(gallery.hit_test(&camera_ray([0.0, 0.6]), &data).is_some());
    assert_eq!(gallery.hit_test(&camera_ray([0.9, 0.0]), &data), None);
}

#[test]
fn should_not_pick_before_a_shader_is_selected() {
    let gallery = Gallery::new(GalleryConfig::default());
    let data = GeometryDesc::plane(1.0, 1.0, 1, 1).build();
    assert_eq!(gallery.hit_test(&camera_ray([0.0, 0.0]), &data), None);
}

#[test]
fn should_hover_and_click_the_mesh() {
    let mut gallery = opened(ShaderMode::Smoke);
    gallery.tick(0.0);
    let data = gallery.mesh().geometry().expect("geometry").build();
    assert_eq!(gallery.click(), None);

    let events = gallery.hover(Some(&camera_ray([0.0, 0.0])), Some(&data));
    assert_eq!(events, vec![PointerEvent::Enter(MESH_NAME.to_string())]);
    assert!(gallery.is_hovered());
    assert_eq!(gallery.click(), Some(PointerEvent::Click(MESH_NAME.to_string())));

    let events = gallery.hover(None, None);
    assert_eq!(events, vec![PointerEvent::Leave(MESH_NAME.to_string())]);
    assert!(!gallery.is_hovered());
}
