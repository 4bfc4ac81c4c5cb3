use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use flow_gpgpu::{
    data_structures::material::{Color, Material, UniformValue},
    debug_panel::{Axis, Binding, ControlValue, Controller, Panel, PanelEvent},
};
use winit::keyboard::{Key, NamedKey};

fn key(c: &str) -> Key {
    Key::Character(c.into())
}

#[test]
fn should_read_back_what_was_written() {
    let cell = Rc::new(Cell::new(0.5));
    let mut slider = Controller::slider("uSize", Binding::cell(cell.clone()), 0.0, 1.0, 0.001);

    let written = slider.set_value(ControlValue::Number(0.25)).unwrap();

    assert_eq!(written, ControlValue::Number(0.25));
    assert_eq!(cell.get(), 0.25);
    assert_eq!(slider.value(), Some(ControlValue::Number(0.25)));
}

#[test]
fn should_reflect_direct_writes_to_the_bound_field() {
    let material = Material::new()
        .with("uGlitchStrength", UniformValue::Float(1.0))
        .shared();
    let slider = Controller::slider(
        "uGlitchStrength",
        Binding::uniform(&material, "uGlitchStrength"),
        0.0,
        1.0,
        0.001,
    );

    material
        .borrow_mut()
        .set("uGlitchStrength", UniformValue::Float(0.3));

    assert_eq!(slider.value(), Some(ControlValue::Number(0.3)));
}

#[test]
fn should_clamp_slider_values_to_the_range() {
    let cell = Rc::new(Cell::new(0.0));
    let mut slider = Controller::slider("uFlowFieldStrength", Binding::cell(cell.clone()), 0.0, 10.0, 0.001);

    assert_eq!(slider.set_value(ControlValue::Number(42.0)).unwrap(), ControlValue::Number(10.0));
    assert_eq!(slider.set_value(ControlValue::Number(-1.0)).unwrap(), ControlValue::Number(0.0));
    assert_eq!(cell.get(), 0.0);
}

#[test]
fn should_write_off_grid_values_exactly() {
    let cell = Rc::new(Cell::new(0.0));
    let mut slider = Controller::slider("uColorMultiplier", Binding::cell(cell.clone()), 0.0, 10.0, 0.001);

    let written = slider.set_value(ControlValue::Number(2.5005)).unwrap();

    assert_eq!(written, ControlValue::Number(2.5005));
    assert_eq!(cell.get(), 2.5005);
}

#[test]
fn should_snap_keyboard_steps_to_the_grid() {
    let cell = Rc::new(Cell::new(0.0));
    let mut slider = Controller::slider("uSmallWavesIteration", Binding::cell(cell.clone()), 0.0, 5.0, 1.0);

    slider.set_value(ControlValue::Number(2.6)).unwrap();
    assert_eq!(cell.get(), 2.6);

    slider.step(true).unwrap();
    assert_eq!(cell.get(), 4.0);
    slider.step(true).unwrap();
    slider.step(true).unwrap();
    assert_eq!(cell.get(), 5.0);
}

#[test]
fn should_write_one_component_of_a_vec2_uniform() {
    let material = Material::new()
        .with("uFrequency", UniformValue::Vec2([10.0, 5.0]))
        .shared();
    let mut y = Controller::slider(
        "uFrequencyY",
        Binding::uniform_component(&material, "uFrequency", Axis::Y),
        0.0,
        20.0,
        0.01,
    );

    y.set_value(ControlValue::Number(7.5)).unwrap();

    assert_eq!(material.borrow().vec2("uFrequency"), Some([10.0, 7.5]));
}

#[test]
fn should_fail_when_the_bound_uniform_is_gone() {
    let material = Material::new()
        .with("uColorOffset", UniformValue::Float(0.08))
        .shared();
    let mut slider = Controller::slider(
        "uColorOffset",
        Binding::uniform(&material, "uColorOffset"),
        0.0,
        1.0,
        0.001,
    );

    material.borrow_mut().clear_uniforms();

    assert_eq!(slider.value(), None);
    assert!(slider.set_value(ControlValue::Number(0.5)).is_err());
}

#[test]
fn should_reject_values_of_the_wrong_kind() {
    let mut slider = Controller::slider("uSize", Binding::cell(Rc::new(Cell::new(0.0))), 0.0, 1.0, 0.001);
    assert!(slider.set_value(ControlValue::Bool(true)).is_err());
}

#[test]
fn should_run_change_callbacks_in_order() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let (on_change, on_finish) = (calls.clone(), calls.clone());
    let mut color = Controller::color("smokeColor", Binding::color_cell(Rc::new(Cell::new(Color::WHITE))))
        .on_change(move |v| on_change.borrow_mut().push(format!("change {}", v)))
        .on_finish_change(move |v| on_finish.borrow_mut().push(format!("finish {}", v)));

    color
        .set_value(ControlValue::Color(Color::from_hex("#3f78d5").unwrap()))
        .unwrap();

    assert_eq!(*calls.borrow(), vec!["change #3f78d5", "finish #3f78d5"]);
}

#[test]
fn should_cycle_through_options() {
    let choice = Rc::new(Cell::new(0));
    let mut options = Controller::options(
        "geometry",
        Binding::choice(choice.clone()),
        &[("TorusKnot", 0), ("Sphere", 1), ("Cone", 2)],
    );

    options.step(true).unwrap();
    assert_eq!(choice.get(), 1);
    options.step(false).unwrap();
    options.step(false).unwrap();
    assert_eq!(choice.get(), 2);
    assert!(options.set_value(ControlValue::Choice(7)).is_err());
}

#[test]
fn should_flip_toggles() {
    let flag = Rc::new(Cell::new(false));
    let mut toggle = Controller::toggle("wireframe", Binding::flag(flag.clone()));
    toggle.step(true).unwrap();
    assert!(flag.get());
}

#[test]
fn should_keep_only_one_folder_open_when_exclusive() {
    let mut panel = Panel::new("shaders").with_exclusive_folders();
    panel.add_folder("Water");
    panel.add_folder("Smoke");

    assert_eq!(panel.open_folder("Water"), Some("Water".to_string()));
    assert_eq!(panel.open_folder("Smoke"), Some("Smoke".to_string()));
    assert_eq!(panel.open_folders(), vec!["Smoke"]);

    // Already open: nothing to report.
    assert_eq!(panel.open_folder("Smoke"), None);
    assert_eq!(panel.open_folder("Missing"), None);
}

#[test]
fn should_allow_several_open_folders_by_default() {
    let mut panel = Panel::new("debug");
    panel.add_folder("a");
    panel.add_folder("b");
    panel.open_folder("a");
    panel.open_folder("b");
    assert_eq!(panel.open_folders(), vec!["a", "b"]);
}

#[test]
fn should_reuse_folders_with_the_same_title() {
    let mut panel = Panel::new("debug");
    panel
        .add_folder("a")
        .add(Controller::toggle("x", Binding::flag(Rc::new(Cell::new(false)))));
    panel.add_folder("a");
    assert_eq!(panel.folders.len(), 1);
    assert!(!panel.folder("a").unwrap().is_empty());
}

#[test]
fn should_toggle_visibility_with_h() {
    let mut panel = Panel::new("debug");
    assert!(panel.is_visible());

    assert_eq!(panel.handle_key(&key("h")), Some(PanelEvent::VisibilityChanged(false)));
    assert!(!panel.is_visible());
    assert_eq!(panel.handle_key(&key("H")), Some(PanelEvent::VisibilityChanged(true)));
}

#[test]
fn should_ignore_keys_while_hidden() {
    let mut panel = Panel::new("debug");
    panel.add(Controller::slider("uSize", Binding::cell(Rc::new(Cell::new(0.4))), 0.0, 1.0, 0.001));
    panel.add_folder("a");
    panel.toggle_visibility();

    assert_eq!(panel.handle_key(&Key::Named(NamedKey::Tab)), None);
    assert_eq!(panel.handle_key(&key("1")), None);
    assert!(panel.open_folders().is_empty());
}

#[test]
fn should_focus_and_step_with_the_keyboard() {
    let size = Rc::new(Cell::new(0.4));
    let mut panel = Panel::new("particles");
    panel.add(Controller::slider("uSize", Binding::cell(size.clone()), 0.0, 1.0, 0.1));

    assert_eq!(
        panel.handle_key(&Key::Named(NamedKey::Tab)),
        Some(PanelEvent::Focused("uSize".to_string()))
    );
    assert_eq!(panel.focused(), Some("uSize"));

    panel.handle_key(&Key::Named(NamedKey::ArrowUp));
    assert!((size.get() - 0.5).abs() < 1e-6);
    panel.handle_key(&Key::Named(NamedKey::ArrowDown));
    panel.handle_key(&Key::Named(NamedKey::ArrowDown));
    assert!((size.get() - 0.3).abs() < 1e-6);
}

#[test]
fn should_only_focus_controllers_in_open_folders() {
    let mut panel = Panel::new("shaders");
    panel
        .add_folder("a")
        .add(Controller::toggle("inside", Binding::flag(Rc::new(Cell::new(false)))));

    assert_eq!(panel.handle_key(&Key::Named(NamedKey::Tab)), None);

    panel.open_folder("a");
    assert_eq!(
        panel.handle_key(&Key::Named(NamedKey::Tab)),
        Some(PanelEvent::Focused("inside".to_string()))
    );

    panel.close_folder("a");
    assert_eq!(panel.focused(), None);
}

#[test]
fn should_open_folders_with_digit_keys() {
    let mut panel = Panel::new("shaders").with_exclusive_folders();
    panel.add_folder("Water");
    panel.add_folder("Smoke");

    assert_eq!(
        panel.handle_key(&key("2")),
        Some(PanelEvent::FolderOpened("Smoke".to_string()))
    );
    assert_eq!(panel.handle_key(&key("9")), None);
    assert_eq!(panel.handle_key(&key("0")), None);
    assert_eq!(panel.open_folders(), vec!["Smoke"]);
}

#[test]
fn should_set_values_by_path() {
    let material = Material::new()
        .with("uSmokeColor", UniformValue::Color(Color::WHITE))
        .shared();
    let mut panel = Panel::new("shaders");
    panel
        .add_folder("Smoke")
        .add(Controller::color("smokeColor", Binding::uniform(&material, "uSmokeColor")));

    let red = Color::new(1.0, 0.0, 0.0);
    panel
        .set_value(Some("Smoke"), "smokeColor", ControlValue::Color(red))
        .unwrap();

    assert_eq!(material.borrow().color("uSmokeColor"), Some(red));
    assert!(panel.set_value(None, "smokeColor", ControlValue::Color(red)).is_err());
}

#[test]
fn should_lay_out_the_visible_panel_as_text() {
    let material = Material::new()
        .with("uUpperFalloff", UniformValue::Float(0.25))
        .shared();
    let mut panel = Panel::new("shaders").with_exclusive_folders();
    panel.add(Controller::slider("uSize", Binding::cell(Rc::new(Cell::new(0.4))), 0.0, 1.0, 0.001));
    panel
        .add_folder("Water")
        .add(Controller::toggle("hidden", Binding::flag(Rc::new(Cell::new(true)))));
    panel
        .add_folder("Hologram")
        .add(Controller::slider("uUpperFalloff", Binding::uniform(&material, "uUpperFalloff"), 0.0, 1.0, 0.001))
        .add(Controller::options(
            "geometry",
            Binding::choice(Rc::new(Cell::new(1))),
            &[("TorusKnot", 0), ("Sphere", 1)],
        ));
    panel.open_folder("Hologram");
    panel.handle_key(&Key::Named(NamedKey::Tab));

    let text = panel.overlay_text().unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "shaders");
    assert_eq!(lines[1], ">  uSize: 0.400");
    assert_eq!(lines[2].trim(), "+ [1] Water");
    assert_eq!(lines[3].trim(), "- [2] Hologram");
    assert_eq!(lines[4].trim(), "uUpperFalloff: 0.250");
    assert_eq!(lines[5].trim(), "geometry: Sphere");
    assert!(!text.contains("hidden"));
}

#[test]
fn should_not_lay_out_a_hidden_panel() {
    let mut panel = Panel::new("debug");
    assert!(panel.overlay_text().is_some());

    panel.handle_key(&key("h"));

    assert_eq!(panel.overlay_text(), None);
}

#[test]
fn should_follow_direct_writes_in_the_text_layout() {
    let cell = Rc::new(Cell::new(0.1));
    let mut panel = Panel::new("particles");
    panel.add(Controller::slider("uFlowFieldStrength", Binding::cell(cell.clone()), 0.0, 10.0, 0.001));

    cell.set(3.5);

    assert!(panel.overlay_text().unwrap().contains("uFlowFieldStrength: 3.500"));
    panel.set_value(None, "uFlowFieldStrength", ControlValue::Number(7.25)).unwrap();
    assert!(panel.overlay_text().unwrap().contains("uFlowFieldStrength: 7.250"));
}
