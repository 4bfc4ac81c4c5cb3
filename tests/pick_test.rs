use cgmath::{Deg, Matrix4, Point3, SquareMatrix, Vector3};
use flow_gpgpu::{
    camera::{Camera, Projection},
    data_structures::geometry::GeometryDesc,
    pick::{Hover, PointerEvent, Ray},
};

fn ray(ndc: [f32; 2]) -> Ray {
    let camera = Camera::new([0.0, 0.0, 5.0], [0.0, 0.0, 0.0]);
    let projection = Projection::new(800, 800, Deg(45.0), 0.1, 100.0);
    Ray::from_camera(ndc, &camera, &projection).expect("invertible camera")
}

#[test]
fn should_shoot_through_the_screen_centre_towards_the_target() {
    let ray = ray([0.0, 0.0]);
    assert!(ray.origin.x.abs() < 1e-4 && ray.origin.y.abs() < 1e-4);
    assert!(ray.origin.z < 5.0 && ray.origin.z > 4.8);
    assert!(ray.direction.x.abs() < 1e-4 && ray.direction.y.abs() < 1e-4);
    assert!((ray.direction.z + 1.0).abs() < 1e-4);
}

#[test]
fn should_hit_a_triangle_in_front_only() {
    let ray = Ray {
        origin: Point3::new(0.2, 0.2, 1.0),
        direction: Vector3::new(0.0, 0.0, -1.0),
    };
    let a = Point3::new(0.0, 0.0, 0.0);
    let b = Point3::new(1.0, 0.0, 0.0);
    let c = Point3::new(0.0, 1.0, 0.0);

    let t = ray.intersect_triangle(a, b, c).expect("hit");
    assert!((t - 1.0).abs() < 1e-5);
    // Winding does not matter.
    assert!(ray.intersect_triangle(a, c, b).is_some());

    let behind = Ray {
        direction: Vector3::new(0.0, 0.0, 1.0),
        ..ray
    };
    assert_eq!(behind.intersect_triangle(a, b, c), None);
}

#[test]
fn should_hit_a_plane_facing_the_camera() {
    let plane = GeometryDesc::plane(1.0, 1.0, 1, 1).build();
    let distance = ray([0.0, 0.0])
        .intersect_mesh(&plane, &Matrix4::identity())
        .expect("hit");
    assert!((distance - 5.0).abs() < 0.15);
    assert_eq!(ray([0.9, 0.9]).intersect_mesh(&plane, &Matrix4::identity()), None);
}

#[test]
fn should_test_against_the_placed_mesh() {
    let plane = GeometryDesc::plane(1.0, 1.0, 1, 1).build();
    let off_centre = ray([0.3, 0.0]);

    assert_eq!(off_centre.intersect_mesh(&plane, &Matrix4::identity()), None);
    assert!(
        off_centre
            .intersect_mesh(&plane, &Matrix4::from_scale(4.0))
            .is_some()
    );

    let closer = ray([0.0, 0.0])
        .intersect_mesh(&plane, &Matrix4::from_translation(Vector3::new(0.0, 0.0, 1.0)))
        .expect("hit");
    assert!((closer - 4.0).abs() < 0.15);
}

#[test]
fn should_report_enter_and_leave_once() {
    let mut hover = Hover::default();
    assert!(hover.update(None).is_empty());

    assert_eq!(hover.update(Some("mesh")), vec![PointerEvent::Enter("mesh".into())]);
    assert!(hover.update(Some("mesh")).is_empty());
    assert!(hover.is_hovering());

    assert_eq!(
        hover.update(Some("other")),
        vec![
            PointerEvent::Leave("mesh".into()),
            PointerEvent::Enter("other".into())
        ]
    );
    assert_eq!(hover.update(None), vec![PointerEvent::Leave("other".into())]);
    assert_eq!(hover.current(), None);
}

#[test]
fn should_click_only_what_is_hovered() {
    let mut hover = Hover::default();
    assert_eq!(hover.click(), None);
    hover.update(Some("mesh"));
    assert_eq!(hover.click(), Some(PointerEvent::Click("mesh".into())));
}
