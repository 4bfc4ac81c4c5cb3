//! Pointer picking.
//!
//! Picking works on the CPU, in three steps:
//! 1. the [`Viewport`](crate::viewport::Viewport) maps the pointer to normalized device coordinates
//! 2. [`Ray::from_camera`] unprojects them into a world-space ray
//! 3. the ray is moved into a mesh's local space and tested against its triangles at rest
//!
//! [`Hover`] turns the per-move hit test into enter / leave events, and a click
//! is reported for whatever is hovered when the button goes down.
//!
//! Vertex displacement done in shaders (waves, wind, glitches) is not seen by
//! the hit test.

use cgmath::{InnerSpace, Matrix4, Point3, SquareMatrix, Transform as _, Vector3, Vector4};

use crate::{
    camera::{Camera, Projection},
    data_structures::geometry::MeshData,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// The ray from the near plane through `ndc` (`-1..1` on both axes, +y up).
    /// `None` if the camera matrices cannot be inverted.
    pub fn from_camera(ndc: [f32; 2], camera: &Camera, projection: &Projection) -> Option<Self> {
        let inverse = (projection.calc_matrix() * camera.calc_matrix()).invert()?;
        let unproject = |depth: f32| {
            let p = inverse * Vector4::new(ndc[0], ndc[1], depth, 1.0);
            (p.w.abs() > f32::EPSILON).then(|| Point3::new(p.x / p.w, p.y / p.w, p.z / p.w))
        };
        let near = unproject(0.0)?;
        let direction = unproject(1.0)? - near;
        if direction.magnitude2() <= f32::EPSILON {
            return None;
        }
        Some(Self {
            origin: near,
            direction: direction.normalize(),
        })
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Ray parameter of the hit with triangle `abc`, front or back face.
    pub fn intersect_triangle(
        &self,
        a: Point3<f32>,
        b: Point3<f32>,
        c: Point3<f32>,
    ) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < 1e-9 {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(q) * inv_det;
        (t > 0.0).then_some(t)
    }

    /// World-space distance to the nearest triangle of `mesh` placed by `model`.
    pub fn intersect_mesh(&self, mesh: &MeshData, model: &Matrix4<f32>) -> Option<f32> {
        let inverse = model.invert()?;
        let local = Ray {
            origin: inverse.transform_point(self.origin),
            direction: inverse.transform_vector(self.direction),
        };
        let vertex = |i: u32| mesh.positions.get(i as usize).map(|p| Point3::from(*p));
        let t = mesh
            .indices
            .chunks_exact(3)
            .filter_map(|tri| local.intersect_triangle(vertex(tri[0])?, vertex(tri[1])?, vertex(tri[2])?))
            .min_by(f32::total_cmp)?;
        Some((model.transform_point(local.at(t)) - self.origin).magnitude())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerEvent {
    Enter(String),
    Leave(String),
    Click(String),
}

/// Which object the pointer is over.
#[derive(Debug, Default)]
pub struct Hover {
    current: Option<String>,
}

impl Hover {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_hovering(&self) -> bool {
        self.current.is_some()
    }

    /// Record the object under the pointer. Leaving one object for another
    /// reports the leave first.
    pub fn update(&mut self, hit: Option<&str>) -> Vec<PointerEvent> {
        if self.current.as_deref() == hit {
            return Vec::new();
        }
        let mut events = Vec::new();
        if let Some(previous) = self.current.take() {
            events.push(PointerEvent::Leave(previous));
        }
        if let Some(name) = hit {
            events.push(PointerEvent::Enter(name.to_string()));
            self.current = Some(name.to_string());
        }
        events
    }

    /// A press of the primary button: clicks whatever is hovered.
    pub fn click(&self) -> Option<PointerEvent> {
        self.current.clone().map(PointerEvent::Click)
    }
}
