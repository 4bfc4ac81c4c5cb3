//! Scene graph and hierarchical scene organization.
//!
//! A scene is a tree of [`SceneNode`]s. Every node owns its children in order
//! and may reference a shared material. Children never hold on to their parent;
//! walking upwards is done by lookup from the root.

use log::warn;

use crate::data_structures::{
    geometry::GeometryDesc, material::MaterialHandle, transform::Transform,
};

/// What a node draws, if anything.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Pure transform node, only groups its children.
    Group,
    /// Indexed triangle mesh generated from a [`GeometryDesc`].
    Mesh(GeometryDesc),
    /// Point cloud with `count` points.
    Points { count: usize },
}

pub struct SceneNode {
    pub name: String,
    pub local: Transform,
    world: Transform,
    pub kind: NodeKind,
    pub material: Option<MaterialHandle>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            local: Transform::default(),
            world: Transform::default(),
            kind,
            material: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: &str) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: &str, geometry: GeometryDesc, material: MaterialHandle) -> Self {
        let mut node = Self::new(name, NodeKind::Mesh(geometry));
        node.material = Some(material);
        node
    }

    pub fn points(name: &str, count: usize) -> Self {
        Self::new(name, NodeKind::Points { count })
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    /// Removes the first direct child called `name`.
    pub fn remove_child(&mut self, name: &str) -> Option<SceneNode> {
        let idx = self.children.iter().position(|c| c.name == name)?;
        Some(self.children.remove(idx))
    }

    pub fn children(&self) -> &Vec<SceneNode> {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<SceneNode> {
        &mut self.children
    }

    pub fn world_transform(&self) -> &Transform {
        &self.world
    }

    /// Depth-first lookup by name, including `self`.
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(name))
    }

    /// Pre-order walk over the subtree.
    pub fn traverse(&self, visit: &mut dyn FnMut(&SceneNode)) {
        visit(self);
        for child in &self.children {
            child.traverse(visit);
        }
    }

    /**
     * Recomputes the world transform of this node and all of its descendants.
     * The root of a scene is updated with the identity as parent.
     */
    pub fn update_world_transforms(&mut self, parent: &Transform) {
        self.world = parent * &self.local;
        let world = self.world;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }

    pub fn update_world_transform_all(&mut self) {
        self.update_world_transforms(&Transform::default());
    }

    /// Swaps the geometry of a mesh node. Other node kinds are left untouched.
    pub fn set_geometry(&mut self, geometry: GeometryDesc) {
        match &mut self.kind {
            NodeKind::Mesh(current) => *current = geometry,
            other => warn!(
                "Tried to set geometry on node {} which is not a mesh ({:?}).",
                self.name, other
            ),
        }
    }

    pub fn geometry(&self) -> Option<&GeometryDesc> {
        match &self.kind {
            NodeKind::Mesh(geometry) => Some(geometry),
            _ => None,
        }
    }
}
