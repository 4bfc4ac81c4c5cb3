/**
 * This module contains all logic for loading meshes/textures/etc. from external files.
 *
 * Every loader is async: natively it reads from `./assets`, on the web it fetches
 * from `<origin>/assets`. Errors are returned to the caller, who logs them.
 */
pub mod texture;

use cgmath::{Matrix4, SquareMatrix};

use crate::data_structures::geometry::MeshData;
use texture::load_binary;

pub use texture::load_image;

/// Vertex positions (and colours, if the file has them) of every mesh in a file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshSource {
    pub positions: Vec<[f32; 3]>,
    pub colors: Option<Vec<[f32; 3]>>,
}

impl MeshSource {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl From<&MeshData> for MeshSource {
    fn from(mesh: &MeshData) -> Self {
        Self {
            positions: mesh.positions.clone(),
            colors: None,
        }
    }
}

/// Load the positions of all primitives in a glTF/GLB file, moved into scene space
/// by their node transforms. `COLOR_0` is kept when every primitive carries it.
pub async fn load_mesh_positions(file_name: &str) -> anyhow::Result<MeshSource> {
    let data = load_binary(file_name).await?;
    let gltf = gltf::Gltf::from_slice(&data)?;

    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                if let Some(blob) = gltf.blob.as_deref() {
                    buffer_data.push(blob.to_vec());
                }
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(uri).await?;
                buffer_data.push(bin);
            }
        }
    }

    let source = collect_positions(&gltf, &buffer_data);
    anyhow::ensure!(!source.is_empty(), "{} contains no vertex positions", file_name);
    log::info!("Loaded {} vertices from {}", source.len(), file_name);
    Ok(source)
}

fn collect_positions(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> MeshSource {
    let mut positions = Vec::new();
    let mut colors = Vec::new();
    let mut all_coloured = true;

    let roots: Vec<gltf::Node> = match gltf.default_scene().or_else(|| gltf.scenes().next()) {
        Some(scene) => scene.nodes().collect(),
        None => gltf.nodes().collect(),
    };
    let mut stack: Vec<(gltf::Node, Matrix4<f32>)> = roots
        .into_iter()
        .map(|node| (node, Matrix4::identity()))
        .collect();

    while let Some((node, parent)) = stack.pop() {
        let world = parent * Matrix4::from(node.transform().matrix());
        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|b| &b[..]));
                let Some(read) = reader.read_positions() else {
                    continue;
                };
                positions.extend(read.map(|p| {
                    let p = world * cgmath::Vector4::new(p[0], p[1], p[2], 1.0);
                    [p.x, p.y, p.z]
                }));
                match reader.read_colors(0) {
                    Some(read) => colors.extend(read.into_rgb_f32()),
                    None => all_coloured = false,
                }
                if colors.len() != positions.len() && all_coloured {
                    log::warn!(
                        "Mesh {} has a colour count that does not match its positions",
                        mesh.index()
                    );
                    all_coloured = false;
                }
            }
        }
        for child in node.children() {
            stack.push((child, world));
        }
    }

    MeshSource {
        positions,
        colors: all_coloured.then_some(colors),
    }
}
