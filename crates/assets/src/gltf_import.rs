use crate::mesh::MeshData;
use crate::store::AssetError;
use glam::{Mat3, Mat4, Vec3};
use std::path::Path;

/// One decoded glTF primitive with node transforms baked into its vertices.
#[derive(Debug, Clone)]
pub struct ImportedPrimitive {
    pub mesh: MeshData,
    pub base_color: [f32; 4],
}

/// Decode every mesh primitive reachable from the scenes of a glTF/GLB file.
///
/// Does not touch any [`crate::AssetStore`], so it can run on a worker thread.
pub fn read_gltf(path: impl AsRef<Path>) -> Result<Vec<ImportedPrimitive>, AssetError> {
    let path = path.as_ref();
    let _span = tracing::info_span!("gltf_import", path = %path.display()).entered();

    let (document, buffers, _images) = gltf::import(path).map_err(|source| AssetError::Gltf {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        scenes = document.scenes().count(),
        nodes = document.nodes().count(),
        meshes = document.meshes().count(),
        "glTF parsed"
    );

    let mut out = Vec::new();
    for scene in document.scenes() {
        for node in scene.nodes() {
            visit_node(&node, &buffers, Mat4::IDENTITY, &mut out)?;
        }
    }

    tracing::info!("imported {} primitives from {}", out.len(), path.display());
    Ok(out)
}

fn visit_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent: Mat4,
    out: &mut Vec<ImportedPrimitive>,
) -> Result<(), AssetError> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        read_mesh(&mesh, buffers, world, out)?;
    }
    for child in node.children() {
        visit_node(&child, buffers, world, out)?;
    }
    Ok(())
}

fn read_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: Mat4,
    out: &mut Vec<ImportedPrimitive>,
) -> Result<(), AssetError> {
    let mesh_name = mesh.name().unwrap_or("unnamed").to_string();
    let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();

    for (i, primitive) in mesh.primitives().enumerate() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| AssetError::MissingPositions {
                mesh: mesh_name.clone(),
            })?
            .map(|p| transform.transform_point3(Vec3::from(p)).to_array())
            .collect();
        if positions.is_empty() {
            continue;
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
            Some(uvs) => uvs.into_f32().collect(),
            None => vec![[0.0, 0.0]; positions.len()],
        };

        let mut data = MeshData {
            name: format!("{mesh_name}_{i}"),
            positions,
            normals: Vec::new(),
            uvs,
            indices,
        };

        match reader.read_normals() {
            Some(normals) => {
                data.normals = normals
                    .map(|n| {
                        (normal_matrix * Vec3::from(n))
                            .try_normalize()
                            .unwrap_or(Vec3::Y)
                            .to_array()
                    })
                    .collect();
            }
            None => data.compute_normals(),
        }

        let base_color = primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_factor();

        out.push(ImportedPrimitive {
            mesh: data,
            base_color,
        });
    }
    Ok(())
}
