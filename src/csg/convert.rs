// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh <-> solid-kernel buffer conversion

use crate::geometry::{Material, Mesh, Pose};
use crate::native::MeshBuffers;
use nalgebra::Point3;

/// Flatten a mesh into interleaved positions and triangle indices.
///
/// Vertex order and index correspondence are kept exactly; no validation is
/// done here.
pub fn to_native(mesh: &Mesh) -> MeshBuffers {
    MeshBuffers::new(
        mesh.vertices().iter().flat_map(|v| [v.x, v.y, v.z]).collect(),
        mesh.faces().iter().flatten().copied().collect(),
    )
}

/// Rebuild a mesh from kernel buffers with the default creation pose.
pub fn from_native(buffers: MeshBuffers) -> Mesh {
    Mesh::from_buffers_with(buffers, None, None)
}

impl Mesh {
    /// Rebuild a mesh from kernel buffers, carrying the given metadata.
    ///
    /// A missing pose is replaced by the default one. Trailing coordinates
    /// or indices that do not make up a whole vertex or triangle are ignored.
    pub fn from_buffers_with(buffers: MeshBuffers, pose: Option<Pose>, material: Option<Material>) -> Self {
        let vertices = buffers
            .positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        let faces = buffers.indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();

        let mut mesh = Mesh::new(vertices, faces).with_pose(pose.unwrap_or_default());
        mesh.set_material(material);
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Vector3;

    #[test]
    fn test_layout_is_interleaved() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 1.0, 2.0),
                Point3::new(3.0, 4.0, 5.0),
                Point3::new(6.0, 7.0, 8.0),
            ],
            vec![[2, 0, 1]],
        );
        let buffers = to_native(&mesh);
        assert_eq!(buffers.positions, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(buffers.indices, vec![2, 0, 1]);
    }

    #[test]
    fn test_from_native_preserves_order_and_sets_pose() {
        let cube = Primitive::cube(Vector3::new(2.0, 3.0, 4.0), false).to_mesh();
        let back = from_native(to_native(&cube));
        assert_eq!(back.vertices(), cube.vertices());
        assert_eq!(back.faces(), cube.faces());
        assert_eq!(back.pose(), Some(&Pose::default()));
        assert!(back.material().is_none());
    }

    #[test]
    fn test_from_buffers_with_keeps_metadata() {
        let pose = Pose::new(Point3::new(1.0, 2.0, 3.0), Vector3::y(), Vector3::z());
        let material = Material {
            color: [1.0, 0.0, 0.0, 1.0],
            ..Material::default()
        };
        let mesh = Mesh::from_buffers_with(MeshBuffers::default(), Some(pose), Some(material));
        assert_eq!(mesh.pose(), Some(&pose));
        assert_eq!(mesh.material(), Some(&material));
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_out_of_range_indices_pass_through() {
        let buffers = MeshBuffers::new(vec![0.0; 9], vec![0, 1, 9]);
        let mesh = from_native(buffers);
        assert_eq!(mesh.faces(), &[[0, 1, 9]]);
        assert!(!mesh.indices_in_range());
    }
}
