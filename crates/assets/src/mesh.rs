use glam::Vec3;
use std::f32::consts::PI;

/// CPU-side triangle mesh. Indices are counter-clockwise when seen from the
/// side the normals point to.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// UV sphere. `segments` latitude bands and twice as many longitude bands.
    pub fn sphere(name: &str, diameter: f32, segments: u32) -> Self {
        let radius = diameter * 0.5;
        let lat = segments.max(2);
        let lon = lat * 2;

        let mut positions = Vec::with_capacity(((lat + 1) * (lon + 1)) as usize);
        let mut normals = Vec::with_capacity(positions.capacity());
        let mut uvs = Vec::with_capacity(positions.capacity());

        for i in 0..=lat {
            let theta = i as f32 * PI / lat as f32;
            for j in 0..=lon {
                let phi = j as f32 * 2.0 * PI / lon as f32;
                let n = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
                positions.push((n * radius).to_array());
                normals.push(n.to_array());
                uvs.push([j as f32 / lon as f32, i as f32 / lat as f32]);
            }
        }

        let mut indices = Vec::with_capacity((lat * lon * 6) as usize);
        for i in 0..lat {
            for j in 0..lon {
                let a = i * (lon + 1) + j;
                let b = a + lon + 1;
                indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
            }
        }

        Self {
            name: name.into(),
            positions,
            normals,
            uvs,
            indices,
        }
    }

    /// Axis-aligned cube centred on the origin with edge length `size`.
    pub fn cuboid(name: &str, size: f32) -> Self {
        let p = size * 0.5;
        // (normal, four corners counter-clockwise from outside)
        #[rustfmt::skip]
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([0.0, 0.0, 1.0],  [[-p, -p,  p], [ p, -p,  p], [ p,  p,  p], [-p,  p,  p]]),
            ([0.0, 0.0, -1.0], [[ p, -p, -p], [-p, -p, -p], [-p,  p, -p], [ p,  p, -p]]),
            ([1.0, 0.0, 0.0],  [[ p, -p,  p], [ p, -p, -p], [ p,  p, -p], [ p,  p,  p]]),
            ([-1.0, 0.0, 0.0], [[-p, -p, -p], [-p, -p,  p], [-p,  p,  p], [-p,  p, -p]]),
            ([0.0, 1.0, 0.0],  [[-p,  p,  p], [ p,  p,  p], [ p,  p, -p], [-p,  p, -p]]),
            ([0.0, -1.0, 0.0], [[-p, -p, -p], [ p, -p, -p], [ p, -p,  p], [-p, -p,  p]]),
        ];
        let corner_uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

        let mut mesh = Self {
            name: name.into(),
            positions: Vec::with_capacity(24),
            normals: Vec::with_capacity(24),
            uvs: Vec::with_capacity(24),
            indices: Vec::with_capacity(36),
        };
        for (normal, corners) in faces {
            let base = mesh.positions.len() as u32;
            for (corner, uv) in corners.iter().zip(corner_uvs) {
                mesh.positions.push(*corner);
                mesh.normals.push(normal);
                mesh.uvs.push(uv);
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        mesh
    }

    /// Square in the XY plane facing -Z.
    pub fn plane(name: &str, size: f32) -> Self {
        let p = size * 0.5;
        Self {
            name: name.into(),
            positions: vec![[p, -p, 0.0], [-p, -p, 0.0], [-p, p, 0.0], [p, p, 0.0]],
            normals: vec![[0.0, 0.0, -1.0]; 4],
            uvs: vec![[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }

    /// Replace normals with area-weighted averages of the adjacent face normals.
    pub fn compute_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (Some(pa), Some(pb), Some(pc)) = (
                self.positions.get(a),
                self.positions.get(b),
                self.positions.get(c),
            ) else {
                continue;
            };
            let (pa, pb, pc) = (Vec3::from(*pa), Vec3::from(*pb), Vec3::from(*pc));
            let face = (pb - pa).cross(pc - pa);
            acc[a] += face;
            acc[b] += face;
            acc[c] += face;
        }
        self.normals = acc
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(mesh: &MeshData, tri: usize) -> Vec3 {
        let i = &mesh.indices[tri * 3..tri * 3 + 3];
        let p = |k: usize| Vec3::from(mesh.positions[i[k] as usize]);
        (p(1) - p(0)).cross(p(2) - p(0))
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = MeshData::sphere("wisp", 1.0, 32);
        assert_eq!(mesh.vertex_count(), 33 * 65);
        assert_eq!(mesh.index_count(), 32 * 64 * 6);
        for p in &mesh.positions {
            assert!((Vec3::from(*p).length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn sphere_winding_faces_outward() {
        let mesh = MeshData::sphere("wisp", 2.0, 8);
        // a triangle just above the equator at phi = 0
        let tri = (3 * 16) * 2;
        let centroid: Vec3 = mesh.indices[tri * 3..tri * 3 + 3]
            .iter()
            .map(|i| Vec3::from(mesh.positions[*i as usize]))
            .sum::<Vec3>()
            / 3.0;
        assert!(face_normal(&mesh, tri).dot(centroid) > 0.0);
    }

    #[test]
    fn cube_has_outward_faces() {
        let mesh = MeshData::cuboid("box", 2.0);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        for tri in 0..12 {
            let n = face_normal(&mesh, tri).normalize();
            let stored = Vec3::from(mesh.normals[mesh.indices[tri * 3] as usize]);
            assert!((n - stored).length() < 1e-5, "triangle {tri}");
        }
    }

    #[test]
    fn plane_faces_negative_z() {
        let mesh = MeshData::plane("bg", 10.0);
        assert!(face_normal(&mesh, 0).normalize().z < -0.99);
    }

    #[test]
    fn computed_normals_match_winding() {
        let mut mesh = MeshData {
            name: "tri".into(),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: vec![0, 1, 2],
        };
        mesh.compute_normals();
        assert_eq!(mesh.normals.len(), 3);
        assert!((Vec3::from(mesh.normals[0]) - Vec3::Z).length() < 1e-6);
    }
}
