//! CPU-side mesh data and primitive generators.
//!
//! All primitives are unit-sized and centred on the origin; scene objects
//! scale and place them with their model matrix.

use std::f32::consts::{PI, TAU};

/// Per-vertex data uploaded to the GPU vertex buffer.
/// Must match the vertex inputs of `room.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// The shared primitive set. Discriminants index `MeshKind::ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Cube,
    Quad,
    Sphere,
    Cylinder,
    Torus,
}

impl MeshKind {
    pub const ALL: [MeshKind; 5] = [
        MeshKind::Cube,
        MeshKind::Quad,
        MeshKind::Sphere,
        MeshKind::Cylinder,
        MeshKind::Torus,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn build(self) -> MeshData {
        match self {
            MeshKind::Cube => cuboid(),
            MeshKind::Quad => quad(),
            MeshKind::Sphere => uv_sphere(48, 24),
            MeshKind::Cylinder => cylinder(32),
            MeshKind::Torus => torus(0.06, 40, 12),
        }
    }
}

impl MeshData {
    fn push_face(&mut self, n: [f32; 3], u: [f32; 3], v: [f32; 3], offset: f32) {
        let base = self.vertices.len() as u32;
        let corners = [
            (-1.0, -1.0, [0.0, 1.0]),
            (1.0, -1.0, [1.0, 1.0]),
            (1.0, 1.0, [1.0, 0.0]),
            (-1.0, 1.0, [0.0, 0.0]),
        ];
        for (su, sv, uv) in corners {
            let pos = [
                n[0] * offset + 0.5 * (u[0] * su + v[0] * sv),
                n[1] * offset + 0.5 * (u[1] * su + v[1] * sv),
                n[2] * offset + 0.5 * (u[2] * su + v[2] * sv),
            ];
            self.vertices.push(Vertex { pos, normal: n, uv });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Unit cube, [-0.5, 0.5]^3, one quad per face.
pub fn cuboid() -> MeshData {
    // (normal, u, v) with u x v = normal.
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    let mut mesh = MeshData::default();
    for (n, u, v) in FACES {
        mesh.push_face(n, u, v, 0.5);
    }
    mesh
}

/// Unit square in the XY plane facing +Z.
pub fn quad() -> MeshData {
    let mut mesh = MeshData::default();
    mesh.push_face([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], 0.0);
    mesh
}

/// Unit-radius UV sphere. `u` wraps once around +Y, `v` runs pole to pole.
pub fn uv_sphere(segments: u32, rings: u32) -> MeshData {
    let mut mesh = MeshData::default();
    for r in 0..=rings {
        let phi = PI * r as f32 / rings as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for s in 0..=segments {
            let theta = TAU * s as f32 / segments as f32;
            let (sin_t, cos_t) = theta.sin_cos();
            let p = [sin_phi * cos_t, cos_phi, sin_phi * sin_t];
            mesh.vertices.push(Vertex {
                pos: p,
                normal: p,
                uv: [s as f32 / segments as f32, r as f32 / rings as f32],
            });
        }
    }
    let stride = segments + 1;
    for r in 0..rings {
        for s in 0..segments {
            let a = r * stride + s;
            let b = a + stride;
            mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    mesh
}

/// Unit-radius cylinder along Y, height 1, capped.
pub fn cylinder(segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    for s in 0..=segments {
        let t = s as f32 / segments as f32;
        let (sin_t, cos_t) = (TAU * t).sin_cos();
        let normal = [cos_t, 0.0, sin_t];
        mesh.vertices.push(Vertex { pos: [cos_t, -0.5, sin_t], normal, uv: [t, 1.0] });
        mesh.vertices.push(Vertex { pos: [cos_t, 0.5, sin_t], normal, uv: [t, 0.0] });
    }
    for s in 0..segments {
        let a = s * 2;
        mesh.indices.extend_from_slice(&[a, a + 2, a + 1, a + 1, a + 2, a + 3]);
    }

    for (y, ny) in [(0.5f32, 1.0f32), (-0.5, -1.0)] {
        let centre = mesh.vertices.len() as u32;
        mesh.vertices.push(Vertex { pos: [0.0, y, 0.0], normal: [0.0, ny, 0.0], uv: [0.5, 0.5] });
        for s in 0..=segments {
            let (sin_t, cos_t) = (TAU * s as f32 / segments as f32).sin_cos();
            mesh.vertices.push(Vertex {
                pos: [cos_t, y, sin_t],
                normal: [0.0, ny, 0.0],
                uv: [0.5 + 0.5 * cos_t, 0.5 + 0.5 * sin_t],
            });
        }
        for s in 0..segments {
            mesh.indices
                .extend_from_slice(&[centre, centre + 1 + s, centre + 2 + s]);
        }
    }
    mesh
}

/// Torus in the XZ plane with major radius 1.
pub fn torus(minor: f32, major_segments: u32, minor_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    for i in 0..=major_segments {
        let u = TAU * i as f32 / major_segments as f32;
        let (sin_u, cos_u) = u.sin_cos();
        for j in 0..=minor_segments {
            let v = TAU * j as f32 / minor_segments as f32;
            let (sin_v, cos_v) = v.sin_cos();
            let ring = 1.0 + minor * cos_v;
            mesh.vertices.push(Vertex {
                pos: [ring * cos_u, minor * sin_v, ring * sin_u],
                normal: [cos_v * cos_u, sin_v, cos_v * sin_u],
                uv: [
                    i as f32 / major_segments as f32,
                    j as f32 / minor_segments as f32,
                ],
            });
        }
    }
    let stride = minor_segments + 1;
    for i in 0..major_segments {
        for j in 0..minor_segments {
            let a = i * stride + j;
            let b = a + stride;
            mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(mesh: &MeshData) {
        assert!(!mesh.indices.is_empty());
        assert_eq!(mesh.indices.len() % 3, 0);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
        for v in &mesh.vertices {
            let len = (v.normal[0].powi(2) + v.normal[1].powi(2) + v.normal[2].powi(2)).sqrt();
            assert!((len - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn every_primitive_is_well_formed() {
        for kind in MeshKind::ALL {
            check(&kind.build());
        }
    }

    #[test]
    fn discriminants_index_all() {
        for (i, kind) in MeshKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn cube_spans_unit_box() {
        let cube = cuboid();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        for v in &cube.vertices {
            assert!(v.pos.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn sphere_vertices_on_unit_radius() {
        let s = uv_sphere(8, 4);
        assert_eq!(s.vertices.len(), 9 * 5);
        assert_eq!(s.indices.len(), (8 * 4 * 6) as usize);
        for v in &s.vertices {
            let r = (v.pos[0].powi(2) + v.pos[1].powi(2) + v.pos[2].powi(2)).sqrt();
            assert!((r - 1.0).abs() < 1e-5);
        }
    }
}
