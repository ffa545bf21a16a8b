//! Triangle mesh data and procedural primitives.
//!
//! UVs follow the bottom-left origin convention of the model files; the
//! shaders flip `v` when sampling.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

/// Interleaved vertex layout shared by every mesh pipeline.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

impl Vertex {
    /// Build a vertex from glam vectors.
    #[must_use]
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }

    /// Vertex buffer layout: position, normal, uv.
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2,
        ];
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex array.
    pub vertices: Vec<Vertex>,
    /// Triangle indices, three per face.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// A mesh with no triangles (used as the failed-load placeholder).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether there is anything to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Recompute smooth normals by accumulating area-weighted face normals
    /// onto shared vertices.
    pub fn compute_vertex_normals(&mut self) {
        let mut sums = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (Some(va), Some(vb), Some(vc)) =
                (self.vertices.get(a), self.vertices.get(b), self.vertices.get(c))
            else {
                continue;
            };
            let pa = Vec3::from(va.position);
            let face = (Vec3::from(vb.position) - pa)
                .cross(Vec3::from(vc.position) - pa);
            sums[a] += face;
            sums[b] += face;
            sums[c] += face;
        }
        for (vertex, sum) in self.vertices.iter_mut().zip(sums) {
            vertex.normal = sum.normalize_or(Vec3::Y).to_array();
        }
    }

    /// UV sphere centred on the origin.
    #[must_use]
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let ws = width_segments.max(3);
        let hs = height_segments.max(2);
        let mut vertices = Vec::with_capacity(((ws + 1) * (hs + 1)) as usize);
        for iy in 0..=hs {
            let v = iy as f32 / hs as f32;
            for ix in 0..=ws {
                let u = ix as f32 / ws as f32;
                let normal = Vec3::new(
                    -(u * TAU).cos() * (v * PI).sin(),
                    (v * PI).cos(),
                    (u * TAU).sin() * (v * PI).sin(),
                );
                vertices.push(Vertex::new(
                    normal * radius,
                    normal,
                    Vec2::new(u, 1.0 - v),
                ));
            }
        }

        let row = ws + 1;
        let mut indices = Vec::with_capacity((ws * hs * 6) as usize);
        for iy in 0..hs {
            for ix in 0..ws {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != hs - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        Self { vertices, indices }
    }

    /// Single-quad plane in the XY plane facing +Z.
    #[must_use]
    pub fn plane(width: f32, height: f32) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        let n = Vec3::Z;
        let vertices = vec![
            Vertex::new(Vec3::new(-hw, hh, 0.0), n, Vec2::new(0.0, 1.0)),
            Vertex::new(Vec3::new(hw, hh, 0.0), n, Vec2::new(1.0, 1.0)),
            Vertex::new(Vec3::new(-hw, -hh, 0.0), n, Vec2::new(0.0, 0.0)),
            Vertex::new(Vec3::new(hw, -hh, 0.0), n, Vec2::new(1.0, 0.0)),
        ];
        Self {
            vertices,
            indices: vec![0, 2, 1, 2, 3, 1],
        }
    }

    /// Axis-aligned cube with edge length `size`, one texture per face.
    #[must_use]
    pub fn cube(size: f32) -> Self {
        // (normal, u axis, v axis) with u × v = normal.
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        let half = size / 2.0;
        let mut mesh = Self::default();
        for (n, u, v) in faces {
            let base = mesh.vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = (n + u * su + v * sv) * half;
                let uv = Vec2::new((su + 1.0) / 2.0, (sv + 1.0) / 2.0);
                mesh.vertices.push(Vertex::new(p, n, uv));
            }
            mesh.indices.extend_from_slice(&[
                base,
                base + 1,
                base + 2,
                base,
                base + 2,
                base + 3,
            ]);
        }
        mesh
    }

    /// Open-ended cylinder along Y (no caps).
    #[must_use]
    pub fn open_cylinder(
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    ) -> Self {
        let segments = radial_segments.max(3);
        let slope = (radius_bottom - radius_top) / height;
        let mut vertices = Vec::with_capacity(2 * (segments as usize + 1));
        for y in 0..=1u32 {
            let v = y as f32;
            let radius = v * (radius_bottom - radius_top) + radius_top;
            for x in 0..=segments {
                let u = x as f32 / segments as f32;
                let theta = u * TAU;
                let (sin, cos) = theta.sin_cos();
                vertices.push(Vertex::new(
                    Vec3::new(radius * sin, -v * height + height / 2.0, radius * cos),
                    Vec3::new(sin, slope, cos).normalize(),
                    Vec2::new(u, 1.0 - v),
                ));
            }
        }

        let row = segments + 1;
        let mut indices = Vec::with_capacity(segments as usize * 6);
        for x in 0..segments {
            let a = x;
            let b = row + x;
            let c = row + x + 1;
            let d = x + 1;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
        Self { vertices, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(mesh: &MeshData, tri: usize) -> Vec3 {
        let i = &mesh.indices[tri * 3..tri * 3 + 3];
        let p = |k: usize| Vec3::from(mesh.vertices[i[k] as usize].position);
        (p(1) - p(0)).cross(p(2) - p(0))
    }

    #[test]
    fn sphere_vertices_sit_on_radius() {
        let mesh = MeshData::sphere(40.0, 16, 12);
        for v in &mesh.vertices {
            assert!((Vec3::from(v.position).length() - 40.0).abs() < 1e-3);
        }
        // Poles collapse one triangle per quad.
        assert_eq!(mesh.triangle_count(), 16 * 12 * 2 - 2 * 16);
    }

    #[test]
    fn sphere_faces_point_outward() {
        let mesh = MeshData::sphere(1.0, 8, 6);
        for tri in 0..mesh.triangle_count() {
            let i = mesh.indices[tri * 3] as usize;
            let centre = Vec3::from(mesh.vertices[i].position);
            assert!(face_normal(&mesh, tri).dot(centre) >= -1e-5);
        }
    }

    #[test]
    fn cube_faces_point_outward() {
        let mesh = MeshData::cube(2.0);
        assert_eq!(mesh.triangle_count(), 12);
        for tri in 0..12 {
            let i = mesh.indices[tri * 3] as usize;
            let n = Vec3::from(mesh.vertices[i].normal);
            assert!(face_normal(&mesh, tri).normalize().dot(n) > 0.99);
        }
    }

    #[test]
    fn plane_faces_positive_z() {
        let mesh = MeshData::plane(10.0, 10.0);
        assert!(face_normal(&mesh, 0).z > 0.0);
        assert!(face_normal(&mesh, 1).z > 0.0);
    }

    #[test]
    fn open_cylinder_has_no_caps() {
        let mesh = MeshData::open_cylinder(1.0, 1.0, 30.0, 32);
        assert_eq!(mesh.triangle_count(), 64);
        let ys: Vec<f32> = mesh.vertices.iter().map(|v| v.position[1]).collect();
        assert!(ys.iter().all(|y| (y.abs() - 15.0).abs() < 1e-5));
    }

    #[test]
    fn computed_normals_are_unit_length() {
        let mut mesh = MeshData::sphere(3.0, 8, 8);
        for v in &mut mesh.vertices {
            v.normal = [0.0; 3];
        }
        mesh.compute_vertex_normals();
        for v in &mesh.vertices {
            assert!((Vec3::from(v.normal).length() - 1.0).abs() < 1e-4);
        }
    }
}
