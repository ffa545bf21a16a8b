//! Legacy three.js JSON geometry (format version 3).
//!
//! Faces are a flat integer stream. Each face starts with a type bitmask
//! that says how many indices follow:
//!
//! | bit | meaning                       |
//! |-----|-------------------------------|
//! | 0   | quad (4 vertices, else 3)     |
//! | 1   | material index                |
//! | 2   | face uv (per uv layer)        |
//! | 3   | vertex uvs (per uv layer)     |
//! | 4   | face normal                   |
//! | 5   | vertex normals                |
//! | 6   | face color                    |
//! | 7   | vertex colors                 |
//!
//! Quads are split into `(a, b, d)` and `(b, c, d)`. Only the first uv layer
//! is kept. Corners are unrolled so every triangle owns its three vertices;
//! smooth normals are accumulated per source vertex when the file has none.

use glam::{Vec2, Vec3};
use serde::Deserialize;

use super::AssetError;
use crate::scene::{MeshData, Vertex};

const IS_QUAD: u32 = 1;
const HAS_MATERIAL: u32 = 1 << 1;
const HAS_FACE_UV: u32 = 1 << 2;
const HAS_FACE_VERTEX_UV: u32 = 1 << 3;
const HAS_FACE_NORMAL: u32 = 1 << 4;
const HAS_FACE_VERTEX_NORMAL: u32 = 1 << 5;
const HAS_FACE_COLOR: u32 = 1 << 6;
const HAS_FACE_VERTEX_COLOR: u32 = 1 << 7;

#[derive(Debug, Deserialize)]
struct Metadata {
    #[serde(rename = "formatVersion")]
    format_version: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ModelJson {
    metadata: Option<Metadata>,
    scale: Option<f32>,
    vertices: Vec<f32>,
    #[serde(default)]
    normals: Vec<f32>,
    #[serde(default)]
    uvs: Vec<Vec<f32>>,
    faces: Vec<u32>,
}

struct Corner {
    vertex: usize,
    uv: Vec2,
    normal: Option<Vec3>,
}

struct FaceReader<'a> {
    stream: &'a [u32],
    pos: usize,
}

impl FaceReader<'_> {
    fn next(&mut self) -> Result<usize, String> {
        let value = self
            .stream
            .get(self.pos)
            .ok_or_else(|| format!("face stream truncated at {}", self.pos))?;
        self.pos += 1;
        Ok(*value as usize)
    }

    fn skip(&mut self, n: usize) -> Result<(), String> {
        for _ in 0..n {
            let _ = self.next()?;
        }
        Ok(())
    }

    fn done(&self) -> bool {
        self.pos >= self.stream.len()
    }
}

fn vec3_at(data: &[f32], index: usize) -> Result<Vec3, String> {
    data.get(index * 3..index * 3 + 3)
        .map(Vec3::from_slice)
        .ok_or_else(|| format!("index {index} out of range"))
}

fn vec2_at(data: &[f32], index: usize) -> Result<Vec2, String> {
    data.get(index * 2..index * 2 + 2)
        .map(Vec2::from_slice)
        .ok_or_else(|| format!("uv index {index} out of range"))
}

/// Parse a JSON model into an unrolled triangle mesh.
///
/// # Errors
///
/// Returns [`AssetError::Decode`] for malformed JSON, unsupported format
/// versions, or out-of-range indices.
pub fn parse_model(name: &str, bytes: &[u8]) -> Result<MeshData, AssetError> {
    let decode_error = |reason: String| AssetError::Decode {
        name: name.to_owned(),
        reason,
    };
    let json: ModelJson =
        serde_json::from_slice(bytes).map_err(|e| decode_error(e.to_string()))?;
    if let Some(version) = json.metadata.as_ref().and_then(|m| m.format_version) {
        if version.trunc() != 3.0 {
            return Err(decode_error(format!("unsupported format version {version}")));
        }
    }
    build(&json).map_err(decode_error)
}

fn build(json: &ModelJson) -> Result<MeshData, String> {
    let scale = match json.scale {
        Some(s) if s != 0.0 => 1.0 / s,
        _ => 1.0,
    };
    let vertex_count = json.vertices.len() / 3;
    let uv_layers = json.uvs.len();
    let first_uvs = json.uvs.first().map_or(&[][..], Vec::as_slice);

    let mut reader = FaceReader {
        stream: &json.faces,
        pos: 0,
    };
    let mut triangles: Vec<[Corner; 3]> = Vec::new();

    while !reader.done() {
        let kind = reader.next()? as u32;
        let n = if kind & IS_QUAD != 0 { 4 } else { 3 };

        let mut vertex = [0usize; 4];
        for v in vertex.iter_mut().take(n) {
            *v = reader.next()?;
            if *v >= vertex_count {
                return Err(format!("vertex index {v} out of range"));
            }
        }
        if kind & HAS_MATERIAL != 0 {
            reader.skip(1)?;
        }
        if kind & HAS_FACE_UV != 0 {
            reader.skip(uv_layers)?;
        }
        let mut uv = [Vec2::ZERO; 4];
        if kind & HAS_FACE_VERTEX_UV != 0 {
            for layer in 0..uv_layers {
                for slot in uv.iter_mut().take(n) {
                    let index = reader.next()?;
                    if layer == 0 {
                        *slot = vec2_at(first_uvs, index)?;
                    }
                }
            }
        }
        let mut normal = [None; 4];
        if kind & HAS_FACE_NORMAL != 0 {
            let face = vec3_at(&json.normals, reader.next()?)?;
            normal = [Some(face); 4];
        }
        if kind & HAS_FACE_VERTEX_NORMAL != 0 {
            for slot in normal.iter_mut().take(n) {
                *slot = Some(vec3_at(&json.normals, reader.next()?)?);
            }
        }
        if kind & HAS_FACE_COLOR != 0 {
            reader.skip(1)?;
        }
        if kind & HAS_FACE_VERTEX_COLOR != 0 {
            reader.skip(n)?;
        }

        let corner = |i: usize| Corner {
            vertex: vertex[i],
            uv: uv[i],
            normal: normal[i],
        };
        if n == 4 {
            triangles.push([corner(0), corner(1), corner(3)]);
            triangles.push([corner(1), corner(2), corner(3)]);
        } else {
            triangles.push([corner(0), corner(1), corner(2)]);
        }
    }

    let positions = (0..vertex_count)
        .map(|i| vec3_at(&json.vertices, i).map(|p| p * scale))
        .collect::<Result<Vec<_>, _>>()?;

    let mut smooth = vec![Vec3::ZERO; vertex_count];
    for tri in &triangles {
        let [a, b, c] = [tri[0].vertex, tri[1].vertex, tri[2].vertex];
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        smooth[a] += face;
        smooth[b] += face;
        smooth[c] += face;
    }

    let mut mesh = MeshData::empty();
    mesh.vertices.reserve(triangles.len() * 3);
    for corner in triangles.iter().flatten() {
        let normal = corner
            .normal
            .unwrap_or(smooth[corner.vertex])
            .normalize_or(Vec3::Y);
        mesh.indices.push(mesh.vertices.len() as u32);
        mesh.vertices
            .push(Vertex::new(positions[corner.vertex], normal, corner.uv));
    }
    Ok(mesh)
}
