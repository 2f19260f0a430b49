//! Mesh data and uploaded models
//!
//! [`Mesh`] is CPU-side geometry with a bytemuck-compatible [`Vertex`] layout.
//! Once uploaded, geometry is referenced by [`MeshHandle`] and grouped into a
//! [`Model`]: an ordered list of [`SubMesh`] parts, each with the transform
//! relative to the model root.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{constants::PI, Mat4};
use crate::render::api::{BackendResult, EffectKind, MeshHandle, RenderBackend};

/// 3D vertex data structure for rendering
///
/// `#[repr(C)]` keeps the layout stable for GPU buffer uploads.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],
    /// Normal vector
    pub normal: [f32; 3],
    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self { position, normal, tex_coord }
    }
}

/// Indexed triangle geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,
    /// Index data for triangles
    pub indices: Vec<u16>,
}

impl Mesh {
    /// Create a new mesh
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u16>) -> Self {
        Self { vertices, indices }
    }

    /// Number of triangles described by the index buffer
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Upload to the backend
    pub fn upload(&self, backend: &mut dyn RenderBackend) -> BackendResult<MeshHandle> {
        backend.upload_mesh(&self.vertices, &self.indices)
    }

    /// Clip-space quad covering the whole screen
    ///
    /// Four corners at z = 0 with texture coordinates flipped vertically, so
    /// `(0, 0)` samples the top-left texel.
    pub fn screen_quad() -> Self {
        let normal = [0.0, 0.0, 1.0];
        Self::new(
            vec![
                Vertex::new([-1.0, 1.0, 0.0], normal, [0.0, 0.0]),
                Vertex::new([1.0, 1.0, 0.0], normal, [1.0, 0.0]),
                Vertex::new([1.0, -1.0, 0.0], normal, [1.0, 1.0]),
                Vertex::new([-1.0, -1.0, 0.0], normal, [0.0, 1.0]),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    /// Unit plane in XZ at y = 0, facing +Y
    pub fn plane() -> Self {
        let normal = [0.0, 1.0, 0.0];
        Self::new(
            vec![
                Vertex::new([-1.0, 0.0, -1.0], normal, [0.0, 0.0]),
                Vertex::new([1.0, 0.0, -1.0], normal, [1.0, 0.0]),
                Vertex::new([1.0, 0.0, 1.0], normal, [1.0, 1.0]),
                Vertex::new([-1.0, 0.0, 1.0], normal, [0.0, 1.0]),
            ],
            vec![0, 2, 1, 0, 3, 2],
        )
    }

    /// Cube with corners at ±1, one quad per face
    pub fn cube() -> Self {
        // (normal, tangent u, tangent v) per face
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (n, u, v) in faces {
            let base = vertices.len() as u16;
            for (su, sv, tex) in [(-1.0, -1.0, [0.0, 1.0]), (1.0, -1.0, [1.0, 1.0]), (1.0, 1.0, [1.0, 0.0]), (-1.0, 1.0, [0.0, 0.0])] {
                let position = [
                    n[0] + u[0] * su + v[0] * sv,
                    n[1] + u[1] * su + v[1] * sv,
                    n[2] + u[2] * su + v[2] * sv,
                ];
                vertices.push(Vertex::new(position, n, tex));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self::new(vertices, indices)
    }

    /// Unit UV sphere centred at the origin
    pub fn sphere(rings: u16, segments: u16) -> Self {
        let rings = rings.max(2);
        let segments = segments.max(3);
        let mut vertices = Vec::with_capacity(usize::from(rings + 1) * usize::from(segments + 1));
        let mut indices = Vec::with_capacity(usize::from(rings) * usize::from(segments) * 6);

        for ring in 0..=rings {
            let v = f32::from(ring) / f32::from(rings);
            let theta = v * PI;
            for segment in 0..=segments {
                let u = f32::from(segment) / f32::from(segments);
                let phi = u * 2.0 * PI;
                let p = [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()];
                vertices.push(Vertex::new(p, p, [u, v]));
            }
        }

        let stride = segments + 1;
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;
                indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
            }
        }
        Self::new(vertices, indices)
    }

    /// Closed cone with its apex at the origin and its axis along +Y
    ///
    /// The base is a unit circle at y = 1. Scale X/Z by `tan(width / 2)` and
    /// Y by the range to fit a light's aperture.
    pub fn cone(segments: u16) -> Self {
        let segments = segments.max(3);
        let mut vertices = vec![Vertex::new([0.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.5, 0.0])];
        for segment in 0..=segments {
            let u = f32::from(segment) / f32::from(segments);
            let phi = u * 2.0 * PI;
            let (x, z) = (phi.cos(), phi.sin());
            vertices.push(Vertex::new([x, 1.0, z], [x, -1.0, z], [u, 1.0]));
        }
        let center = vertices.len() as u16;
        vertices.push(Vertex::new([0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.5, 1.0]));

        let mut indices = Vec::with_capacity(usize::from(segments) * 6);
        for segment in 1..=segments {
            indices.extend_from_slice(&[0, segment + 1, segment]);
            indices.extend_from_slice(&[center, segment, segment + 1]);
        }
        Self::new(vertices, indices)
    }
}

/// One drawable part of a [`Model`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubMesh {
    /// Transform of this part relative to the model root
    pub parent_transform: Mat4,
    /// Uploaded geometry
    pub mesh: MeshHandle,
}

/// Uploaded model made of one or more parts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    /// Parts in draw order
    pub parts: Vec<SubMesh>,
}

impl Model {
    /// Model with explicit parts
    pub fn new(parts: Vec<SubMesh>) -> Self {
        Self { parts }
    }

    /// Model with a single part at the model root
    pub fn single(mesh: MeshHandle) -> Self {
        Self::new(vec![SubMesh { parent_transform: Mat4::identity(), mesh }])
    }

    /// Upload `mesh` and wrap it as a single-part model
    pub fn from_mesh(backend: &mut dyn RenderBackend, mesh: &Mesh) -> BackendResult<Self> {
        Ok(Self::single(mesh.upload(backend)?))
    }

    /// Draw every part with `world * parent_transform` bound on `effect`
    pub fn draw(&self, backend: &mut dyn RenderBackend, effect: EffectKind, world: &Mat4) -> BackendResult<()> {
        for part in &self.parts {
            backend.set_world(effect, world * part.parent_transform)?;
            backend.draw_mesh(part.mesh)?;
        }
        Ok(())
    }
}
