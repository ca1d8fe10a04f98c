//! Linear representation of meshes.
//!
//! This module provides two linear mesh representations that are well-suited
//! for graphics pipelines:
//!
//! - [`MeshBuffer`] is an indexed triangle mesh. It pairs a _vertex buffer_ of
//!   positions and per-vertex normals with an _index buffer_ of [`Trigon`]s
//!   and a derived _edge buffer_ of [`Edge`]s for wireframe rendering.
//! - [`TriangleSoup`] has no index buffer. Every three consecutive vertices
//!   form a triangle and vertices may be duplicated across triangles.
//!
//! # Edge Buffers
//!
//! The edge buffer of a [`MeshBuffer`] is derived from its triangles: each
//! triangle $(a, b, c)$ contributes the edges $(a, b)$, $(b, c)$, and
//! $(c, a)$. Edges shared by adjacent triangles are **not** deduplicated, so a
//! buffer with $T$ triangles always has exactly $3T$ edges.
//!
//! # Flat Buffers
//!
//! Renderers typically expect flat arrays. The `to_flat_*` functions copy
//! buffers into `f32` and `u32` arrays in which component $k$ of vertex $i$ is
//! found at offset $3i + k$.
//!
//! # Examples
//!
//! Creating a buffer from raw index and position data:
//!
//! ```rust
//! use terrane::buffer::MeshBuffer;
//! use terrane::geometry::E3;
//! use terrane::primitive::Trigon;
//!
//! let buffer = MeshBuffer::from_raw_buffers(
//!     vec![Trigon::new(0, 1, 2)],
//!     vec![
//!         E3::new(0.0, 0.0, 0.0),
//!         E3::new(1.0, 0.0, 0.0),
//!         E3::new(0.0, 1.0, 0.0),
//!     ],
//! )
//! .unwrap();
//! assert_eq!(vec![0, 1, 1, 2, 2, 0], buffer.to_flat_edge_indices());
//! ```

mod builder;

use num::NumCast;
use thiserror::Error;

use crate::geometry::{normalize_or_zero, triangle_normal, Aabb, Vector3, E3};
use crate::primitive::scatter::SphereInstance;
use crate::primitive::{Edge, Trigon};

pub use crate::buffer::builder::BufferBuilder;

#[derive(Debug, Error, PartialEq)]
pub enum BufferError {
    #[error("index {index} into vertex data out of bounds; vertex count is {len}")]
    IndexOutOfBounds { index: u32, len: usize },
    #[error("index overflow")]
    IndexOverflow,
    #[error("conflicting arity; expected {expected}, but got {actual}")]
    ArityConflict { expected: usize, actual: usize },
    #[error("conflicting buffer lengths; {positions} positions, but {normals} normals")]
    LengthMismatch { positions: usize, normals: usize },
}

/// Indexed triangle mesh.
///
/// A `MeshBuffer` is immutable once constructed. Its normal buffer always has
/// the same length as its position buffer and its edge buffer is always
/// derived from its index buffer.
///
/// See the module documentation for more information.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshBuffer {
    positions: Vec<E3>,
    normals: Vec<Vector3<f32>>,
    triangles: Vec<Trigon>,
    edges: Vec<Edge>,
}

impl MeshBuffer {
    /// Creates a `MeshBuffer` from raw index and position buffers.
    ///
    /// Per-vertex normals are computed by accumulating the area-weighted
    /// normals of each triangle into its vertices and then normalizing. See
    /// [`vertex_normals`].
    ///
    /// # Errors
    ///
    /// Returns an error if any index is out of bounds of the positions.
    pub fn from_raw_buffers<I, J>(triangles: I, positions: J) -> Result<Self, BufferError>
    where
        I: IntoIterator<Item = Trigon>,
        J: IntoIterator<Item = E3>,
    {
        let triangles = triangles.into_iter().collect::<Vec<_>>();
        let positions = positions.into_iter().collect::<Vec<_>>();
        validate(&triangles, positions.len())?;
        let normals = vertex_normals(&triangles, &positions);
        Ok(MeshBuffer::from_raw_buffers_unchecked(
            triangles, positions, normals,
        ))
    }

    /// Creates a `MeshBuffer` from raw index, position, and normal buffers.
    ///
    /// The given normals are used as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if any index is out of bounds of the positions or if
    /// the number of normals differs from the number of positions.
    pub fn from_raw_buffers_with_normals<I, J, K>(
        triangles: I,
        positions: J,
        normals: K,
    ) -> Result<Self, BufferError>
    where
        I: IntoIterator<Item = Trigon>,
        J: IntoIterator<Item = E3>,
        K: IntoIterator<Item = Vector3<f32>>,
    {
        let triangles = triangles.into_iter().collect::<Vec<_>>();
        let positions = positions.into_iter().collect::<Vec<_>>();
        let normals = normals.into_iter().collect::<Vec<_>>();
        if positions.len() != normals.len() {
            return Err(BufferError::LengthMismatch {
                positions: positions.len(),
                normals: normals.len(),
            });
        }
        validate(&triangles, positions.len())?;
        Ok(MeshBuffer::from_raw_buffers_unchecked(
            triangles, positions, normals,
        ))
    }

    pub(crate) fn from_raw_buffers_unchecked(
        triangles: Vec<Trigon>,
        positions: Vec<E3>,
        normals: Vec<Vector3<f32>>,
    ) -> Self {
        let edges = edges(&triangles);
        log::debug!(
            "built mesh buffer: {} vertices, {} triangles, {} edges",
            positions.len(),
            triangles.len(),
            edges.len(),
        );
        MeshBuffer {
            positions,
            normals,
            triangles,
            edges,
        }
    }

    pub fn into_raw_buffers(self) -> (Vec<Trigon>, Vec<E3>, Vec<Vector3<f32>>) {
        let MeshBuffer {
            positions,
            normals,
            triangles,
            ..
        } = self;
        (triangles, positions, normals)
    }

    /// Gets a slice of the position data.
    pub fn as_position_slice(&self) -> &[E3] {
        self.positions.as_slice()
    }

    /// Gets a slice of the normal data.
    pub fn as_normal_slice(&self) -> &[Vector3<f32>] {
        self.normals.as_slice()
    }

    /// Gets a slice of the index data.
    pub fn as_triangle_slice(&self) -> &[Trigon] {
        self.triangles.as_slice()
    }

    /// Gets a slice of the edge data.
    pub fn as_edge_slice(&self) -> &[Edge] {
        self.edges.as_slice()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Computes the axis-aligned bounding box of the positions.
    ///
    /// Returns `None` if the buffer has no vertices.
    pub fn aabb(&self) -> Option<Aabb> {
        Aabb::from_points(&self.positions)
    }

    pub fn to_flat_positions(&self) -> Vec<f32> {
        flatten_points(&self.positions)
    }

    pub fn to_flat_normals(&self) -> Vec<f32> {
        flatten_vectors(&self.normals)
    }

    pub fn to_flat_triangle_indices(&self) -> Vec<u32> {
        self.triangles
            .iter()
            .flat_map(|trigon| trigon.into_array())
            .collect()
    }

    pub fn to_flat_edge_indices(&self) -> Vec<u32> {
        self.edges.iter().flat_map(|edge| edge.into_array()).collect()
    }
}

/// Unindexed triangle mesh.
///
/// Every three consecutive vertices form a triangle. Positions and normals
/// always have the same length, which is a multiple of three.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleSoup {
    positions: Vec<E3>,
    normals: Vec<Vector3<f32>>,
}

impl TriangleSoup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `TriangleSoup` from raw position and normal buffers.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffers differ in length or if their length is
    /// not a multiple of three.
    pub fn from_raw_buffers<I, J>(positions: I, normals: J) -> Result<Self, BufferError>
    where
        I: IntoIterator<Item = E3>,
        J: IntoIterator<Item = Vector3<f32>>,
    {
        let positions = positions.into_iter().collect::<Vec<_>>();
        let normals = normals.into_iter().collect::<Vec<_>>();
        if positions.len() != normals.len() {
            Err(BufferError::LengthMismatch {
                positions: positions.len(),
                normals: normals.len(),
            })
        }
        else if positions.len() % 3 != 0 {
            Err(BufferError::ArityConflict {
                expected: 3,
                actual: positions.len() % 3,
            })
        }
        else {
            Ok(TriangleSoup { positions, normals })
        }
    }

    pub fn into_raw_buffers(self) -> (Vec<E3>, Vec<Vector3<f32>>) {
        let TriangleSoup { positions, normals } = self;
        (positions, normals)
    }

    pub fn as_position_slice(&self) -> &[E3] {
        self.positions.as_slice()
    }

    pub fn as_normal_slice(&self) -> &[Vector3<f32>] {
        self.normals.as_slice()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Gets an iterator over the triangles of the soup as positions.
    pub fn triangles(&self) -> impl ExactSizeIterator<Item = Trigon<E3>> + '_ {
        self.positions
            .chunks_exact(3)
            .map(|chunk| Trigon::new(chunk[0], chunk[1], chunk[2]))
    }

    /// Copies the soup with its positions uniformly scaled and then
    /// translated.
    ///
    /// Normals are unchanged, because a uniform positive scaling and a
    /// translation do not rotate surfaces.
    pub fn scaled_and_translated(&self, scale: f32, translation: &Vector3<f32>) -> Self {
        TriangleSoup {
            positions: self
                .positions
                .iter()
                .map(|position| E3::from(position.coords * scale + translation))
                .collect(),
            normals: self.normals.clone(),
        }
    }

    /// Places a copy of the soup according to a [`SphereInstance`].
    pub fn instanced(&self, instance: &SphereInstance) -> Self {
        self.scaled_and_translated(instance.scale, &instance.translation)
    }

    /// Converts the soup into a `MeshBuffer` with sequential indices.
    ///
    /// Vertices are not merged, so each triangle keeps its own vertices and
    /// the normals of the soup are preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of vertices cannot be indexed by `u32`.
    pub fn into_mesh_buffer(self) -> Result<MeshBuffer, BufferError> {
        let TriangleSoup { positions, normals } = self;
        let count = <u32 as NumCast>::from(positions.len()).ok_or(BufferError::IndexOverflow)?;
        let triangles = (0..count)
            .step_by(3)
            .map(|index| Trigon::new(index, index + 1, index + 2))
            .collect::<Vec<_>>();
        Ok(MeshBuffer::from_raw_buffers_unchecked(
            triangles, positions, normals,
        ))
    }

    pub fn to_flat_positions(&self) -> Vec<f32> {
        flatten_points(&self.positions)
    }

    pub fn to_flat_normals(&self) -> Vec<f32> {
        flatten_vectors(&self.normals)
    }

    pub(crate) fn push(&mut self, positions: [E3; 3], normals: [Vector3<f32>; 3]) {
        self.positions.extend(positions);
        self.normals.extend(normals);
    }

    pub(crate) fn reserve_triangles(&mut self, additional: usize) {
        self.positions.reserve(additional * 3);
        self.normals.reserve(additional * 3);
    }
}

/// Computes area-weighted per-vertex normals.
///
/// The unnormalized normal of each triangle is accumulated into each of its
/// vertices. Once every triangle has been accumulated, each sum is normalized.
/// Vertices that are not referenced by any triangle have a zero normal.
///
/// All indices must be in bounds of `positions`.
pub fn vertex_normals(triangles: &[Trigon], positions: &[E3]) -> Vec<Vector3<f32>> {
    let mut normals = vec![Vector3::zeros(); positions.len()];
    for trigon in triangles {
        let [a, b, c] = trigon.into_array().map(|index| index as usize);
        let normal = triangle_normal(&positions[a], &positions[b], &positions[c]);
        for index in [a, b, c] {
            normals[index] += normal;
        }
    }
    normals.into_iter().map(normalize_or_zero).collect()
}

/// Derives the edge buffer of a set of triangles.
///
/// Each triangle contributes three edges in winding order and shared edges
/// are not deduplicated.
pub fn edges(triangles: &[Trigon]) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(triangles.len() * 3);
    edges.extend(triangles.iter().flat_map(|trigon| trigon.edges()));
    edges
}

fn validate(triangles: &[Trigon], len: usize) -> Result<(), BufferError> {
    triangles
        .iter()
        .flat_map(|trigon| trigon.vertices().copied())
        .find(|index| *index as usize >= len)
        .map_or(Ok(()), |index| {
            Err(BufferError::IndexOutOfBounds { index, len })
        })
}

fn flatten_points(points: &[E3]) -> Vec<f32> {
    flatten_vectors(points.iter().map(|point| &point.coords))
}

fn flatten_vectors<'a, I>(vectors: I) -> Vec<f32>
where
    I: IntoIterator<Item = &'a Vector3<f32>>,
{
    vectors
        .into_iter()
        .flat_map(|vector| [vector.x, vector.y, vector.z])
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::buffer::{BufferError, MeshBuffer, TriangleSoup};
    use crate::geometry::{Vector3, E3};
    use crate::primitive::{Edge, Trigon};

    fn quad() -> (Vec<Trigon>, Vec<E3>) {
        (
            vec![Trigon::new(0, 1, 2), Trigon::new(0, 2, 3)],
            vec![
                E3::new(0.0, 0.0, 0.0),
                E3::new(1.0, 0.0, 0.0),
                E3::new(1.0, 1.0, 0.0),
                E3::new(0.0, 1.0, 0.0),
            ],
        )
    }

    #[test]
    fn edges_are_not_deduplicated() {
        let (triangles, positions) = quad();
        let buffer = MeshBuffer::from_raw_buffers(triangles, positions).unwrap();

        assert_eq!(6, buffer.edge_count());
        assert_eq!(
            &[
                Edge::new(0, 1),
                Edge::new(1, 2),
                Edge::new(2, 0),
                Edge::new(0, 2),
                Edge::new(2, 3),
                Edge::new(3, 0),
            ],
            buffer.as_edge_slice(),
        );
    }

    #[test]
    fn reject_out_of_bounds_index() {
        let (_, positions) = quad();
        assert_eq!(
            Err(BufferError::IndexOutOfBounds { index: 4, len: 4 }),
            MeshBuffer::from_raw_buffers(vec![Trigon::new(0, 1, 4)], positions),
        );
    }

    #[test]
    fn normals_are_area_weighted() {
        // Two triangles share vertex 0. The larger triangle lies in the xy-plane
        // and the smaller triangle lies in the xz-plane.
        let positions = vec![
            E3::new(0.0, 0.0, 0.0),
            E3::new(2.0, 0.0, 0.0),
            E3::new(0.0, 2.0, 0.0),
            E3::new(0.0, 0.0, 1.0),
            E3::new(1.0, 0.0, 0.0),
        ];
        let triangles = vec![Trigon::new(0, 1, 2), Trigon::new(0, 3, 4)];
        let buffer = MeshBuffer::from_raw_buffers(triangles, positions).unwrap();

        // (0, 0, 4) + (0, 1, 0), normalized.
        let expected = Vector3::new(0.0, 1.0, 4.0).normalize();
        assert_abs_diff_eq!(expected, buffer.as_normal_slice()[0], epsilon = 1e-6);
        assert_abs_diff_eq!(Vector3::z(), buffer.as_normal_slice()[1], epsilon = 1e-6);
    }

    #[test]
    fn isolated_vertex_has_zero_normal() {
        let (triangles, mut positions) = quad();
        positions.push(E3::new(5.0, 5.0, 5.0));
        let buffer = MeshBuffer::from_raw_buffers(triangles, positions).unwrap();

        assert_eq!(Vector3::zeros(), buffer.as_normal_slice()[4]);
        for normal in &buffer.as_normal_slice()[..4] {
            assert_abs_diff_eq!(1.0, normal.norm(), epsilon = 1e-6);
        }
    }

    #[test]
    fn reject_mismatched_normals() {
        let (triangles, positions) = quad();
        assert_eq!(
            Err(BufferError::LengthMismatch {
                positions: 4,
                normals: 1,
            }),
            MeshBuffer::from_raw_buffers_with_normals(triangles, positions, vec![Vector3::z()]),
        );
    }

    #[test]
    fn flat_buffers_preserve_component_order() {
        let (triangles, positions) = quad();
        let buffer = MeshBuffer::from_raw_buffers(triangles, positions).unwrap();

        let positions = buffer.to_flat_positions();
        assert_eq!(12, positions.len());
        assert_eq!(&[1.0, 1.0, 0.0], &positions[6..9]);
        assert_eq!(vec![0, 1, 2, 0, 2, 3], buffer.to_flat_triangle_indices());
        assert_eq!(12, buffer.to_flat_normals().len());
    }

    #[test]
    fn soup_into_mesh_buffer_keeps_normals() {
        let soup = TriangleSoup::from_raw_buffers(
            vec![
                E3::new(0.0, 0.0, 1.0),
                E3::new(1.0, 0.0, 0.0),
                E3::new(0.0, 1.0, 0.0),
            ],
            vec![Vector3::z(), Vector3::x(), Vector3::y()],
        )
        .unwrap();
        let buffer = soup.into_mesh_buffer().unwrap();

        assert_eq!(&[Trigon::new(0, 1, 2)], buffer.as_triangle_slice());
        assert_eq!(
            &[Vector3::z(), Vector3::x(), Vector3::y()],
            buffer.as_normal_slice()
        );
    }

    #[test]
    fn reject_partial_soup_triangle() {
        let result = TriangleSoup::from_raw_buffers(
            vec![E3::origin(), E3::origin()],
            vec![Vector3::z(), Vector3::z()],
        );
        assert_eq!(
            Err(BufferError::ArityConflict {
                expected: 3,
                actual: 2,
            }),
            result,
        );
    }

    #[test]
    fn scale_and_translate_soup() {
        let soup = TriangleSoup::from_raw_buffers(
            vec![
                E3::new(1.0, 0.0, 0.0),
                E3::new(0.0, 1.0, 0.0),
                E3::new(0.0, 0.0, 1.0),
            ],
            vec![Vector3::x(), Vector3::y(), Vector3::z()],
        )
        .unwrap();
        let placed = soup.scaled_and_translated(0.5, &Vector3::new(1.0, 2.0, 3.0));

        assert_eq!(E3::new(1.5, 2.0, 3.0), placed.as_position_slice()[0]);
        assert_eq!(soup.as_normal_slice(), placed.as_normal_slice());
    }
}
