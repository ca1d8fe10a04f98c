//! **Terrane** is a library for procedural mesh generation.
//!
//! Terrane produces the CPU-side buffers that a renderer consumes: vertex
//! positions, per-vertex normals, triangle indices, and edge indices for
//! wireframe display. Three sources of geometry are provided:
//!
//! - [`GeodesicSphere`] recursively subdivides a tetrahedron into a unit sphere
//!   and emits a [`TriangleSoup`].
//! - [`Terrain`] synthesizes a heightfield over a regular grid by applying
//!   random fault planes, smoothing, and estimating normals.
//! - [`TriMesh`] loads a subset of the OBJ format into a [`MeshBuffer`] and
//!   derives area-weighted normals and a bounding box.
//!
//! Rendering is not part of this crate. Buffers are exposed as slices of
//! [`nalgebra`] types and can be flattened into `f32` and `u32` arrays.
//!
//! # Examples
//!
//! Loading a triangle from OBJ text:
//!
//! ```rust
//! use terrane::mesh::TriMesh;
//!
//! let mut mesh = TriMesh::new();
//! mesh.load_from_text("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
//!     .unwrap();
//!
//! let buffer = mesh.buffer().unwrap();
//! assert_eq!(3, buffer.vertex_count());
//! assert_eq!(1, buffer.triangle_count());
//! assert_eq!(3, buffer.edge_count());
//! ```
//!
//! [`GeodesicSphere`]: crate::primitive::sphere::GeodesicSphere
//! [`MeshBuffer`]: crate::buffer::MeshBuffer
//! [`Terrain`]: crate::primitive::terrain::Terrain
//! [`TriangleSoup`]: crate::buffer::TriangleSoup
//! [`TriMesh`]: crate::mesh::TriMesh

pub mod buffer;
pub mod encoding;
pub mod geometry;
pub mod mesh;
pub mod primitive;

pub use nalgebra;

pub mod prelude {
    //! Re-exports commonly used types and traits.
    //!
    //! Importing the contents of this module brings the encoding traits and
    //! iterator extensions into scope.

    pub use crate::encoding::obj::{FromObj as _, ToObj as _};
    pub use crate::IteratorExt as _;
}

/// Extension methods for types implementing `Iterator`.
pub trait IteratorExt: Iterator + Sized {
    /// Provides an iterator over a window of duplets that includes the first
    /// value in the sequence at the beginning and end of the iteration.
    ///
    /// Given a collection of ordered elements $\\{a, b, c\\}$, this iterator
    /// yields the ordered items $\\{(a, b), (b, c), (c, a)\\}$.
    fn perimeter(self) -> Perimeter<Self>
    where
        Self::Item: Clone;
}

impl<I> IteratorExt for I
where
    I: Iterator,
{
    fn perimeter(self) -> Perimeter<I>
    where
        I::Item: Clone,
    {
        Perimeter::new(self)
    }
}

/// Iterator that produces a window of duplets over its input.
///
/// The duplets produced include the first value in the input sequence at both
/// the beginning and end of the iteration, forming a perimeter. This is the
/// traversal used to derive the edges of a triangle.
pub struct Perimeter<I>
where
    I: Iterator,
    I::Item: Clone,
{
    input: I,
    first: Option<I::Item>,
    previous: Option<I::Item>,
}

impl<I> Perimeter<I>
where
    I: Iterator,
    I::Item: Clone,
{
    fn new(mut input: I) -> Self {
        let first = input.next();
        let previous = first.clone();
        Perimeter {
            input,
            first,
            previous,
        }
    }
}

impl<I> Iterator for Perimeter<I>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = (I::Item, I::Item);

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.input.next();
        match (self.previous.clone(), next.or_else(|| self.first.take())) {
            (Some(a), Some(b)) => {
                self.previous = Some(b.clone());
                Some((a, b))
            }
            _ => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.input.size_hint();
        let closing = usize::from(self.first.is_some());
        (
            lower.saturating_add(closing),
            upper.and_then(|upper| upper.checked_add(closing)),
        )
    }
}
