//! Primitive topological structures and generators.
//!
//! This module provides the small polygonal types used by index buffers and
//! the procedural generators that produce geometry:
//!
//! | Generator                   | Output                      | Indexed |
//! |-----------------------------|-----------------------------|---------|
//! | [`sphere::GeodesicSphere`]  | [`TriangleSoup`]            | No      |
//! | [`terrain::Terrain`]        | [`MeshBuffer`]              | Yes     |
//! | [`scatter`]                 | [`scatter::SphereInstance`] | n/a     |
//!
//! Terrane uses the terms _trigon_ and _edge_ for the topological types
//! [`Trigon`] and [`Edge`]. Both are [`NGon`]s over arrays of vertex indices.
//! Winding of a [`Trigon`] is preserved by every operation in this crate.
//!
//! [`MeshBuffer`]: crate::buffer::MeshBuffer
//! [`TriangleSoup`]: crate::buffer::TriangleSoup

pub mod scatter;
pub mod sphere;
pub mod terrain;

use crate::IteratorExt as _;

/// Monomorphic $n$-gon.
///
/// The vertices of an `NGon` are stored in an array and are ordered. For
/// polygons this ordering is the winding.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NGon<A>(pub A);

impl<A> NGon<A> {
    pub fn into_array(self) -> A {
        self.0
    }
}

impl<T, const N: usize> NGon<[T; N]> {
    pub const ARITY: usize = N;

    pub fn arity(&self) -> usize {
        N
    }

    pub fn vertices(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn map<U, F>(self, f: F) -> NGon<[U; N]>
    where
        F: FnMut(T) -> U,
    {
        NGon(self.0.map(f))
    }
}

impl<T, const N: usize> AsRef<[T]> for NGon<[T; N]> {
    fn as_ref(&self) -> &[T] {
        &self.0
    }
}

impl<T, const N: usize> From<[T; N]> for NGon<[T; N]> {
    fn from(array: [T; N]) -> Self {
        NGon(array)
    }
}

/// Line segment between two vertices.
pub type Edge<T = u32> = NGon<[T; 2]>;

impl<T> Edge<T> {
    pub fn new(a: T, b: T) -> Self {
        NGon([a, b])
    }
}

/// Triangle.
pub type Trigon<T = u32> = NGon<[T; 3]>;

impl<T> Trigon<T> {
    pub fn new(a: T, b: T, c: T) -> Self {
        NGon([a, b, c])
    }

    /// Gets the edges of the triangle in winding order.
    ///
    /// For a triangle $(a, b, c)$ the edges are $(a, b)$, $(b, c)$, and
    /// $(c, a)$.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use terrane::primitive::{Edge, Trigon};
    ///
    /// let edges = Trigon::new(0u32, 1, 2).edges().collect::<Vec<_>>();
    /// assert_eq!(vec![Edge::new(0, 1), Edge::new(1, 2), Edge::new(2, 0)], edges);
    /// ```
    pub fn edges(&self) -> impl Iterator<Item = Edge<T>> + '_
    where
        T: Copy,
    {
        self.0
            .iter()
            .copied()
            .perimeter()
            .map(|(a, b)| Edge::new(a, b))
    }
}
