//! Sphere primitives.
//!
//! # Examples
//!
//! Generating a [`TriangleSoup`] for a unit sphere:
//!
//! ```rust
//! use terrane::primitive::sphere::GeodesicSphere;
//!
//! let sphere = GeodesicSphere::try_new(2).unwrap();
//! let soup = sphere.tessellate();
//!
//! assert_eq!(64, soup.triangle_count());
//! assert_eq!(soup.triangle_count(), sphere.triangle_count());
//! ```
//!
//! [`TriangleSoup`]: crate::buffer::TriangleSoup

use crate::buffer::TriangleSoup;
use crate::geometry::{spherical_midpoint, GeometryError, Vector3, E3};

// Vertices of a regular tetrahedron inscribed in the unit sphere.
const TETRAHEDRON: [[f32; 3]; 4] = [
    [0.0, 0.0, -1.0],
    [0.0, 0.942809, 0.333333],
    [-0.816497, -0.471405, 0.333333],
    [0.816497, -0.471405, 0.333333],
];

// Faces of the tetrahedron as indices into `TETRAHEDRON`.
const FACES: [[usize; 3]; 4] = [[0, 1, 2], [3, 2, 1], [0, 3, 1], [0, 2, 3]];

/// Geodesic sphere formed by recursively subdividing a tetrahedron.
///
/// Each subdivision splits every triangle into four by joining the midpoints
/// of its edges. Midpoints are projected onto the unit sphere, which bends the
/// flat subdivision into a curved tessellation. At depth $d$ the sphere has
/// $4 \cdot 4^d$ triangles.
///
/// Because the sphere has unit radius and is centered at the origin, the
/// position of each vertex is also its outward normal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GeodesicSphere {
    depth: usize,
}

impl GeodesicSphere {
    /// The greatest supported subdivision depth.
    ///
    /// Output grows as $4^d$; at this depth a sphere has more than four
    /// million triangles.
    pub const MAX_DEPTH: usize = 10;

    /// Creates a sphere with the given subdivision depth.
    ///
    /// # Errors
    ///
    /// Returns an error if `depth` exceeds [`MAX_DEPTH`].
    ///
    /// [`MAX_DEPTH`]: crate::primitive::sphere::GeodesicSphere::MAX_DEPTH
    pub fn try_new(depth: usize) -> Result<Self, GeometryError> {
        if depth > Self::MAX_DEPTH {
            Err(GeometryError::invalid_argument(
                "depth",
                format!(
                    "subdivision depth {} exceeds maximum of {}",
                    depth,
                    Self::MAX_DEPTH
                ),
            ))
        }
        else {
            Ok(GeodesicSphere { depth })
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Gets the number of triangles emitted by [`tessellate`].
    ///
    /// [`tessellate`]: crate::primitive::sphere::GeodesicSphere::tessellate
    pub fn triangle_count(&self) -> usize {
        FACES.len() << (2 * self.depth)
    }

    /// Tessellates the sphere into a [`TriangleSoup`].
    pub fn tessellate(&self) -> TriangleSoup {
        let mut soup = TriangleSoup::new();
        soup.reserve_triangles(self.triangle_count());
        let count = self.subdivide_faces(&mut |positions, normals| soup.push(positions, normals));
        log::debug!(
            "tessellated geodesic sphere: depth {}, {} triangles",
            self.depth,
            count
        );
        soup
    }

    /// Tessellates the sphere into raw position and normal buffers.
    ///
    /// Three vertices are appended to each buffer for every triangle. Returns
    /// the number of triangles emitted.
    pub fn tessellate_into(
        &self,
        positions: &mut Vec<E3>,
        normals: &mut Vec<Vector3<f32>>,
    ) -> usize {
        positions.reserve(self.triangle_count() * 3);
        normals.reserve(self.triangle_count() * 3);
        self.subdivide_faces(&mut |trigon, trigon_normals| {
            positions.extend(trigon);
            normals.extend(trigon_normals);
        })
    }

    fn subdivide_faces<F>(&self, emit: &mut F) -> usize
    where
        F: FnMut([E3; 3], [Vector3<f32>; 3]),
    {
        let corners = TETRAHEDRON.map(Vector3::from);
        FACES
            .iter()
            .map(|&[a, b, c]| subdivide(&corners[a], &corners[b], &corners[c], self.depth, emit))
            .sum()
    }
}

impl Default for GeodesicSphere {
    fn default() -> Self {
        GeodesicSphere { depth: 4 }
    }
}

impl TryFrom<i32> for GeodesicSphere {
    type Error = GeometryError;

    /// Creates a sphere from a signed depth.
    ///
    /// Negative depths are rejected.
    fn try_from(depth: i32) -> Result<Self, Self::Error> {
        usize::try_from(depth)
            .map_err(|_| {
                GeometryError::invalid_argument(
                    "depth",
                    format!("subdivision depth {} is negative", depth),
                )
            })
            .and_then(GeodesicSphere::try_new)
    }
}

fn subdivide<F>(
    a: &Vector3<f32>,
    b: &Vector3<f32>,
    c: &Vector3<f32>,
    depth: usize,
    emit: &mut F,
) -> usize
where
    F: FnMut([E3; 3], [Vector3<f32>; 3]),
{
    if depth == 0 {
        emit([E3::from(*a), E3::from(*b), E3::from(*c)], [*a, *b, *c]);
        1
    }
    else {
        let ab = spherical_midpoint(a, b);
        let ac = spherical_midpoint(a, c);
        let bc = spherical_midpoint(b, c);
        let depth = depth - 1;
        subdivide(a, &ab, &ac, depth, emit)
            + subdivide(&ab, b, &bc, depth, emit)
            + subdivide(&bc, c, &ac, depth, emit)
            + subdivide(&ab, &bc, &ac, depth, emit)
    }
}
