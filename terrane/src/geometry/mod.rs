//! Geometric types and operations.
//!
//! Terrane represents geometry with [`nalgebra`] types: positions are
//! [`Point3<f32>`] and normals are [`Vector3<f32>`]. This module re-exports
//! those types and provides the few vector operations that generators share,
//! most importantly [`normalize_or_zero`], which is used everywhere a normal is
//! finalized.
//!
//! [`nalgebra`]: https://crates.io/crates/nalgebra

use thiserror::Error;

mod aabb;
pub mod partition;

pub use nalgebra::{Matrix4, Point3, Unit, Vector3};

pub use crate::geometry::aabb::Aabb;

/// Position in three-dimensional Euclidean space.
pub type E3 = Point3<f32>;

/// Errors concerning the parameters and outputs of generators.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeometryError {
    /// A parameter is outside of the domain accepted by an operation.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// The name of the rejected parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// Geometry is degenerate and an operation cannot be computed.
    #[error("degenerate geometry: {0}")]
    Degenerate(&'static str),
}

impl GeometryError {
    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        GeometryError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

/// Normalizes a vector, mapping the zero vector to itself.
///
/// Accumulated normals may be zero when a vertex is not referenced by any
/// triangle. Such normals are left as zero rather than producing `NaN`s.
///
/// # Examples
///
/// ```rust
/// use terrane::geometry::{normalize_or_zero, Vector3};
///
/// assert_eq!(Vector3::z(), normalize_or_zero(Vector3::new(0.0, 0.0, 3.0)));
/// assert_eq!(Vector3::zeros(), normalize_or_zero(Vector3::zeros()));
/// ```
pub fn normalize_or_zero(vector: Vector3<f32>) -> Vector3<f32> {
    vector.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}

/// Computes the unnormalized normal of the triangle `(a, b, c)`.
///
/// The magnitude of the normal is twice the area of the triangle, so summing
/// these normals weights each triangle by its area.
pub fn triangle_normal(a: &E3, b: &E3, c: &E3) -> Vector3<f32> {
    (b - a).cross(&(c - a))
}

/// Computes the midpoint of two unit vectors and projects it back onto the
/// unit sphere.
pub fn spherical_midpoint(a: &Vector3<f32>, b: &Vector3<f32>) -> Vector3<f32> {
    normalize_or_zero(a.lerp(b, 0.5))
}
