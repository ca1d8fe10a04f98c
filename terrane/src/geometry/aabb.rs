use nalgebra::{Matrix4, Vector3};

use crate::geometry::{GeometryError, E3};

/// Axis-aligned bounding box.
///
/// For every point $p$ used to compute an `Aabb` and every axis $k$,
/// $\min_k \leq p_k \leq \max_k$, and each bound is attained by at least one
/// point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: E3,
    pub max: E3,
}

impl Aabb {
    /// Computes the bounding box of a set of points with a single linear scan.
    ///
    /// Returns `None` if there are no points.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a E3>,
    {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(
            Aabb {
                min: first,
                max: first,
            },
            |aabb, point| Aabb {
                min: aabb.min.inf(point),
                max: aabb.max.sup(point),
            },
        ))
    }

    pub fn contains(&self, point: &E3) -> bool {
        (0..3).all(|k| self.min[k] <= point[k] && point[k] <= self.max[k])
    }

    pub fn center(&self) -> E3 {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Gets the largest extent of the box along any axis.
    pub fn largest_extent(&self) -> f32 {
        self.extent().max()
    }

    /// Gets a transform that centers the box at the origin and scales its
    /// largest extent to one half.
    ///
    /// This is the model transform used to frame an arbitrary mesh in a
    /// viewer.
    ///
    /// # Errors
    ///
    /// Returns an error if the largest extent of the box is zero (or not a
    /// number), in which case no such scaling exists.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use terrane::geometry::{Aabb, Point3};
    ///
    /// let aabb = Aabb::from_points(&[Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 2.0, 2.0)])
    ///     .unwrap();
    /// let transform = aabb.normalizing_transform().unwrap();
    /// let corner = transform.transform_point(&aabb.max);
    /// assert_eq!(Point3::new(0.25, 0.125, 0.125), corner);
    /// ```
    pub fn normalizing_transform(&self) -> Result<Matrix4<f32>, GeometryError> {
        let largest = self.largest_extent();
        if largest > 0.0 {
            let translation = -self.center().coords;
            Ok(Matrix4::new_scaling(0.5 / largest) * Matrix4::new_translation(&translation))
        }
        else {
            Err(GeometryError::Degenerate("bounding box has no extent"))
        }
    }
}
