//! Partitioning of space by planes.

use crate::geometry::{Unit, Vector3, E3};

// "Front" and "back" refer to the half-spaces on either side of a plane with
// respect to its normal. Points on the plane are in front.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinaryPartition {
    Front,
    Back,
}

pub trait PointPartition {
    fn partition(&self, point: &E3) -> BinaryPartition;
}

/// Plane described by a point and a unit normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub origin: E3,
    pub normal: Unit<Vector3<f32>>,
}

impl Plane {
    pub fn new(origin: E3, normal: Unit<Vector3<f32>>) -> Self {
        Plane { origin, normal }
    }

    /// Gets the signed distance from the plane to a point.
    pub fn signed_distance(&self, point: &E3) -> f32 {
        (point - self.origin).dot(self.normal.as_ref())
    }
}

impl PointPartition for Plane {
    fn partition(&self, point: &E3) -> BinaryPartition {
        if self.signed_distance(point) >= 0.0 {
            BinaryPartition::Front
        }
        else {
            BinaryPartition::Back
        }
    }
}
