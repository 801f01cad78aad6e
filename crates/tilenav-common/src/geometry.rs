//! Geometry records used throughout the navigation mesh
//!
//! Tiles carry an axis-aligned float bounding box, while bounding-volume
//! nodes store integer-quantized boxes with their own vertex type.

use glam::{IVec3, Vec3};

/// Axis-aligned bounding box with float coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BBox3 {
    /// Minimum bounds
    pub min: Vec3,
    /// Maximum bounds
    pub max: Vec3,
}

impl BBox3 {
    /// Creates a new bounding box from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Checks that min does not exceed max on any axis
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }
}

/// Axis-aligned bounding box with integer coordinates, used by
/// bounding-volume tree nodes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PolyBounds {
    /// Minimum bounds
    pub min: IVec3,
    /// Maximum bounds
    pub max: IVec3,
}

impl PolyBounds {
    /// Creates new integer bounds from min and max vertices
    pub fn new(min: IVec3, max: IVec3) -> Self {
        Self { min, max }
    }
}
