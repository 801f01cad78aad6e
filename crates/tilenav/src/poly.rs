//! Polygons and the links connecting them
//!
//! A polygon is a convex navigable cell inside a tile. Its vertices are
//! indices into the owning tile's vertex array, and its links describe
//! adjacency to other polygons, possibly across tile boundaries.

use crate::PolyRef;

/// Kind of a navigation polygon
///
/// Unrecognized codes are preserved verbatim in [`NavPolyType::Unknown`]
/// instead of being rejected, so foreign data survives a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum NavPolyType {
    /// Standard ground polygon
    Ground,
    /// Polygon representing an off-mesh connection endpoint
    OffMeshConnection,
    /// Code outside the known set, kept as-is
    Unknown(u8),
}

impl NavPolyType {
    /// Decodes a polygon type from its single-byte wire code
    pub fn from_u8(code: u8) -> Self {
        match code {
            0 => NavPolyType::Ground,
            1 => NavPolyType::OffMeshConnection,
            other => NavPolyType::Unknown(other),
        }
    }

    /// Returns the single-byte wire code
    pub fn to_u8(self) -> u8 {
        match self {
            NavPolyType::Ground => 0,
            NavPolyType::OffMeshConnection => 1,
            NavPolyType::Unknown(code) => code,
        }
    }
}

/// Which edge of a tile's rectangle a link or connection crosses
///
/// The eight compass codes follow the X/Z plane layout of the tile grid;
/// `Internal` marks links that stay inside one tile. As with
/// [`NavPolyType`], codes outside the known set are preserved opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum BoundarySide {
    /// +X edge
    PlusX,
    /// +X/+Z corner
    PlusXPlusZ,
    /// +Z edge
    PlusZ,
    /// -X/+Z corner
    MinusXPlusZ,
    /// -X edge
    MinusX,
    /// -X/-Z corner
    MinusXMinusZ,
    /// -Z edge
    MinusZ,
    /// +X/-Z corner
    PlusXMinusZ,
    /// The link does not cross a tile boundary
    Internal,
    /// Code outside the known set, kept as-is
    Unknown(u8),
}

impl BoundarySide {
    /// Decodes a boundary side from its single-byte wire code
    pub fn from_u8(code: u8) -> Self {
        match code {
            0 => BoundarySide::PlusX,
            1 => BoundarySide::PlusXPlusZ,
            2 => BoundarySide::PlusZ,
            3 => BoundarySide::MinusXPlusZ,
            4 => BoundarySide::MinusX,
            5 => BoundarySide::MinusXMinusZ,
            6 => BoundarySide::MinusZ,
            7 => BoundarySide::PlusXMinusZ,
            0xff => BoundarySide::Internal,
            other => BoundarySide::Unknown(other),
        }
    }

    /// Returns the single-byte wire code
    pub fn to_u8(self) -> u8 {
        match self {
            BoundarySide::PlusX => 0,
            BoundarySide::PlusXPlusZ => 1,
            BoundarySide::PlusZ => 2,
            BoundarySide::MinusXPlusZ => 3,
            BoundarySide::MinusX => 4,
            BoundarySide::MinusXMinusZ => 5,
            BoundarySide::MinusZ => 6,
            BoundarySide::PlusXMinusZ => 7,
            BoundarySide::Internal => 0xff,
            BoundarySide::Unknown(code) => code,
        }
    }
}

/// Area classification of a polygon
///
/// A single-byte category id assigned during mesh generation. The codec
/// round-trips it without interpreting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Area(pub u8);

impl Area {
    /// The "not walkable" area
    pub const NULL: Area = Area(0);
    /// The default walkable area
    pub const DEFAULT: Area = Area(63);

    /// Returns the raw category id
    pub fn id(&self) -> u8 {
        self.0
    }
}

/// Directed adjacency edge from one polygon to another
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Link {
    /// Reference to the connected polygon, possibly in another tile
    pub reference: PolyRef,
    /// Index of the polygon edge the link leaves from
    pub edge: i32,
    /// Tile edge the link crosses, or `Internal`
    pub side: BoundarySide,
    /// Lower bound of the clamped boundary overlap range
    pub bmin: i32,
    /// Upper bound of the clamped boundary overlap range
    pub bmax: i32,
}

impl Link {
    /// Creates an internal link along the given edge
    pub fn internal(reference: PolyRef, edge: i32) -> Self {
        Self {
            reference,
            edge,
            side: BoundarySide::Internal,
            bmin: 0,
            bmax: 0,
        }
    }
}

/// Polygon in a navigation mesh tile
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NavPoly {
    /// Polygon kind
    pub poly_type: NavPolyType,
    /// Links to neighboring polygons
    pub links: Vec<Link>,
    /// Vertex indices into the owning tile's vertex array
    pub verts: Vec<i32>,
    /// Per-edge neighbor indices (no neighbor, external boundary, or a
    /// polygon index)
    pub neis: Vec<i32>,
    /// Number of meaningful vertices
    ///
    /// Stored explicitly and authoritative: the index arrays may be longer
    /// than the meaningful prefix in some producers, so this is never
    /// recomputed from `verts.len()`.
    pub vert_count: i32,
    /// Area classification
    pub area: Area,
}

impl Default for NavPoly {
    fn default() -> Self {
        Self::new()
    }
}

impl NavPoly {
    /// Creates an empty ground polygon
    pub fn new() -> Self {
        Self {
            poly_type: NavPolyType::Ground,
            links: Vec::new(),
            verts: Vec::new(),
            neis: Vec::new(),
            vert_count: 0,
            area: Area::NULL,
        }
    }
}
