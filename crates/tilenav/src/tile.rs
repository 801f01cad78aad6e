//! Navigation mesh tiles and their sub-records
//!
//! A tile owns one rectangular region of the navigable world: its polygons,
//! vertex positions, an optional detail triangulation for accurate height
//! queries, off-mesh connections, and a bounding-volume tree over the
//! polygons.

use glam::IVec2;

use tilenav_common::{BBox3, Vec3};

use crate::bv_tree::BvTree;
use crate::poly::{BoundarySide, NavPoly};

bitflags::bitflags! {
    /// Flags carried by an off-mesh connection
    ///
    /// Only the bidirectional bit is assigned; the remaining bits are user
    /// data and survive a round trip untouched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(
        feature = "serialization",
        derive(serde::Serialize, serde::Deserialize)
    )]
    pub struct OffMeshConnectionFlags: u8 {
        /// The connection can be traversed in both directions
        const BIDIRECTIONAL = 0x01;
    }
}

/// Explicit link between two arbitrary points, such as a jump or teleport
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct OffMeshConnection {
    /// Start endpoint
    pub pos0: Vec3,
    /// End endpoint
    pub pos1: Vec3,
    /// Endpoint snap radius
    pub radius: f32,
    /// Index of the polygon representing the connection within its tile
    pub poly: i32,
    /// Connection flags
    pub flags: OffMeshConnectionFlags,
    /// Tile edge the connection crosses, or `Internal`
    pub side: BoundarySide,
}

/// Slice descriptor mapping one polygon onto the tile's detail arrays
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct DetailMeshData {
    /// First vertex in the tile's detail vertex array
    pub vert_index: i32,
    /// Number of detail vertices
    pub vert_count: i32,
    /// First triangle in the tile's detail triangle array
    pub tri_index: i32,
    /// Number of detail triangles
    pub tri_count: i32,
}

/// One triangle of a polygon's detail mesh
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct DetailTriangle {
    /// Hash of the first vertex
    pub vertex_hash0: i32,
    /// Hash of the second vertex
    pub vertex_hash1: i32,
    /// Hash of the third vertex
    pub vertex_hash2: i32,
    /// Packed edge flags
    pub flags: i32,
}

/// Tile of a tiled navigation mesh
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NavTile {
    /// Location in the tile grid
    pub location: IVec2,
    /// Layer index at that location
    pub layer: i32,
    /// Reuse-generation counter embedded alongside the tile's identifier
    pub salt: i32,
    /// Axis-aligned bounds of the tile
    pub bounds: BBox3,
    /// Polygons in the tile
    pub polys: Vec<NavPoly>,
    /// Vertex positions referenced by the polygons
    pub verts: Vec<Vec3>,
    /// Per-polygon slices into the detail arrays
    pub detail_meshes: Vec<DetailMeshData>,
    /// Detail mesh vertex positions
    pub detail_verts: Vec<Vec3>,
    /// Detail mesh triangles
    pub detail_tris: Vec<DetailTriangle>,
    /// Off-mesh connections anchored in this tile
    pub off_mesh_connections: Vec<OffMeshConnection>,
    /// Bounding-volume tree over the polygons
    pub bv_tree: BvTree,
    /// Quantization factor of the bounding-volume coordinates
    pub bv_quant_factor: i32,
    /// Stored node count of the bounding-volume tree
    pub bv_node_count: i32,
    /// Maximum climb height used when the tile was built
    pub walkable_climb: f32,
}

impl NavTile {
    /// Creates an empty tile at the given grid location and layer
    pub fn new(location: IVec2, layer: i32) -> Self {
        Self {
            location,
            layer,
            salt: 0,
            bounds: BBox3::default(),
            polys: Vec::new(),
            verts: Vec::new(),
            detail_meshes: Vec::new(),
            detail_verts: Vec::new(),
            detail_tris: Vec::new(),
            off_mesh_connections: Vec::new(),
            bv_tree: BvTree::default(),
            bv_quant_factor: 0,
            bv_node_count: 0,
            walkable_climb: 0.0,
        }
    }

    /// Number of polygons in the tile
    ///
    /// Derived from the polygon array; the count is not a stored field.
    pub fn poly_count(&self) -> usize {
        self.polys.len()
    }

    /// Number of off-mesh connections in the tile
    ///
    /// Derived from the connection array; the count is not a stored field.
    pub fn off_mesh_connection_count(&self) -> usize {
        self.off_mesh_connections.len()
    }
}
