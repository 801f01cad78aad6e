//! Tiled navigation mesh data model and binary serializer
//!
//! A [`TiledNavMesh`] is the runtime structure pathfinding queries consume:
//! a grid of tiles, each holding polygons, vertices, detail triangulation,
//! off-mesh connections and a bounding-volume tree. This crate defines that
//! structure and the [`binary_format`] codec that persists it to a compact
//! byte stream and restores it, rejecting streams written by an
//! incompatible format version.
//!
//! Mesh construction from raw geometry and the query algorithms themselves
//! live with other collaborators; nothing here builds or searches a mesh.

pub mod binary_format;
mod bv_tree;
mod nav_mesh;
mod poly;
mod poly_ref;
mod tile;

mod serialization_tests;

pub use binary_format::FORMAT_VERSION;
pub use bv_tree::{BvNode, BvTree};
pub use nav_mesh::{TileEntry, TiledNavMesh};
pub use poly::{Area, BoundarySide, Link, NavPoly, NavPolyType};
pub use poly_ref::{PolyIdManager, PolyRef};
pub use tile::{
    DetailMeshData, DetailTriangle, NavTile, OffMeshConnection, OffMeshConnectionFlags,
};
