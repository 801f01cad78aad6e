//! Tiled navigation mesh
//!
//! The mesh owns an ordered table of tiles keyed by opaque references. Tile
//! order is significant: it determines slot layout for downstream
//! consumers, so insertion order is preserved and never re-sorted.

use tilenav_common::{Error, Result, Vec3};

use crate::poly_ref::{PolyIdManager, PolyRef};
use crate::tile::NavTile;

/// One entry of the mesh's tile table
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TileEntry {
    /// Identifier the tile was registered under
    pub id: PolyRef,
    /// The tile itself
    pub tile: NavTile,
}

/// Tiled navigation mesh
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TiledNavMesh {
    origin: Vec3,
    tile_width: f32,
    tile_height: f32,
    max_tiles: i32,
    max_polys: i32,
    id_manager: PolyIdManager,
    tiles: Vec<TileEntry>,
}

impl TiledNavMesh {
    /// Creates an empty mesh with the given global parameters
    ///
    /// The id manager's bit partitioning is derived from the capacities, so
    /// references handed out for this mesh stay decodable for its lifetime.
    pub fn new(
        origin: Vec3,
        tile_width: f32,
        tile_height: f32,
        max_tiles: i32,
        max_polys: i32,
    ) -> Self {
        Self {
            origin,
            tile_width,
            tile_height,
            max_tiles,
            max_polys,
            id_manager: PolyIdManager::for_capacities(max_tiles, max_polys),
            tiles: Vec::new(),
        }
    }

    /// World-space origin of the tile grid
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Width of one tile along X
    pub fn tile_width(&self) -> f32 {
        self.tile_width
    }

    /// Height of one tile along Z
    pub fn tile_height(&self) -> f32 {
        self.tile_height
    }

    /// Maximum number of tiles the mesh was sized for
    pub fn max_tiles(&self) -> i32 {
        self.max_tiles
    }

    /// Maximum number of polygons per tile the mesh was sized for
    pub fn max_polys(&self) -> i32 {
        self.max_polys
    }

    /// The identifier manager paired with this mesh
    pub fn id_manager(&self) -> &PolyIdManager {
        &self.id_manager
    }

    /// Number of tiles currently in the mesh
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Tiles with their identifiers, in insertion order
    pub fn tiles(&self) -> impl Iterator<Item = &TileEntry> {
        self.tiles.iter()
    }

    /// Registers a tile under the given identifier
    ///
    /// Identifiers must be unique within the mesh; a duplicate is an
    /// invariant violation and is rejected rather than replacing or
    /// reordering anything.
    pub fn add_tile_at(&mut self, tile: NavTile, id: PolyRef) -> Result<()> {
        if self.tiles.iter().any(|entry| entry.id == id) {
            return Err(Error::DuplicateTileId(id.id()));
        }
        self.tiles.push(TileEntry { id, tile });
        Ok(())
    }

    /// Looks up a tile by its identifier
    pub fn tile_at(&self, id: PolyRef) -> Option<&NavTile> {
        self.tiles
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.tile)
    }
}
