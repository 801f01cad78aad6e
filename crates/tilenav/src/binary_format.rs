//! Binary serialization of tiled navigation meshes
//!
//! The stream starts with a format version and a free-form build identifier,
//! followed by the mesh parameters, the tile count, and one record per tile.
//! Within a tile the sub-sections always appear in the same order: polygons,
//! vertices, detail meshes, detail vertices, detail triangles, off-mesh
//! connections, bounding-volume tree, then three trailing scalars.
//!
//! All multi-byte values are little-endian. Integers are 32-bit signed
//! except opaque polygon references, which are carried as raw 32-bit values;
//! floats are 32-bit IEEE. Strings and arrays are prefixed with a 32-bit
//! element count. Nothing in the format self-describes, so the version gate
//! at the head of the stream is the only compatibility check: any version
//! other than [`FORMAT_VERSION`] fails the whole decode.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::{IVec2, IVec3};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

use tilenav_common::{BBox3, Error, PolyBounds, Result, Vec3};

use crate::bv_tree::{BvNode, BvTree};
use crate::nav_mesh::TiledNavMesh;
use crate::poly::{Area, BoundarySide, Link, NavPoly, NavPolyType};
use crate::poly_ref::PolyRef;
use crate::tile::{
    DetailMeshData, DetailTriangle, NavTile, OffMeshConnection, OffMeshConnectionFlags,
};

/// Version of the binary format produced and accepted by this codec
pub const FORMAT_VERSION: i32 = 3;

/// Upper bound on elements reserved ahead of reading an array
///
/// Array lengths come from untrusted data; allocation grows with the
/// elements actually read, so an oversized count exhausts the stream
/// instead of aborting on a failed allocation.
const PREALLOC_CAP: usize = 4096;

/// One record of the wire format
trait WireRecord: Sized {
    /// Name used in length diagnostics
    const NAME: &'static str;

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()>;
    fn read_from<R: Read>(reader: &mut R) -> Result<Self>;
}

/// Writes an array as a 32-bit element count followed by the elements
///
/// An empty slice writes a zero count; absence has no distinct encoding.
fn write_array<W: Write, T: WireRecord>(writer: &mut W, items: &[T]) -> Result<()> {
    let count = i32::try_from(items.len()).map_err(|_| Error::InvalidLength {
        what: T::NAME,
        len: items.len() as i64,
    })?;
    writer.write_i32::<LittleEndian>(count)?;
    for item in items {
        item.write_to(writer)?;
    }
    Ok(())
}

/// Reads a 32-bit element count followed by that many elements
fn read_array<R: Read, T: WireRecord>(reader: &mut R) -> Result<Vec<T>> {
    let count = read_length(reader, T::NAME)?;
    let mut items = Vec::with_capacity(count.min(PREALLOC_CAP));
    for _ in 0..count {
        items.push(T::read_from(reader)?);
    }
    Ok(items)
}

/// Reads a length prefix, rejecting negative values before any allocation
fn read_length<R: Read>(reader: &mut R, what: &'static str) -> Result<usize> {
    let len = reader.read_i32::<LittleEndian>()?;
    if len < 0 {
        return Err(Error::InvalidLength {
            what,
            len: i64::from(len),
        });
    }
    Ok(len as usize)
}

/// Writes a string as a 32-bit byte count followed by UTF-8 bytes
fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<()> {
    let count = i32::try_from(value.len()).map_err(|_| Error::InvalidLength {
        what: "string",
        len: value.len() as i64,
    })?;
    writer.write_i32::<LittleEndian>(count)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

/// Reads a length-prefixed UTF-8 string
fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let count = read_length(reader, "string")?;
    let mut bytes = Vec::with_capacity(count.min(PREALLOC_CAP));
    reader.take(count as u64).read_to_end(&mut bytes)?;
    if bytes.len() != count {
        return Err(Error::UnexpectedEndOfData);
    }
    Ok(String::from_utf8(bytes)?)
}

fn write_ivec2<W: Write>(writer: &mut W, value: IVec2) -> Result<()> {
    writer.write_i32::<LittleEndian>(value.x)?;
    writer.write_i32::<LittleEndian>(value.y)?;
    Ok(())
}

fn read_ivec2<R: Read>(reader: &mut R) -> Result<IVec2> {
    let x = reader.read_i32::<LittleEndian>()?;
    let y = reader.read_i32::<LittleEndian>()?;
    Ok(IVec2::new(x, y))
}

fn write_ivec3<W: Write>(writer: &mut W, value: IVec3) -> Result<()> {
    writer.write_i32::<LittleEndian>(value.x)?;
    writer.write_i32::<LittleEndian>(value.y)?;
    writer.write_i32::<LittleEndian>(value.z)?;
    Ok(())
}

fn read_ivec3<R: Read>(reader: &mut R) -> Result<IVec3> {
    let x = reader.read_i32::<LittleEndian>()?;
    let y = reader.read_i32::<LittleEndian>()?;
    let z = reader.read_i32::<LittleEndian>()?;
    Ok(IVec3::new(x, y, z))
}

fn write_bbox<W: Write>(writer: &mut W, bbox: &BBox3) -> Result<()> {
    bbox.min.write_to(writer)?;
    bbox.max.write_to(writer)
}

fn read_bbox<R: Read>(reader: &mut R) -> Result<BBox3> {
    let min = Vec3::read_from(reader)?;
    let max = Vec3::read_from(reader)?;
    Ok(BBox3::new(min, max))
}

impl WireRecord for Vec3 {
    const NAME: &'static str = "vertex array";

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_f32::<LittleEndian>(self.x)?;
        writer.write_f32::<LittleEndian>(self.y)?;
        writer.write_f32::<LittleEndian>(self.z)?;
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let x = reader.read_f32::<LittleEndian>()?;
        let y = reader.read_f32::<LittleEndian>()?;
        let z = reader.read_f32::<LittleEndian>()?;
        Ok(Vec3::new(x, y, z))
    }
}

impl WireRecord for i32 {
    const NAME: &'static str = "index array";

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        Ok(writer.write_i32::<LittleEndian>(*self)?)
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_i32::<LittleEndian>()?)
    }
}

impl WireRecord for Link {
    const NAME: &'static str = "link list";

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.reference.id())?;
        writer.write_i32::<LittleEndian>(self.edge)?;
        writer.write_u8(self.side.to_u8())?;
        writer.write_i32::<LittleEndian>(self.bmin)?;
        writer.write_i32::<LittleEndian>(self.bmax)?;
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let reference = PolyRef::new(reader.read_u32::<LittleEndian>()?);
        let edge = reader.read_i32::<LittleEndian>()?;
        let side = BoundarySide::from_u8(reader.read_u8()?);
        let bmin = reader.read_i32::<LittleEndian>()?;
        let bmax = reader.read_i32::<LittleEndian>()?;
        Ok(Link {
            reference,
            edge,
            side,
            bmin,
            bmax,
        })
    }
}

impl WireRecord for NavPoly {
    const NAME: &'static str = "polygon array";

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.poly_type.to_u8())?;
        write_array(writer, &self.links)?;
        write_array(writer, &self.verts)?;
        write_array(writer, &self.neis)?;
        writer.write_i32::<LittleEndian>(self.vert_count)?;
        writer.write_u8(self.area.id())?;
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let poly_type = NavPolyType::from_u8(reader.read_u8()?);
        let links = read_array(reader)?;
        let verts = read_array(reader)?;
        let neis = read_array(reader)?;
        // The stored count is authoritative; producers may pad the index
        // arrays beyond the meaningful prefix.
        let vert_count = reader.read_i32::<LittleEndian>()?;
        let area = Area(reader.read_u8()?);
        Ok(NavPoly {
            poly_type,
            links,
            verts,
            neis,
            vert_count,
            area,
        })
    }
}

impl WireRecord for DetailMeshData {
    const NAME: &'static str = "detail mesh array";

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<LittleEndian>(self.vert_index)?;
        writer.write_i32::<LittleEndian>(self.vert_count)?;
        writer.write_i32::<LittleEndian>(self.tri_index)?;
        writer.write_i32::<LittleEndian>(self.tri_count)?;
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let vert_index = reader.read_i32::<LittleEndian>()?;
        let vert_count = reader.read_i32::<LittleEndian>()?;
        let tri_index = reader.read_i32::<LittleEndian>()?;
        let tri_count = reader.read_i32::<LittleEndian>()?;
        Ok(DetailMeshData {
            vert_index,
            vert_count,
            tri_index,
            tri_count,
        })
    }
}

impl WireRecord for DetailTriangle {
    const NAME: &'static str = "detail triangle array";

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<LittleEndian>(self.vertex_hash0)?;
        writer.write_i32::<LittleEndian>(self.vertex_hash1)?;
        writer.write_i32::<LittleEndian>(self.vertex_hash2)?;
        writer.write_i32::<LittleEndian>(self.flags)?;
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let vertex_hash0 = reader.read_i32::<LittleEndian>()?;
        let vertex_hash1 = reader.read_i32::<LittleEndian>()?;
        let vertex_hash2 = reader.read_i32::<LittleEndian>()?;
        let flags = reader.read_i32::<LittleEndian>()?;
        Ok(DetailTriangle {
            vertex_hash0,
            vertex_hash1,
            vertex_hash2,
            flags,
        })
    }
}

impl WireRecord for OffMeshConnection {
    const NAME: &'static str = "off-mesh connection array";

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.pos0.write_to(writer)?;
        self.pos1.write_to(writer)?;
        writer.write_f32::<LittleEndian>(self.radius)?;
        writer.write_i32::<LittleEndian>(self.poly)?;
        writer.write_u8(self.flags.bits())?;
        writer.write_u8(self.side.to_u8())?;
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let pos0 = Vec3::read_from(reader)?;
        let pos1 = Vec3::read_from(reader)?;
        let radius = reader.read_f32::<LittleEndian>()?;
        let poly = reader.read_i32::<LittleEndian>()?;
        let flags = OffMeshConnectionFlags::from_bits_retain(reader.read_u8()?);
        let side = BoundarySide::from_u8(reader.read_u8()?);
        Ok(OffMeshConnection {
            pos0,
            pos1,
            radius,
            poly,
            flags,
            side,
        })
    }
}

impl WireRecord for BvNode {
    const NAME: &'static str = "bounding-volume tree";

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_ivec3(writer, self.bounds.min)?;
        write_ivec3(writer, self.bounds.max)?;
        writer.write_i32::<LittleEndian>(self.index)?;
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let min = read_ivec3(reader)?;
        let max = read_ivec3(reader)?;
        let index = reader.read_i32::<LittleEndian>()?;
        Ok(BvNode {
            bounds: PolyBounds::new(min, max),
            index,
        })
    }
}

/// Writes the format version and a build identifier
pub fn write_header<W: Write>(writer: &mut W, build_id: &str) -> Result<()> {
    writer.write_i32::<LittleEndian>(FORMAT_VERSION)?;
    write_string(writer, build_id)
}

/// Reads the stream header and returns the build identifier
///
/// Fails with [`Error::VersionMismatch`] before reading anything else if
/// the leading version does not equal [`FORMAT_VERSION`]. The build
/// identifier exists for diagnostics only and is not validated.
pub fn read_header<R: Read>(reader: &mut R) -> Result<String> {
    let version = reader.read_i32::<LittleEndian>()?;
    if version != FORMAT_VERSION {
        return Err(Error::VersionMismatch {
            expected: FORMAT_VERSION,
            found: version,
        });
    }
    read_string(reader)
}

/// Writes the mesh's global parameters
fn write_params<W: Write>(writer: &mut W, mesh: &TiledNavMesh) -> Result<()> {
    mesh.origin().write_to(writer)?;
    writer.write_f32::<LittleEndian>(mesh.tile_width())?;
    writer.write_f32::<LittleEndian>(mesh.tile_height())?;
    writer.write_i32::<LittleEndian>(mesh.max_tiles())?;
    writer.write_i32::<LittleEndian>(mesh.max_polys())?;
    Ok(())
}

/// Reads the mesh parameters and constructs the empty mesh shell
fn read_params<R: Read>(reader: &mut R) -> Result<TiledNavMesh> {
    let origin = Vec3::read_from(reader)?;
    let tile_width = reader.read_f32::<LittleEndian>()?;
    let tile_height = reader.read_f32::<LittleEndian>()?;
    let max_tiles = reader.read_i32::<LittleEndian>()?;
    let max_polys = reader.read_i32::<LittleEndian>()?;
    Ok(TiledNavMesh::new(
        origin,
        tile_width,
        tile_height,
        max_tiles,
        max_polys,
    ))
}

/// Writes one tile-table entry: the tile's identifier followed by its body
pub fn write_tile<W: Write>(writer: &mut W, id: PolyRef, tile: &NavTile) -> Result<()> {
    writer.write_u32::<LittleEndian>(id.id())?;
    write_ivec2(writer, tile.location)?;
    writer.write_i32::<LittleEndian>(tile.layer)?;
    writer.write_i32::<LittleEndian>(tile.salt)?;
    write_bbox(writer, &tile.bounds)?;
    write_array(writer, &tile.polys)?;
    write_array(writer, &tile.verts)?;
    write_array(writer, &tile.detail_meshes)?;
    write_array(writer, &tile.detail_verts)?;
    write_array(writer, &tile.detail_tris)?;
    write_array(writer, &tile.off_mesh_connections)?;
    write_array(writer, tile.bv_tree.nodes())?;
    writer.write_i32::<LittleEndian>(tile.bv_quant_factor)?;
    writer.write_i32::<LittleEndian>(tile.bv_node_count)?;
    writer.write_f32::<LittleEndian>(tile.walkable_climb)?;
    Ok(())
}

/// Reads one tile-table entry
///
/// Polygon and off-mesh-connection counts are not stored fields; they
/// follow from the decoded array lengths.
pub fn read_tile<R: Read>(reader: &mut R) -> Result<(PolyRef, NavTile)> {
    let id = PolyRef::new(reader.read_u32::<LittleEndian>()?);
    let location = read_ivec2(reader)?;
    let layer = reader.read_i32::<LittleEndian>()?;

    let mut tile = NavTile::new(location, layer);
    tile.salt = reader.read_i32::<LittleEndian>()?;
    tile.bounds = read_bbox(reader)?;
    tile.polys = read_array(reader)?;
    tile.verts = read_array(reader)?;
    tile.detail_meshes = read_array(reader)?;
    tile.detail_verts = read_array(reader)?;
    tile.detail_tris = read_array(reader)?;
    tile.off_mesh_connections = read_array(reader)?;
    tile.bv_tree = BvTree::new(read_array(reader)?);
    tile.bv_quant_factor = reader.read_i32::<LittleEndian>()?;
    tile.bv_node_count = reader.read_i32::<LittleEndian>()?;
    tile.walkable_climb = reader.read_f32::<LittleEndian>()?;
    Ok((id, tile))
}

/// Writes a complete navigation mesh to a stream
pub fn write_nav_mesh<W: Write>(writer: &mut W, mesh: &TiledNavMesh) -> Result<()> {
    write_header(writer, env!("CARGO_PKG_VERSION"))?;
    write_params(writer, mesh)?;

    let count = i32::try_from(mesh.tile_count()).map_err(|_| Error::InvalidLength {
        what: "tile table",
        len: mesh.tile_count() as i64,
    })?;
    writer.write_i32::<LittleEndian>(count)?;
    for entry in mesh.tiles() {
        write_tile(writer, entry.id, &entry.tile)?;
    }

    log::debug!("wrote navigation mesh with {} tiles", mesh.tile_count());
    Ok(())
}

/// Reads a complete navigation mesh from a stream
///
/// Tiles are inserted into the mesh in read order, which downstream
/// consumers rely on for slot layout; nothing is reordered or deduplicated.
pub fn read_nav_mesh<R: Read>(reader: &mut R) -> Result<TiledNavMesh> {
    let build_id = read_header(reader)?;
    let mut mesh = read_params(reader)?;

    let tile_count = read_length(reader, "tile table")?;
    for _ in 0..tile_count {
        let (id, tile) = read_tile(reader)?;
        log::trace!(
            "read tile {:#010x} at ({}, {}) layer {}",
            id.id(),
            tile.location.x,
            tile.location.y,
            tile.layer
        );
        mesh.add_tile_at(tile, id)?;
    }

    log::debug!("read navigation mesh built by {build_id}: {tile_count} tiles");
    Ok(mesh)
}

/// Serializes a navigation mesh into a byte buffer
pub fn save_nav_mesh_to_binary(mesh: &TiledNavMesh) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_nav_mesh(&mut buffer, mesh)?;
    Ok(buffer)
}

/// Deserializes a navigation mesh from a byte buffer
pub fn load_nav_mesh_from_binary(data: &[u8]) -> Result<TiledNavMesh> {
    let mut cursor = Cursor::new(data);
    read_nav_mesh(&mut cursor)
}

/// Serializes a navigation mesh to a file
pub fn save_nav_mesh_to_file<P: AsRef<Path>>(path: P, mesh: &TiledNavMesh) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_nav_mesh(&mut writer, mesh)?;
    writer.flush()?;
    Ok(())
}

/// Deserializes a navigation mesh from a file
pub fn load_nav_mesh_from_file<P: AsRef<Path>>(path: P) -> Result<TiledNavMesh> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    read_nav_mesh(&mut reader)
}
