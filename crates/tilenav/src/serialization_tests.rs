//! End-to-end serialization tests
//!
//! These tests exercise the full encode/decode path on complete meshes:
//! round-trip identity, cross-tile reference pass-through, and the
//! derived-count and version-gate guarantees of the format.

#[cfg(test)]
mod tests {
    use byteorder::{LittleEndian, WriteBytesExt};
    use glam::{IVec2, IVec3};

    use tilenav_common::{BBox3, Error, PolyBounds, Result, Vec3};

    use crate::binary_format::{
        FORMAT_VERSION, load_nav_mesh_from_binary, load_nav_mesh_from_file,
        save_nav_mesh_to_binary, save_nav_mesh_to_file,
    };
    use crate::{
        Area, BoundarySide, BvNode, BvTree, DetailMeshData, DetailTriangle, Link, NavPoly,
        NavPolyType, NavTile, OffMeshConnection, OffMeshConnectionFlags, PolyRef, TiledNavMesh,
    };

    /// One-tile mesh with a single triangle linked to itself, per the
    /// simplest complete mesh a builder can produce
    fn single_triangle_mesh() -> (TiledNavMesh, PolyRef) {
        let mut mesh = TiledNavMesh::new(Vec3::ZERO, 1.0, 1.0, 1, 8);
        let tile_ref = mesh.id_manager().encode(1, 0, 0);

        let mut tile = NavTile::new(IVec2::new(0, 0), 0);
        tile.salt = 1;
        tile.bounds = BBox3::new(Vec3::ZERO, Vec3::new(1.0, 0.5, 1.0));
        tile.verts = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];

        let mut poly = NavPoly::new();
        poly.verts = vec![0, 1, 2];
        poly.neis = vec![0, 0, 0];
        poly.vert_count = 3;
        poly.area = Area::DEFAULT;
        poly.links.push(Link {
            reference: tile_ref,
            edge: 0,
            side: BoundarySide::Internal,
            bmin: 0,
            bmax: 255,
        });
        tile.polys.push(poly);

        tile.bv_tree = BvTree::new(vec![BvNode {
            bounds: PolyBounds::new(IVec3::ZERO, IVec3::new(65535, 32767, 65535)),
            index: 0,
        }]);
        tile.bv_quant_factor = 1;
        tile.bv_node_count = 1;
        tile.walkable_climb = 0.5;

        mesh.add_tile_at(tile, tile_ref).unwrap();
        (mesh, tile_ref)
    }

    /// Mesh with detail data, off-mesh connections and several polygons,
    /// used for whole-structure equality checks
    fn populated_mesh() -> TiledNavMesh {
        let mut mesh = TiledNavMesh::new(Vec3::new(-10.0, 0.0, -10.0), 16.0, 16.0, 32, 256);

        for i in 0..3i32 {
            let mut tile = NavTile::new(IVec2::new(i, i % 2), i % 2);
            tile.salt = i + 1;
            tile.bounds = BBox3::new(
                Vec3::new(i as f32 * 16.0, 0.0, 0.0),
                Vec3::new((i + 1) as f32 * 16.0, 4.0, 16.0),
            );
            tile.verts = (0..4)
                .map(|v| Vec3::new(v as f32, 0.25 * v as f32, (v * v) as f32))
                .collect();

            for p in 0..2 {
                let mut poly = NavPoly::new();
                poly.poly_type = if p == 0 {
                    NavPolyType::Ground
                } else {
                    NavPolyType::OffMeshConnection
                };
                poly.verts = vec![0, 1, 2, 3];
                poly.neis = vec![-1, 0x8000, 2, 0];
                poly.vert_count = 4;
                poly.area = Area((p + 10) as u8);
                poly.links.push(Link {
                    reference: mesh.id_manager().encode((i + 1) as u32, i as u32, p as u32),
                    edge: p,
                    side: BoundarySide::PlusX,
                    bmin: 10 * p,
                    bmax: 10 * p + 5,
                });
                tile.polys.push(poly);
            }

            tile.detail_meshes = vec![DetailMeshData {
                vert_index: 0,
                vert_count: 2,
                tri_index: 0,
                tri_count: 1,
            }];
            tile.detail_verts = vec![Vec3::new(0.5, 0.1, 0.5), Vec3::new(0.6, 0.1, 0.4)];
            tile.detail_tris = vec![DetailTriangle {
                vertex_hash0: 11,
                vertex_hash1: 22,
                vertex_hash2: 33,
                flags: 0b0101,
            }];

            tile.off_mesh_connections = vec![OffMeshConnection {
                pos0: Vec3::new(0.0, 1.0, 0.0),
                pos1: Vec3::new(2.0, 1.0, 2.0),
                radius: 0.4,
                poly: 1,
                flags: OffMeshConnectionFlags::BIDIRECTIONAL,
                side: BoundarySide::Internal,
            }];

            tile.bv_tree = BvTree::new(vec![
                BvNode {
                    bounds: PolyBounds::new(IVec3::ZERO, IVec3::splat(1000)),
                    index: -3,
                },
                BvNode {
                    bounds: PolyBounds::new(IVec3::ZERO, IVec3::splat(500)),
                    index: 0,
                },
                BvNode {
                    bounds: PolyBounds::new(IVec3::splat(500), IVec3::splat(1000)),
                    index: 1,
                },
            ]);
            tile.bv_quant_factor = 2048;
            tile.bv_node_count = 3;
            tile.walkable_climb = 0.9;

            let id = mesh.id_manager().encode((i + 1) as u32, i as u32, 0);
            mesh.add_tile_at(tile, id).unwrap();
        }

        mesh
    }

    #[test]
    fn single_triangle_round_trip_is_exact() -> Result<()> {
        let (mesh, tile_ref) = single_triangle_mesh();

        let bytes = save_nav_mesh_to_binary(&mesh)?;
        let read = load_nav_mesh_from_binary(&bytes)?;

        assert_eq!(read.origin(), Vec3::ZERO);
        assert_eq!(read.tile_width(), 1.0);
        assert_eq!(read.tile_height(), 1.0);
        assert_eq!(read.max_tiles(), 1);
        assert_eq!(read.max_polys(), 8);
        assert_eq!(read.tile_count(), 1);

        let tile = read.tile_at(tile_ref).expect("tile keeps its identifier");
        assert_eq!(tile.location, IVec2::new(0, 0));
        assert_eq!(tile.layer, 0);
        assert_eq!(tile.salt, 1);
        assert_eq!(tile.bounds, BBox3::new(Vec3::ZERO, Vec3::new(1.0, 0.5, 1.0)));
        assert_eq!(tile.verts.len(), 3);
        assert_eq!(tile.verts[1], Vec3::new(1.0, 0.0, 0.0));

        assert_eq!(tile.poly_count(), 1);
        let poly = &tile.polys[0];
        assert_eq!(poly.poly_type, NavPolyType::Ground);
        assert_eq!(poly.verts, vec![0, 1, 2]);
        assert_eq!(poly.neis, vec![0, 0, 0]);
        assert_eq!(poly.vert_count, 3);
        assert_eq!(poly.area, Area::DEFAULT);

        assert_eq!(poly.links.len(), 1);
        let link = &poly.links[0];
        assert_eq!(link.reference, tile_ref);
        assert_eq!(link.edge, 0);
        assert_eq!(link.side, BoundarySide::Internal);
        assert_eq!(link.bmin, 0);
        assert_eq!(link.bmax, 255);

        assert!(tile.detail_meshes.is_empty());
        assert!(tile.detail_verts.is_empty());
        assert!(tile.detail_tris.is_empty());
        assert_eq!(tile.off_mesh_connection_count(), 0);

        assert_eq!(tile.bv_tree.len(), 1);
        assert!(tile.bv_tree[0].is_leaf());
        assert_eq!(tile.bv_tree[0].index, 0);
        assert_eq!(
            tile.bv_tree[0].bounds,
            PolyBounds::new(IVec3::ZERO, IVec3::new(65535, 32767, 65535))
        );
        assert_eq!(tile.bv_quant_factor, 1);
        assert_eq!(tile.bv_node_count, 1);
        assert_eq!(tile.walkable_climb, 0.5);
        Ok(())
    }

    #[test]
    fn populated_mesh_round_trip_is_structurally_equal() -> Result<()> {
        let mesh = populated_mesh();
        let read = load_nav_mesh_from_binary(&save_nav_mesh_to_binary(&mesh)?)?;
        assert_eq!(read, mesh);
        Ok(())
    }

    #[test]
    fn cross_tile_link_reference_passes_through() -> Result<()> {
        let mut mesh = TiledNavMesh::new(Vec3::ZERO, 8.0, 8.0, 4, 16);
        let id_a = mesh.id_manager().encode(1, 0, 0);
        let id_b = mesh.id_manager().encode(1, 1, 0);

        // Tile A holds a polygon whose link targets a polygon of tile B.
        let target_in_b = mesh.id_manager().encode(1, 1, 3);
        let mut tile_a = NavTile::new(IVec2::new(0, 0), 0);
        let mut poly = NavPoly::new();
        poly.verts = vec![0, 1, 2];
        poly.vert_count = 3;
        poly.links.push(Link {
            reference: target_in_b,
            edge: 1,
            side: BoundarySide::PlusX,
            bmin: 0,
            bmax: 128,
        });
        tile_a.polys.push(poly);

        let tile_b = NavTile::new(IVec2::new(1, 0), 0);
        mesh.add_tile_at(tile_a, id_a).unwrap();
        mesh.add_tile_at(tile_b, id_b).unwrap();

        let read = load_nav_mesh_from_binary(&save_nav_mesh_to_binary(&mesh)?)?;
        let link = &read.tile_at(id_a).unwrap().polys[0].links[0];
        assert_eq!(link.reference, target_in_b);
        assert_eq!(
            read.id_manager().decode_tile_index(link.reference),
            1,
            "the reference still points into tile B"
        );
        Ok(())
    }

    #[test]
    fn empty_and_absent_arrays_collapse_to_empty() -> Result<()> {
        let mut mesh = TiledNavMesh::new(Vec3::ZERO, 4.0, 4.0, 2, 4);
        // A bare tile: every optional collection left untouched.
        mesh.add_tile_at(NavTile::new(IVec2::new(0, 0), 0), PolyRef::new(1))
            .unwrap();

        let read = load_nav_mesh_from_binary(&save_nav_mesh_to_binary(&mesh)?)?;
        let tile = read.tile_at(PolyRef::new(1)).unwrap();
        assert!(tile.polys.is_empty());
        assert!(tile.verts.is_empty());
        assert!(tile.detail_meshes.is_empty());
        assert!(tile.detail_verts.is_empty());
        assert!(tile.detail_tris.is_empty());
        assert!(tile.off_mesh_connections.is_empty());
        assert!(tile.bv_tree.is_empty());
        Ok(())
    }

    #[test]
    fn counts_derive_from_decoded_array_lengths() -> Result<()> {
        let mut mesh = TiledNavMesh::new(Vec3::ZERO, 8.0, 8.0, 2, 16);
        let mut tile = NavTile::new(IVec2::new(0, 0), 0);
        for _ in 0..3 {
            let mut poly = NavPoly::new();
            poly.verts = vec![0, 1, 2];
            poly.vert_count = 3;
            tile.polys.push(poly);
        }
        for i in 0..2 {
            tile.off_mesh_connections.push(OffMeshConnection {
                pos0: Vec3::splat(i as f32),
                pos1: Vec3::splat(i as f32 + 1.0),
                radius: 0.3,
                poly: i,
                flags: OffMeshConnectionFlags::empty(),
                side: BoundarySide::Internal,
            });
        }
        mesh.add_tile_at(tile, PolyRef::new(5)).unwrap();

        let read = load_nav_mesh_from_binary(&save_nav_mesh_to_binary(&mesh)?)?;
        let tile = read.tile_at(PolyRef::new(5)).unwrap();
        assert_eq!(tile.poly_count(), 3);
        assert_eq!(tile.off_mesh_connection_count(), 2);
        Ok(())
    }

    #[test]
    fn tile_order_is_read_order() -> Result<()> {
        let mut mesh = TiledNavMesh::new(Vec3::ZERO, 8.0, 8.0, 8, 16);
        for i in 0..5u32 {
            mesh.add_tile_at(
                NavTile::new(IVec2::new(i as i32, 0), 0),
                PolyRef::new(0x500 - i),
            )
            .unwrap();
        }

        let read = load_nav_mesh_from_binary(&save_nav_mesh_to_binary(&mesh)?)?;
        let ids: Vec<u32> = read.tiles().map(|entry| entry.id.id()).collect();
        assert_eq!(ids, vec![0x500, 0x4FF, 0x4FE, 0x4FD, 0x4FC]);
        Ok(())
    }

    #[test]
    fn version_gate_fires_before_anything_else() {
        let (mesh, _) = single_triangle_mesh();
        let mut bytes = save_nav_mesh_to_binary(&mesh).unwrap();

        // Overwrite the leading version; the rest of the stream is intact.
        bytes[0..4].copy_from_slice(&9i32.to_le_bytes());
        let err = load_nav_mesh_from_binary(&bytes).unwrap_err();
        assert!(matches!(
            err,
            Error::VersionMismatch {
                expected: FORMAT_VERSION,
                found: 9,
            }
        ));

        // A stream holding nothing but a wrong version fails the same way:
        // the gate does not depend on anything after the version field.
        let mut short = Vec::new();
        short.write_i32::<LittleEndian>(FORMAT_VERSION - 1).unwrap();
        let err = load_nav_mesh_from_binary(&short).unwrap_err();
        assert!(matches!(err, Error::VersionMismatch { found, .. } if found == FORMAT_VERSION - 1));
    }

    #[test]
    fn truncated_mesh_fails_with_end_of_data() {
        let mesh = populated_mesh();
        let bytes = save_nav_mesh_to_binary(&mesh).unwrap();

        let err = load_nav_mesh_from_binary(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEndOfData));
    }

    #[test]
    fn duplicate_tile_ids_fail_decode() {
        let mut mesh = TiledNavMesh::new(Vec3::ZERO, 8.0, 8.0, 4, 16);
        mesh.add_tile_at(NavTile::new(IVec2::new(0, 0), 0), PolyRef::new(7))
            .unwrap();
        mesh.add_tile_at(NavTile::new(IVec2::new(1, 0), 0), PolyRef::new(8))
            .unwrap();
        let mut bytes = save_nav_mesh_to_binary(&mesh).unwrap();

        // Rewrite the second tile's identifier to collide with the first.
        // Both tiles are empty, so the second id sits one fixed-size tile
        // record after the first.
        let first_id_offset = bytes.len() - 2 * empty_tile_wire_size();
        let second_id_offset = bytes.len() - empty_tile_wire_size();
        bytes.copy_within(first_id_offset..first_id_offset + 4, second_id_offset);

        let err = load_nav_mesh_from_binary(&bytes).unwrap_err();
        assert!(matches!(err, Error::DuplicateTileId(7)));
    }

    /// Wire size of a tile with no polygons, vertices, detail data,
    /// connections or BV nodes
    fn empty_tile_wire_size() -> usize {
        // id + location + layer + salt + bounds + 7 zero counts + 3 scalars
        4 + 8 + 4 + 4 + 24 + 7 * 4 + 12
    }

    #[test]
    fn file_round_trip() -> Result<()> {
        let mesh = populated_mesh();
        let path = std::env::temp_dir().join(format!("tilenav-roundtrip-{}.nav", std::process::id()));

        save_nav_mesh_to_file(&path, &mesh)?;
        let read = load_nav_mesh_from_file(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(read?, mesh);
        Ok(())
    }
}
