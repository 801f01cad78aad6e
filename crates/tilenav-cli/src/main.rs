//! CLI utility for tilenav navigation mesh files

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tilenav::binary_format::{load_nav_mesh_from_file, save_nav_mesh_to_file};
use tilenav::TiledNavMesh;

/// A CLI utility for inspecting and re-encoding tilenav navigation mesh files
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the parameters and per-tile statistics of a mesh file
    Info {
        /// Navigation mesh file to inspect
        #[clap(value_parser)]
        input: PathBuf,
    },

    /// Decode a mesh file and re-encode it to a new file
    Copy {
        /// Navigation mesh file to read
        #[clap(value_parser)]
        input: PathBuf,

        /// Destination file
        #[clap(value_parser)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Info { input } => info(&input),
        Commands::Copy { input, output } => copy(&input, &output),
    }
}

fn info(input: &PathBuf) -> Result<()> {
    let mesh = load_nav_mesh_from_file(input)
        .with_context(|| format!("failed to load navigation mesh from {}", input.display()))?;

    print_mesh_summary(&mesh);
    Ok(())
}

fn copy(input: &PathBuf, output: &PathBuf) -> Result<()> {
    let mesh = load_nav_mesh_from_file(input)
        .with_context(|| format!("failed to load navigation mesh from {}", input.display()))?;

    save_nav_mesh_to_file(output, &mesh)
        .with_context(|| format!("failed to save navigation mesh to {}", output.display()))?;

    let bytes = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    log::info!("re-encoded {} tiles into {bytes} bytes", mesh.tile_count());
    println!(
        "copied {} -> {} ({} tiles, {bytes} bytes)",
        input.display(),
        output.display(),
        mesh.tile_count()
    );
    Ok(())
}

fn print_mesh_summary(mesh: &TiledNavMesh) {
    let origin = mesh.origin();
    println!("origin:       ({}, {}, {})", origin.x, origin.y, origin.z);
    println!("tile size:    {} x {}", mesh.tile_width(), mesh.tile_height());
    println!("capacity:     {} tiles, {} polys/tile", mesh.max_tiles(), mesh.max_polys());
    println!(
        "id layout:    {} salt / {} tile / {} poly bits",
        mesh.id_manager().salt_bits(),
        mesh.id_manager().tile_bits(),
        mesh.id_manager().poly_bits()
    );
    println!("tiles:        {}", mesh.tile_count());

    for entry in mesh.tiles() {
        let tile = &entry.tile;
        let bv_leaves = tile.bv_tree.nodes().iter().filter(|n| n.is_leaf()).count();
        let links: usize = tile.polys.iter().map(|p| p.links.len()).sum();
        println!(
            "  tile {:#010x} at ({}, {}) layer {}: {} polys, {} verts, {} links, \
             {} detail tris, {} off-mesh connections, {} bv nodes ({} leaves)",
            entry.id.id(),
            tile.location.x,
            tile.location.y,
            tile.layer,
            tile.poly_count(),
            tile.verts.len(),
            links,
            tile.detail_tris.len(),
            tile.off_mesh_connection_count(),
            tile.bv_tree.len(),
            bv_leaves
        );
        if !tile.bounds.is_valid() {
            println!("    warning: tile bounds are inverted");
        }
    }
}
