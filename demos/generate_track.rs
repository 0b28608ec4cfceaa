//! Complete workflow demonstration for voronoi_track

use voronoi_track::generation::generate_cells;
use voronoi_track::*;

fn main() -> Result<()> {
    println!("=== voronoi_track Complete Demo ===\n");

    // Step 1: Configure track
    println!("Step 1: Configuring track...");
    let config = TrackConfigBuilder::new()
        .seed(12345)
        .for_cell_count(14)?
        .complexity(0.6)?
        .track_width(3.0)?
        .build()?;

    println!("  Seed: {}", config.seed);
    println!(
        "  Grid: {}x{} ({} cells, {} candidates)",
        config.plane_width,
        config.plane_height,
        config.cell_count(),
        config.candidate_cell_count()
    );
    println!("  Selection: {}", config.selection.name());
    println!("  Min vertex spacing: {:.2}", config.min_vertex_spacing());

    // Step 2: Inspect the Voronoi diagram
    println!("\nStep 2: Building Voronoi diagram...");
    let cells = generate_cells(&config)?;
    let valid = cells.iter().filter(|c| c.valid).count();
    let avg_vertices =
        cells.iter().map(|c| c.vertex_count()).sum::<usize>() as f32 / cells.len() as f32;
    println!("  {} cells ({} valid)", cells.len(), valid);
    println!("  Average vertices per cell: {:.2}", avg_vertices);

    // Step 3: Generate track, retrying seeds the way a caller should
    println!("\nStep 3: Generating track...");
    let mut attempt = config;
    let track = loop {
        match Track::generate(attempt) {
            Ok(track) => break track,
            Err(err @ (TrackError::SelectionExhausted(_) | TrackError::Topology(_))) => {
                println!("  Seed {} failed ({}), retrying", attempt.seed, err);
                attempt.seed = attempt.seed.wrapping_add(1);
            }
            Err(err) => return Err(err),
        }
    };

    let report = track.report();
    println!("  Region: {} cells {:?}", report.region.len(), report.region);
    println!(
        "  Merged {} clusters using {} bridge cells",
        report.clusters_merged, report.bridge_cells
    );
    println!(
        "  Outline: {} edges, {} discarded as holes",
        report.boundary_edges, report.holes_discarded
    );
    println!(
        "  Path: {} vertices ({} before simplification)",
        track.path().len(),
        report.raw_vertices
    );
    println!("  Length: {:.2}", track.length());

    // Step 4: Checkpoints
    println!("\nStep 4: Checkpoints:");
    let count = 8;
    println!(
        "  Spacing: {:.2}",
        track.distance_between_checkpoints(count)?
    );
    for checkpoint in track.checkpoints(count)? {
        println!(
            "  #{}: ({:.2}, {:.2}) heading ({:.2}, {:.2})",
            checkpoint.index,
            checkpoint.position.x,
            checkpoint.position.y,
            checkpoint.forward.x,
            checkpoint.forward.y
        );
    }

    // Step 5: Query spatial index
    #[cfg(feature = "spatial-index")]
    {
        println!("\nStep 5: Spatial queries:");
        let probe = track.evaluate_position(3, count)?;
        if let Some(vertex) = track.find_nearest_vertex(probe) {
            println!(
                "  Checkpoint 3 is nearest to path vertex {} at {:?}",
                vertex,
                track.path().vertices[vertex]
            );
        }
    }

    // Step 6: Generate mesh
    println!("\nStep 6: Generating mesh...");
    let mesh = track.mesh(&track.default_mesh_options())?;
    println!("  Vertices: {}", mesh.vertex_count());
    println!("  Triangles: {}", mesh.triangle_count());

    // Memory estimate
    let mem = (mesh.positions.len() * 12
        + mesh.normals.len() * 12
        + mesh.uvs.len() * 8
        + mesh.indices.len() * 4) as f32
        / 1024.0;
    println!("  Memory: {:.2} KB", mem);

    println!("\n=== Demo Complete ===");
    Ok(())
}
