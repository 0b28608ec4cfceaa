//! Voronoi-based racetrack generation
//!
//! A standalone library for generating closed-loop racetrack paths and ribbon
//! meshes from a jittered Voronoi diagram, suitable for use with any game engine
//! (Bevy, Godot, etc.) or as the playfield of a driving simulation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voronoi_track::*;
//!
//! // Generate a track of roughly twelve cells
//! let config = TrackConfigBuilder::new()
//!     .seed(42)
//!     .for_cell_count(12).unwrap()
//!     .complexity(0.7).unwrap()
//!     .build().unwrap();
//!
//! let track = Track::generate(config).unwrap();
//!
//! // Generate mesh for rendering
//! let mesh = track.mesh(&track.default_mesh_options()).unwrap();
//! println!("Generated {} triangles", mesh.triangle_count());
//!
//! // Place checkpoints for an agent
//! let first = track.evaluate_position(0, 32).unwrap();
//! ```
//!
//! # Pipeline
//!
//! jittered grid sites → Voronoi cells ([`generation`]) → cell graph and region
//! selection ([`region`]) → boundary loop ([`path`]) → [`ClosedSpline`] →
//! ribbon [`MeshData`] and checkpoints ([`Track`]).
//!
//! # Features
//!
//! - `parallel` (default): Runs the per-cell, per-edge and per-sample loops on rayon
//! - `spatial-index` (default): Enables O(log n) nearest path-vertex lookups using KD-tree
//! - `serde`: Enables serialization support for configuration, cells and paths

/// Conditionally parallel iterator from an owned value (ranges, vectors).
macro_rules! maybe_par_into_iter {
    ($v:expr) => {{
        #[cfg(feature = "parallel")]
        {
            $v.into_par_iter()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $v.into_iter()
        }
    }};
}

/// Conditionally parallel iterator over a slice.
macro_rules! maybe_par_iter {
    ($slice:expr) => {{
        #[cfg(feature = "parallel")]
        {
            $slice.par_iter()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $slice.iter()
        }
    }};
}

// Modules
pub mod error;
pub mod geometry;
pub mod config;
pub mod cell;
pub mod generation;
pub mod region;
pub mod path;
pub mod spline;
pub mod mesh;
pub mod track;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{TrackError, Result};
pub use config::{Placement, SelectionMode, TrackConfig, TrackConfigBuilder};
pub use geometry::{Rect, Segment, DEFAULT_TOLERANCE};
pub use cell::Cell;
pub use path::{generate_path, generate_path_with_report, GenerationReport, TrackPath};
pub use spline::ClosedSpline;
pub use mesh::{build_mesh, MeshData, MeshOptions};
pub use track::{Checkpoint, Track};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::Vec3 for convenience
pub use glam::Vec3;
