//! Track main structure

use glam::Vec3;

use crate::config::TrackConfig;
use crate::error::{Result, TrackError};
use crate::geometry::normalize;
use crate::mesh::{build_mesh_from_spline, MeshData, MeshOptions};
use crate::path::{generate_path_with_report, GenerationReport, TrackPath};
use crate::spline::ClosedSpline;

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A navigation checkpoint placed along the track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
    /// Position in the checkpoint sequence (0 to count-1)
    pub index: usize,
    /// Point on the centerline spline
    pub position: Vec3,
    /// Unit direction of travel, from the previous checkpoint to this one
    ///
    /// Points along the clockwise driving direction; the direction back toward the
    /// previous checkpoint is `-forward`.
    pub forward: Vec3,
}

/// A generated closed racetrack
///
/// Holds the centerline path, the spline through it and the diagnostics of the
/// generation run. Regenerating means building a new `Track`.
///
/// # Examples
///
/// ```no_run
/// use voronoi_track::*;
///
/// let config = TrackConfigBuilder::new()
///     .seed(42)
///     .for_cell_count(10)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let track = Track::generate(config).unwrap();
/// println!("Track length: {:.1}", track.length());
///
/// // Ten evenly spaced checkpoints
/// for checkpoint in track.checkpoints(10).unwrap() {
///     println!("{}: {:?}", checkpoint.index, checkpoint.position);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Track {
    /// Configuration used to generate this track
    config: TrackConfig,

    /// Closed centerline
    path: TrackPath,

    /// Spline through the centerline vertices
    spline: ClosedSpline,

    /// What each generation stage did
    report: GenerationReport,

    /// Nearest-vertex lookups (optional, requires spatial-index feature)
    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

impl Track {
    /// Generate a track from configuration
    ///
    /// # Errors
    ///
    /// See [`generate_path`](crate::generate_path). `SelectionExhausted` and
    /// `Topology` failures are seed dependent; retrying with another seed is the
    /// expected recovery.
    pub fn generate(config: TrackConfig) -> Result<Self> {
        let (path, report) = generate_path_with_report(&config)?;
        let spline = ClosedSpline::from_path(&path)?;

        #[cfg(feature = "spatial-index")]
        let spatial_index = SpatialIndex::new(path.points());

        Ok(Self {
            config,
            path,
            spline,
            report,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        })
    }

    #[inline]
    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    #[inline]
    pub fn path(&self) -> &TrackPath {
        &self.path
    }

    #[inline]
    pub fn spline(&self) -> &ClosedSpline {
        &self.spline
    }

    /// Diagnostics of the generation run
    #[inline]
    pub fn report(&self) -> &GenerationReport {
        &self.report
    }

    /// Arc length of the centerline spline
    #[inline]
    pub fn length(&self) -> f32 {
        self.spline.length()
    }

    /// Position of checkpoint `index` out of `checkpoint_count` evenly spaced ones
    ///
    /// The index wraps modulo the count in both directions, so `-1` is the last
    /// checkpoint and `checkpoint_count` is the first again.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `checkpoint_count` is zero
    pub fn evaluate_position(&self, index: i64, checkpoint_count: usize) -> Result<Vec3> {
        let t = normalized_index(index, checkpoint_count)?;
        Ok(self.spline.evaluate(t))
    }

    /// Checkpoint `index` (wrapped) out of `checkpoint_count`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `checkpoint_count` is zero
    pub fn checkpoint(&self, index: i64, checkpoint_count: usize) -> Result<Checkpoint> {
        let position = self.evaluate_position(index, checkpoint_count)?;
        let previous = self.evaluate_position(index - 1, checkpoint_count)?;

        let mut forward = normalize(position - previous);
        if forward == Vec3::ZERO {
            // A single checkpoint has no predecessor to measure from
            forward = self.spline.tangent(normalized_index(index, checkpoint_count)?);
        }

        Ok(Checkpoint {
            index: wrap(index, checkpoint_count),
            position,
            forward,
        })
    }

    /// All `checkpoint_count` checkpoints in order
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `checkpoint_count` is zero
    pub fn checkpoints(&self, checkpoint_count: usize) -> Result<Vec<Checkpoint>> {
        maybe_par_into_iter!(0..checkpoint_count)
            .map(|i| self.checkpoint(i as i64, checkpoint_count))
            .collect::<Result<Vec<_>>>()
            .and_then(|checkpoints| {
                if checkpoints.is_empty() {
                    Err(zero_count())
                } else {
                    Ok(checkpoints)
                }
            })
    }

    /// Arc length between consecutive checkpoints
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `checkpoint_count` is zero
    pub fn distance_between_checkpoints(&self, checkpoint_count: usize) -> Result<f32> {
        if checkpoint_count == 0 {
            return Err(zero_count());
        }
        Ok(self.length() / checkpoint_count as f32)
    }

    /// Mesh options using the configured track width
    pub fn default_mesh_options(&self) -> MeshOptions {
        MeshOptions {
            width: self.config.track_width,
            ..MeshOptions::default()
        }
    }

    /// Build the ribbon mesh of this track
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for invalid options (see [`MeshOptions`])
    pub fn mesh(&self, options: &MeshOptions) -> Result<MeshData> {
        build_mesh_from_spline(&self.spline, self.path.normal, options)
    }

    /// Index of the path vertex nearest to `position` (requires spatial-index feature)
    ///
    /// # Example
    ///
    /// ```
    /// # use voronoi_track::*;
    /// # #[cfg(feature = "spatial-index")]
    /// # {
    /// # let config = TrackConfigBuilder::new().seed(1).build().unwrap();
    /// if let Ok(track) = Track::generate(config) {
    ///     let start = track.path().vertices[0];
    ///     assert_eq!(track.find_nearest_vertex(start), Some(0));
    /// }
    /// # }
    /// ```
    #[cfg(feature = "spatial-index")]
    pub fn find_nearest_vertex(&self, position: Vec3) -> Option<usize> {
        self.spatial_index.find_nearest(position)
    }
}

fn zero_count() -> TrackError {
    TrackError::InvalidConfig("checkpoint count must be positive".into())
}

#[inline]
fn wrap(index: i64, count: usize) -> usize {
    index.rem_euclid(count as i64) as usize
}

fn normalized_index(index: i64, count: usize) -> Result<f32> {
    if count == 0 {
        return Err(zero_count());
    }
    Ok(wrap(index, count) as f32 / count as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackConfigBuilder;
    use crate::generation::generate_cells;
    use crate::geometry::signed_area;
    use crate::region::{find_clusters, CellGraph};
    use approx::assert_abs_diff_eq;

    fn growth_config(seed: u32, cells: usize) -> TrackConfig {
        TrackConfigBuilder::new()
            .seed(seed)
            .for_cell_count(cells)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_track_generation() {
        let track = Track::generate(growth_config(42, 10)).unwrap();

        assert!(track.path().len() >= 3);
        assert!(track.length() > 0.0);
        assert_eq!(track.report().cells, 36);
        assert!(track.report().region.len() >= 10);
        assert_eq!(track.config().seed, 42);
    }

    #[test]
    fn test_closed_loop_and_spacing() {
        for seed in 0..100 {
            let config = growth_config(seed, 12);
            let track = Track::generate(config)
                .unwrap_or_else(|err| panic!("seed {} failed: {}", seed, err));
            let vertices = &track.path().vertices;

            assert!(vertices[0].distance(vertices[vertices.len() - 1]) < 1e-6);
            if track.path().len() > 3 {
                for edge in track.path().edges() {
                    assert!(edge.length() >= config.min_vertex_spacing());
                }
            }
        }
    }

    #[test]
    fn test_determinism() {
        let config = growth_config(12345, 15);

        let a = Track::generate(config).unwrap();
        let b = Track::generate(config).unwrap();

        assert_eq!(a.path(), b.path());
        assert_eq!(a.report(), b.report());
    }

    #[test]
    fn test_distinct_seeds_distinct_loops() {
        let a = Track::generate(growth_config(1, 10)).unwrap();
        let b = Track::generate(growth_config(2, 10)).unwrap();

        assert_ne!(a.path().vertices, b.path().vertices);
        for track in [&a, &b] {
            assert!(track.path().vertices.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_full_interior_track() {
        let config = TrackConfigBuilder::new().seed(42).build().unwrap();
        let track = Track::generate(config).unwrap();

        assert!(!track.path().is_empty());
        assert!(signed_area(track.path().points()) < 0.0);
    }

    #[test]
    fn test_region_connected_and_symmetric() {
        let config = growth_config(31, 14);
        let track = Track::generate(config).unwrap();
        let cells = generate_cells(&config).unwrap();
        let graph = CellGraph::new(&cells, config.tolerance);

        for a in 0..graph.len() {
            for &b in graph.neighbors(a) {
                assert!(graph.is_adjacent(b, a));
            }
        }
        assert_eq!(find_clusters(&track.report().region, &graph).len(), 1);
    }

    #[test]
    fn test_evaluate_position_wraps() {
        let track = Track::generate(growth_config(7, 8)).unwrap();
        let count = 12;

        let first = track.evaluate_position(0, count).unwrap();
        let again = track.evaluate_position(12, count).unwrap();
        let last = track.evaluate_position(11, count).unwrap();
        let negative = track.evaluate_position(-1, count).unwrap();

        assert!(first.distance(again) < 1e-4);
        assert!(last.distance(negative) < 1e-4);
        assert!(first.distance(track.path().vertices[0]) < 1e-3);
        assert!(track.evaluate_position(0, 0).is_err());
    }

    #[test]
    fn test_checkpoints() {
        let track = Track::generate(growth_config(9, 10)).unwrap();
        let count = 20;

        let checkpoints = track.checkpoints(count).unwrap();
        assert_eq!(checkpoints.len(), count);

        let spacing = track.distance_between_checkpoints(count).unwrap();
        assert_abs_diff_eq!(spacing * count as f32, track.length(), epsilon = 1e-3);

        for (i, checkpoint) in checkpoints.iter().enumerate() {
            assert_eq!(checkpoint.index, i);
            assert_abs_diff_eq!(checkpoint.forward.length(), 1.0, epsilon = 1e-4);

            let next = &checkpoints[(i + 1) % count];
            assert!(checkpoint.position.distance(next.position) <= spacing * 1.01);
        }

        for (i, checkpoint) in checkpoints.iter().enumerate() {
            let previous = &checkpoints[(i + count - 1) % count];
            let travel = checkpoint.position - previous.position;
            assert!(checkpoint.forward.dot(travel) > 0.0);
            assert!(checkpoint.forward.dot(travel.normalize()) > 0.999);
        }

        assert_eq!(track.checkpoint(-1, count).unwrap().index, count - 1);
        assert!(track.checkpoints(0).is_err());
        assert!(track.distance_between_checkpoints(0).is_err());
    }

    #[test]
    fn test_track_mesh() {
        let track = Track::generate(growth_config(4, 9)).unwrap();
        let options = track.default_mesh_options();
        let mesh = track.mesh(&options).unwrap();

        assert_eq!(options.width, track.config().track_width);
        assert_eq!(mesh.vertex_count(), options.sample_count * 2);
        assert_eq!(mesh.indices.len(), options.sample_count * 6);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));

        // First quad joins the last cross section to the first
        let last_right = (options.sample_count * 2 - 2) as u32;
        assert!(mesh.indices[..6].contains(&0));
        assert!(mesh.indices[..6].contains(&last_right));
    }

    #[cfg(feature = "spatial-index")]
    #[test]
    fn test_find_nearest_vertex() {
        let track = Track::generate(growth_config(42, 10)).unwrap();

        for (i, vertex) in track.path().points().iter().enumerate() {
            assert_eq!(track.find_nearest_vertex(*vertex), Some(i));
        }
    }
}
