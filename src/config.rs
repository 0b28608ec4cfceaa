//! Track Configuration and Builder
//!
//! This module provides configuration types for deterministic track generation.

use glam::{Quat, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};
use crate::geometry::{normalize, DEFAULT_TOLERANCE};

/// Lower bound for the spacing between consecutive path vertices
///
/// Applied even at complexity 1.0 so that duplicated corners (zero-length Voronoi
/// edges) never reach the spline.
pub const MIN_VERTEX_SPACING: f32 = 1e-4;

/// How the track footprint is carved out of the Voronoi diagram
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionMode {
    /// Every cell not touching the bounding rectangle
    ///
    /// Produces large, blob-like tracks whose shape follows the grid size.
    FullInterior,
    /// A connected cluster grown by random adjacency walk
    RandomGrowth {
        /// Number of cells in the cluster
        target_cell_count: usize,
    },
}

impl SelectionMode {
    /// Get a human-readable name for this mode
    pub fn name(self) -> &'static str {
        match self {
            SelectionMode::FullInterior => "FullInterior",
            SelectionMode::RandomGrowth { .. } => "RandomGrowth",
        }
    }
}

impl Default for SelectionMode {
    fn default() -> Self {
        SelectionMode::FullInterior
    }
}

/// Rigid placement of the generation plane in world space
///
/// Generation happens in the XY plane. The final path is rotated so that +Z maps
/// onto `normal`, then translated by `origin`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub origin: Vec3,
    /// Unit up vector of the track plane
    pub normal: Vec3,
}

impl Placement {
    /// Rotation taking +Z onto the placement normal
    #[inline]
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_arc(Vec3::Z, normalize(self.normal))
    }

    /// Map a point from the generation plane into world space
    #[inline]
    pub fn apply(&self, point: Vec3) -> Vec3 {
        self.rotation() * point + self.origin
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            normal: Vec3::Z,
        }
    }
}

/// Configuration for deterministic track generation
///
/// The same configuration always produces the identical track.
///
/// # Example
///
/// ```rust
/// use voronoi_track::*;
///
/// let config = TrackConfigBuilder::new()
///     .seed(42)
///     .grid(6, 6)
///     .unwrap()
///     .random_growth(8)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.selection, SelectionMode::RandomGrowth { target_cell_count: 8 });
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackConfig {
    /// Random seed for every randomized decision (seed jitter, growth start, frontier picks)
    pub seed: u32,

    /// Number of grid columns seeding the Voronoi diagram
    pub plane_width: usize,

    /// Number of grid rows seeding the Voronoi diagram
    pub plane_height: usize,

    /// Side length of a grid cell; also the base scale of vertex simplification
    pub cell_size: f32,

    /// Margin added around the seed centers to form the clipping rectangle
    pub padding: f32,

    /// Region selection strategy
    pub selection: SelectionMode,

    /// Windiness in [0, 1]
    ///
    /// - 0.0: vertices closer than `cell_size` are merged (smooth, coarse track)
    /// - 1.0: every Voronoi corner is kept
    pub complexity: f32,

    /// Default ribbon width used by [`Track::mesh`](crate::Track::mesh)
    pub track_width: f32,

    /// Shared epsilon for point and edge equality
    pub tolerance: f32,

    /// World-space placement of the generated path
    pub placement: Placement,
}

impl TrackConfig {
    /// Total number of seed cells in the grid
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.plane_width * self.plane_height
    }

    /// Number of cells random growth may pick from
    ///
    /// The outer ring of the grid is reserved as bridging/exterior material when the
    /// grid is at least 3×3.
    #[inline]
    pub fn candidate_cell_count(&self) -> usize {
        if self.plane_width >= 3 && self.plane_height >= 3 {
            (self.plane_width - 2) * (self.plane_height - 2)
        } else {
            self.cell_count()
        }
    }

    /// Minimum distance kept between consecutive path vertices
    #[inline]
    pub fn min_vertex_spacing(&self) -> f32 {
        (self.cell_size * (1.0 - self.complexity)).max(MIN_VERTEX_SPACING)
    }

    /// Validate every field and cross-field constraint
    ///
    /// Fields are public, so generation re-validates configurations that were not
    /// produced by the builder.
    pub fn validate(&self) -> Result<()> {
        if self.plane_width == 0 || self.plane_height == 0 {
            return Err(TrackError::InvalidConfig(format!(
                "plane dimensions must be positive (got {}x{})",
                self.plane_width, self.plane_height
            )));
        }
        check_positive("cell size", self.cell_size)?;
        check_positive("track width", self.track_width)?;
        check_positive("tolerance", self.tolerance)?;
        if !(self.padding >= 0.0 && self.padding.is_finite()) {
            return Err(TrackError::InvalidConfig(format!(
                "padding must be >= 0 (got {})",
                self.padding
            )));
        }
        if !(0.0..=1.0).contains(&self.complexity) {
            return Err(TrackError::InvalidConfig(format!(
                "complexity must be within [0, 1] (got {})",
                self.complexity
            )));
        }
        if !self.placement.origin.is_finite()
            || normalize(self.placement.normal) == Vec3::ZERO
        {
            return Err(TrackError::InvalidConfig(format!(
                "placement must have a finite origin and non-zero normal (got {:?})",
                self.placement
            )));
        }
        if let SelectionMode::RandomGrowth { target_cell_count } = self.selection {
            if target_cell_count == 0 {
                return Err(TrackError::InvalidConfig(
                    "target cell count must be at least 1".into(),
                ));
            }
            if target_cell_count > self.candidate_cell_count() {
                return Err(TrackError::InvalidConfig(format!(
                    "target cell count {} exceeds the {} candidate cells of a {}x{} grid",
                    target_cell_count,
                    self.candidate_cell_count(),
                    self.plane_width,
                    self.plane_height
                )));
            }
        }
        Ok(())
    }
}

impl Default for TrackConfig {
    fn default() -> Self {
        TrackConfigBuilder::new().into_config()
    }
}

fn check_positive(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TrackError::InvalidConfig(format!(
            "{} must be positive (got {})",
            name, value
        )))
    }
}

/// Builder for creating TrackConfig with validation
///
/// # Example
///
/// ```rust
/// use voronoi_track::*;
///
/// // Use defaults
/// let config = TrackConfigBuilder::new().build().unwrap();
///
/// // Size the grid for a 12-cell random track
/// let config = TrackConfigBuilder::new()
///     .seed(7)
///     .for_cell_count(12)
///     .unwrap()
///     .complexity(0.8)
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(config.plane_width, 6);
/// ```
#[derive(Debug, Clone)]
pub struct TrackConfigBuilder {
    seed: Option<u32>,
    plane_width: usize,
    plane_height: usize,
    cell_size: f32,
    padding: f32,
    selection: SelectionMode,
    complexity: f32,
    track_width: f32,
    tolerance: f32,
    placement: Placement,
}

impl TrackConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random (generated from thread_rng)
    /// - grid: 5×5 cells of size 5.0, padding 1.0
    /// - selection: FullInterior
    /// - complexity: 0.5
    /// - track_width: 2.0
    /// - tolerance: 0.05
    /// - placement: XY plane at the origin
    pub fn new() -> Self {
        Self {
            seed: None,
            plane_width: 5,
            plane_height: 5,
            cell_size: 5.0,
            padding: 1.0,
            selection: SelectionMode::default(),
            complexity: 0.5,
            track_width: 2.0,
            tolerance: DEFAULT_TOLERANCE,
            placement: Placement::default(),
        }
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the grid dimensions in cells
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either dimension is zero
    pub fn grid(mut self, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TrackError::InvalidConfig(format!(
                "plane dimensions must be positive (got {}x{})",
                width, height
            )));
        }
        self.plane_width = width;
        self.plane_height = height;
        Ok(self)
    }

    /// Set the grid cell size
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if size <= 0.0
    pub fn cell_size(mut self, size: f32) -> Result<Self> {
        check_positive("cell size", size)?;
        self.cell_size = size;
        Ok(self)
    }

    /// Set the clipping rectangle margin
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if padding is negative
    pub fn padding(mut self, padding: f32) -> Result<Self> {
        if !(padding >= 0.0 && padding.is_finite()) {
            return Err(TrackError::InvalidConfig(format!(
                "padding must be >= 0 (got {})",
                padding
            )));
        }
        self.padding = padding;
        Ok(self)
    }

    /// Select every fully enclosed cell
    pub fn full_interior(mut self) -> Self {
        self.selection = SelectionMode::FullInterior;
        self
    }

    /// Grow a random cluster of `target_cell_count` cells
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the target is zero. The upper bound depends on the
    /// grid and is checked by [`build`](Self::build).
    pub fn random_growth(mut self, target_cell_count: usize) -> Result<Self> {
        if target_cell_count == 0 {
            return Err(TrackError::InvalidConfig(
                "target cell count must be at least 1".into(),
            ));
        }
        self.selection = SelectionMode::RandomGrowth { target_cell_count };
        Ok(self)
    }

    /// Random growth on a square grid just large enough for `target_cell_count`
    ///
    /// The grid side is `floor(sqrt(target)) + 3`: one for rounding and two for the
    /// outer ring of border cells.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the target is zero
    pub fn for_cell_count(self, target_cell_count: usize) -> Result<Self> {
        let size = (target_cell_count as f64).sqrt() as usize + 3;
        self.grid(size, size)?.random_growth(target_cell_count)
    }

    /// Set the windiness in [0, 1]
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` outside [0, 1]
    pub fn complexity(mut self, complexity: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&complexity) {
            return Err(TrackError::InvalidConfig(format!(
                "complexity must be within [0, 1] (got {})",
                complexity
            )));
        }
        self.complexity = complexity;
        Ok(self)
    }

    /// Set the default ribbon width
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if width <= 0.0
    pub fn track_width(mut self, width: f32) -> Result<Self> {
        check_positive("track width", width)?;
        self.track_width = width;
        Ok(self)
    }

    /// Set the shared comparison epsilon
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if tolerance <= 0.0
    pub fn tolerance(mut self, tolerance: f32) -> Result<Self> {
        check_positive("tolerance", tolerance)?;
        self.tolerance = tolerance;
        Ok(self)
    }

    /// Place the track plane in world space
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `normal` has zero length
    pub fn placement(mut self, origin: Vec3, normal: Vec3) -> Result<Self> {
        let normal = normalize(normal);
        if normal == Vec3::ZERO || !origin.is_finite() {
            return Err(TrackError::InvalidConfig(
                "placement needs a finite origin and a non-zero normal".into(),
            ));
        }
        self.placement = Placement { origin, normal };
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random seed using thread_rng.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the growth target exceeds the candidate cells of
    /// the grid.
    pub fn build(self) -> Result<TrackConfig> {
        let config = self.into_config();
        config.validate()?;
        Ok(config)
    }

    fn into_config(self) -> TrackConfig {
        TrackConfig {
            seed: self.seed.unwrap_or_else(rand::random),
            plane_width: self.plane_width,
            plane_height: self.plane_height,
            cell_size: self.cell_size,
            padding: self.padding,
            selection: self.selection,
            complexity: self.complexity,
            track_width: self.track_width,
            tolerance: self.tolerance,
            placement: self.placement,
        }
    }
}

impl Default for TrackConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
