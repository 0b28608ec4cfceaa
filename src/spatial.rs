//! Spatial indexing for nearest path-vertex lookups
//!
//! This module is only available with the `spatial-index` feature.

use std::fmt;

use glam::Vec3;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// KD-tree over the unique vertices of a track path
///
/// Maps a world position (a car, a camera, a spawn request) to the closest
/// centerline vertex in O(log n), which is the usual starting point for progress
/// and off-track queries.
#[derive(Clone)]
pub struct SpatialIndex {
    /// `None` for an empty vertex set
    tree: Option<ImmutableKdTree<f32, usize, 3, 32>>,
    len: usize,
}

impl SpatialIndex {
    /// Build the index from path vertices
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_track::*;
    ///
    /// let vertices = vec![
    ///     Vec3::new(0.0, 0.0, 0.0),
    ///     Vec3::new(0.0, 10.0, 0.0),
    ///     Vec3::new(10.0, 10.0, 0.0),
    /// ];
    ///
    /// let index = SpatialIndex::new(&vertices);
    /// assert_eq!(index.find_nearest(Vec3::new(9.0, 8.0, 0.0)), Some(2));
    /// ```
    pub fn new(vertices: &[Vec3]) -> Self {
        let points: Vec<[f32; 3]> = vertices.iter().map(|v| v.to_array()).collect();

        Self {
            tree: (!points.is_empty()).then(|| ImmutableKdTree::new_from_slice(&points)),
            len: vertices.len(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the vertex nearest to `position`, or `None` for an empty index
    pub fn find_nearest(&self, position: Vec3) -> Option<usize> {
        let tree = self.tree.as_ref()?;
        let result = tree.nearest_one::<SquaredEuclidean>(&position.to_array());
        Some(result.item)
    }
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex").field("len", &self.len).finish()
    }
}
