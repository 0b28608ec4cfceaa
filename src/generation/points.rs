//! Jittered Grid Point Distribution
//!
//! Places one Voronoi site inside every cell of a regular grid. Each site gets a
//! uniformly random offset within its grid cell, which keeps the diagram connected
//! and roughly uniform while still looking organic.
//!
//! Every grid index draws from its own ChaCha8 stream (same seed, stream id = index),
//! so sites are reproducible and can be computed in any order or in parallel.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Row-major grid coordinate `(column, row)` of a site index
#[inline]
pub fn grid_coordinate(index: usize, width: usize) -> (usize, usize) {
    (index % width, index / width)
}

/// Generate `width * height` jittered sites in the XY plane
///
/// Site `i` lies inside the square `[column, column + 1) × [row, row + 1)` scaled by
/// `cell_size`, where `(column, row) = grid_coordinate(i, width)`.
///
/// # Arguments
///
/// * `width` - Grid columns
/// * `height` - Grid rows
/// * `cell_size` - Side length of a grid square (must be positive)
/// * `seed` - Random seed
pub fn generate_grid_points(width: usize, height: usize, cell_size: f32, seed: u32) -> Vec<Vec3> {
    maybe_par_into_iter!(0..width * height)
        .map(|index| jittered_point(index, width, cell_size, seed))
        .collect()
}

fn jittered_point(index: usize, width: usize, cell_size: f32, seed: u32) -> Vec3 {
    let (column, row) = grid_coordinate(index, width);

    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed));
    rng.set_stream(index as u64);

    let x = column as f32 * cell_size + rng.gen_range(0.0..cell_size);
    let y = row as f32 * cell_size + rng.gen_range(0.0..cell_size);

    Vec3::new(x, y, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_count() {
        let points = generate_grid_points(4, 3, 5.0, 42);
        assert_eq!(points.len(), 12);
    }

    #[test]
    fn test_points_inside_their_grid_square() {
        let (width, height, size) = (6, 4, 2.5);
        let points = generate_grid_points(width, height, size, 7);

        for (index, point) in points.iter().enumerate() {
            let (column, row) = grid_coordinate(index, width);
            assert!(point.x >= column as f32 * size && point.x <= (column + 1) as f32 * size);
            assert!(point.y >= row as f32 * size && point.y <= (row + 1) as f32 * size);
            assert_eq!(point.z, 0.0);
        }
    }

    #[test]
    fn test_determinism() {
        let points1 = generate_grid_points(5, 5, 5.0, 12345);
        let points2 = generate_grid_points(5, 5, 5.0, 12345);
        assert_eq!(points1, points2);
    }

    #[test]
    fn test_different_seeds_differ() {
        let points1 = generate_grid_points(5, 5, 5.0, 1);
        let points2 = generate_grid_points(5, 5, 5.0, 2);
        assert_ne!(points1, points2);
    }

    #[test]
    fn test_grid_coordinate() {
        assert_eq!(grid_coordinate(0, 5), (0, 0));
        assert_eq!(grid_coordinate(7, 5), (2, 1));
        assert_eq!(grid_coordinate(24, 5), (4, 4));
    }
}
