//! Ribbon mesh generation for a track
//!
//! Generates engine-agnostic mesh data by sweeping a flat strip of the requested
//! width along the closed spline of a [`TrackPath`].

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};
use crate::geometry::{cross, normalize};
use crate::path::TrackPath;
use crate::spline::ClosedSpline;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Engine-agnostic mesh data output
///
/// Contains raw vertex data suitable for any rendering engine:
/// - Bevy: Convert to `Mesh` with attributes
/// - Godot: Convert to `ArrayMesh`
/// - wgpu: Use directly as vertex buffers
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// Vertex positions (3D coordinates)
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals (the track plane normal)
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates: u across the track, v along it
    pub uvs: Vec<[f32; 2]>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Ribbon parameters
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshOptions {
    /// Full width of the ribbon
    pub width: f32,
    /// Number of cross sections along the loop (at least 2)
    pub sample_count: usize,
    /// How many times the texture repeats between the start line and the far side
    pub tiling: f32,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            width: 2.0,
            sample_count: 256,
            tiling: 1.0,
        }
    }
}

impl MeshOptions {
    fn validate(&self) -> Result<()> {
        if self.sample_count < 2 {
            return Err(TrackError::InvalidConfig(format!(
                "mesh needs at least 2 samples (got {})",
                self.sample_count
            )));
        }
        let vertex_count = self.sample_count.checked_mul(2);
        if vertex_count.and_then(|n| u32::try_from(n).ok()).is_none() {
            return Err(TrackError::InvalidConfig(format!(
                "{} samples exceed the u32 index range",
                self.sample_count
            )));
        }
        if !(self.width > 0.0 && self.width.is_finite()) {
            return Err(TrackError::InvalidConfig(format!(
                "track width must be positive (got {})",
                self.width
            )));
        }
        if !self.tiling.is_finite() {
            return Err(TrackError::InvalidConfig(format!(
                "tiling must be finite (got {})",
                self.tiling
            )));
        }
        Ok(())
    }
}

/// Build the ribbon mesh of a path
///
/// # Arguments
///
/// * `path` - Closed track centerline
/// * `width` - Full ribbon width
/// * `sample_count` - Cross sections along the loop
/// * `tiling` - Texture repeats along half the loop
///
/// # Errors
///
/// Returns `InvalidConfig` for fewer than 2 samples, a non-positive width, or a
/// path with fewer than 3 vertices.
pub fn build_mesh(path: &TrackPath, width: f32, sample_count: usize, tiling: f32) -> Result<MeshData> {
    let options = MeshOptions {
        width,
        sample_count,
        tiling,
    };
    options.validate()?;

    let spline = ClosedSpline::from_path(path)?;
    build_mesh_from_spline(&spline, path.normal, &options)
}

/// Build the ribbon mesh along an existing spline
pub fn build_mesh_from_spline(spline: &ClosedSpline, normal: Vec3, options: &MeshOptions) -> Result<MeshData> {
    options.validate()?;

    let samples = options.sample_count;
    let half_width = options.width * 0.5;
    let normal = normalize(normal);

    // Two vertices per cross section, right side first
    let sections: Vec<[([f32; 3], [f32; 2]); 2]> = maybe_par_into_iter!(0..samples)
        .map(|k| {
            let t = k as f32 / samples as f32;
            let (position, tangent) = spline.sample(t);
            let right = normalize(cross(tangent, normal)) * half_width;
            let v = options.tiling * (1.0 - (2.0 * t - 1.0).abs());

            [
                ((position + right).to_array(), [0.0, v]),
                ((position - right).to_array(), [1.0, v]),
            ]
        })
        .collect();

    let indices: Vec<u32> = maybe_par_into_iter!(0..samples * 6)
        .map(|i| ribbon_index(i, samples))
        .collect();

    let mut mesh = MeshData {
        positions: Vec::with_capacity(samples * 2),
        normals: vec![normal.to_array(); samples * 2],
        uvs: Vec::with_capacity(samples * 2),
        indices,
    };
    for (position, uv) in sections.into_iter().flatten() {
        mesh.positions.push(position);
        mesh.uvs.push(uv);
    }

    Ok(mesh)
}

/// Vertex index of the `i`-th triangle corner
///
/// Every group of six corners joins cross section `q - 1` to `q` with two
/// triangles; the first group wraps around to join the last section to the first.
fn ribbon_index(i: usize, samples: usize) -> u32 {
    let vertex_count = samples * 2;
    let r = i % 6;
    let base = if i < 6 { vertex_count } else { (i - r) / 3 };

    let index = match r {
        1 | 4 => base - 1,
        2 => base - 2,
        3 => base + 1,
        _ => base,
    };

    (index % vertex_count) as u32
}
