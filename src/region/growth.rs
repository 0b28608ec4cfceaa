//! Region selection strategies

use std::collections::BTreeSet;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::cell::Cell;
use crate::config::{SelectionMode, TrackConfig};
use crate::error::{Result, TrackError};

use super::graph::CellGraph;
use super::Region;

/// Pick the interior cells of the track according to the configured mode
///
/// # Errors
///
/// Returns `SelectionExhausted` when there are no valid cells, or when random
/// growth has fewer candidate cells than its target.
pub fn select_region(
    cells: &[Cell],
    graph: &CellGraph,
    config: &TrackConfig,
    rng: &mut ChaCha8Rng,
) -> Result<Region> {
    let interior = match config.selection {
        SelectionMode::FullInterior => select_full_interior(cells, graph)?,
        SelectionMode::RandomGrowth { target_cell_count } => {
            let candidates: Vec<bool> = cells
                .iter()
                .map(|c| c.valid && is_candidate(c.grid, config))
                .collect();
            grow_random(graph, &candidates, target_cell_count, rng)?
        }
    };

    Ok(Region::from_interior(cells, interior))
}

/// A cell may seed or join random growth unless it lies on the outer grid ring
fn is_candidate((column, row): (usize, usize), config: &TrackConfig) -> bool {
    if config.plane_width < 3 || config.plane_height < 3 {
        return true;
    }
    column > 0 && row > 0 && column + 1 < config.plane_width && row + 1 < config.plane_height
}

fn select_full_interior(cells: &[Cell], graph: &CellGraph) -> Result<Vec<usize>> {
    let interior: Vec<usize> = cells
        .iter()
        .filter(|c| graph.is_enclosed(c.index))
        .map(|c| c.index)
        .collect();

    if !interior.is_empty() {
        return Ok(interior);
    }

    // Tiny grids have no enclosed cell; fall back to the first valid one
    cells
        .iter()
        .find(|c| c.valid)
        .map(|c| {
            log::debug!("No enclosed cell, promoting cell {}", c.index);
            vec![c.index]
        })
        .ok_or_else(|| TrackError::SelectionExhausted("no valid cells to select from".into()))
}

/// Grow a cluster of `target` candidate cells by random adjacency walk
///
/// The frontier is kept ordered so the pick for a given RNG state does not depend
/// on hash iteration order. When the walk is boxed in, it restarts at the next
/// unselected candidate after the last added cell; the resulting separate clusters
/// are joined later by the merge step.
fn grow_random(
    graph: &CellGraph,
    candidates: &[bool],
    target: usize,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<usize>> {
    let pool: Vec<usize> = (0..candidates.len()).filter(|&i| candidates[i]).collect();
    if pool.len() < target {
        return Err(TrackError::SelectionExhausted(format!(
            "only {} candidate cells for a target of {}",
            pool.len(),
            target
        )));
    }

    let mut growth = Growth::new(candidates.len(), target);

    let start = pool[rng.gen_range(0..pool.len())];
    growth.add(start, graph, candidates);
    let mut last = start;

    while growth.chosen.len() < target {
        let next = if growth.frontier.is_empty() {
            let Some(next) = next_unselected(candidates, &growth.selected, last) else {
                break;
            };
            log::debug!("Growth boxed in at cell {}, restarting at {}", last, next);
            next
        } else {
            let pick = rng.gen_range(0..growth.frontier.len());
            match growth.frontier.iter().nth(pick) {
                Some(&cell) => cell,
                None => break,
            }
        };

        growth.add(next, graph, candidates);
        last = next;
    }

    let mut chosen = growth.chosen;
    chosen.sort_unstable();
    Ok(chosen)
}

struct Growth {
    selected: Vec<bool>,
    frontier: BTreeSet<usize>,
    chosen: Vec<usize>,
}

impl Growth {
    fn new(cell_count: usize, target: usize) -> Self {
        Self {
            selected: vec![false; cell_count],
            frontier: BTreeSet::new(),
            chosen: Vec::with_capacity(target),
        }
    }

    fn add(&mut self, cell: usize, graph: &CellGraph, candidates: &[bool]) {
        self.selected[cell] = true;
        self.frontier.remove(&cell);
        self.chosen.push(cell);

        for &neighbor in graph.neighbors(cell) {
            if candidates[neighbor] && !self.selected[neighbor] {
                self.frontier.insert(neighbor);
            }
        }
    }
}

/// Wrap-around scan for the first unselected candidate after `from`
fn next_unselected(candidates: &[bool], selected: &[bool], from: usize) -> Option<usize> {
    let count = candidates.len();
    (1..=count)
        .map(|offset| (from + offset) % count)
        .find(|&i| candidates[i] && !selected[i])
}
