// ─────────────────────────────────────────────────────────────────────
// SCPN Diffusion Lab — Grid Partitioner
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Row-band decomposition of the global grid.
//!
//! Each worker owns a contiguous range of rows plus one ghost row per
//! interior boundary. Ghost rows are a cache of neighbor-owned data,
//! refreshed every step by the halo exchange; they are never
//! authoritative.

use diffusion_types::error::{DiffusionError, DiffusionResult};
use ndarray::{s, Array2, ArrayView2};

/// One worker's contiguous row band of the global grid.
///
/// The local buffer layout is
/// `[upper ghost?][owned rows row_start..row_end][lower ghost?]`,
/// where the upper ghost mirrors rank-1's last owned row and the lower
/// ghost mirrors rank+1's first owned row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBand {
    pub rank: usize,
    pub workers: usize,
    pub global_nx: usize,
    /// Owned row range [row_start, row_end) in global indexing.
    pub row_start: usize,
    pub row_end: usize,
}

impl RowBand {
    pub fn owned_rows(&self) -> usize {
        self.row_end - self.row_start
    }

    /// Neighbor toward row 0.
    pub fn has_upper_neighbor(&self) -> bool {
        self.rank > 0
    }

    /// Neighbor toward row global_nx - 1.
    pub fn has_lower_neighbor(&self) -> bool {
        self.rank + 1 < self.workers
    }

    /// Neighbor ranks, computed once per worker: 0, 1 or 2 entries.
    /// All exchange logic is written against this set instead of
    /// branching on boundary ranks.
    pub fn neighbors(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(2);
        if self.has_upper_neighbor() {
            out.push(self.rank - 1);
        }
        if self.has_lower_neighbor() {
            out.push(self.rank + 1);
        }
        out
    }

    /// Ghost rows held by this band: 0, 1 or 2.
    pub fn ghost_rows(&self) -> usize {
        usize::from(self.has_upper_neighbor()) + usize::from(self.has_lower_neighbor())
    }

    /// Rows in the local buffer, ghosts included.
    pub fn padded_rows(&self) -> usize {
        self.owned_rows() + self.ghost_rows()
    }

    /// Index of the first owned row within the padded buffer.
    pub fn interior_offset(&self) -> usize {
        usize::from(self.has_upper_neighbor())
    }
}

/// Assign each worker a contiguous, non-overlapping row range covering
/// [0, global_nx) exactly once.
///
/// `global_nx % workers != 0` is a hard precondition failure, reported
/// here rather than silently truncating rows.
pub fn partition_rows(global_nx: usize, workers: usize) -> DiffusionResult<Vec<RowBand>> {
    if workers < 1 {
        return Err(DiffusionError::ConfigError(
            "partition requires at least one worker".to_string(),
        ));
    }
    if global_nx < workers {
        return Err(DiffusionError::ConfigError(format!(
            "cannot split {global_nx} rows across {workers} workers"
        )));
    }
    if global_nx % workers != 0 {
        return Err(DiffusionError::ConfigError(format!(
            "global row count {global_nx} is not divisible by worker count {workers}"
        )));
    }

    let rows_per_worker = global_nx / workers;
    let bands = (0..workers)
        .map(|rank| RowBand {
            rank,
            workers,
            global_nx,
            row_start: rank * rows_per_worker,
            row_end: (rank + 1) * rows_per_worker,
        })
        .collect();
    Ok(bands)
}

/// Extract a worker's padded band (ghosts included) from the global
/// field. The ghosts come out holding the neighbor rows of the same
/// instant, which is exactly the freshness the first update requires.
pub fn extract_band(global: &Array2<f64>, band: &RowBand) -> DiffusionResult<Array2<f64>> {
    if global.nrows() != band.global_nx {
        return Err(DiffusionError::ShapeMismatch {
            rank: band.rank,
            expected: (band.global_nx, global.ncols()),
            got: (global.nrows(), global.ncols()),
        });
    }
    let start = band.row_start - band.interior_offset();
    let end = band.row_end + usize::from(band.has_lower_neighbor());
    Ok(global.slice(s![start..end, ..]).to_owned())
}

/// View of the owned (non-ghost) rows of a padded band buffer.
pub fn interior_of<'a>(local: &'a Array2<f64>, band: &RowBand) -> ArrayView2<'a, f64> {
    let off = band.interior_offset();
    local.slice(s![off..off + band.owned_rows(), ..])
}
