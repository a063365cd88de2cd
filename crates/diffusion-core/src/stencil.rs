//! Explicit FTCS (Forward-Time-Centered-Space) diffusion update.
//!
//! 5-point stencil: new = old + alpha * (up + down + left + right - 4*old)
//! with alpha = D*dt/dx². Cells on the global domain edge are never
//! updated (no-update boundary); the caller validates alpha < 0.25 once
//! at startup.

use ndarray::Array2;

use crate::partition::RowBand;

/// One FTCS update over a padded band buffer.
///
/// `src` holds the current values, ghost rows included; `dst` receives
/// the update. Pure local computation: ghost rows are read, never
/// written, and no communication happens here.
pub fn ftcs_band_step(src: &Array2<f64>, dst: &mut Array2<f64>, band: &RowBand, alpha: f64) {
    debug_assert_eq!(src.dim(), dst.dim());
    let ny = src.ncols();
    dst.assign(src);

    let off = band.interior_offset();
    for global_row in band.row_start..band.row_end {
        // Global boundary rows stay fixed.
        if global_row == 0 || global_row + 1 == band.global_nx {
            continue;
        }
        let i = global_row - band.row_start + off;
        for j in 1..ny - 1 {
            let laplacian = src[[i - 1, j]] + src[[i + 1, j]] + src[[i, j - 1]]
                + src[[i, j + 1]]
                - 4.0 * src[[i, j]];
            dst[[i, j]] = src[[i, j]] + alpha * laplacian;
        }
    }
}

/// Reference single-buffer-pair update over the whole global grid.
/// Used by the serial solver and as the equivalence oracle for the
/// partitioned path.
pub fn ftcs_global_step(src: &Array2<f64>, dst: &mut Array2<f64>, alpha: f64) {
    debug_assert_eq!(src.dim(), dst.dim());
    let (nx, ny) = src.dim();
    dst.assign(src);

    for i in 1..nx - 1 {
        for j in 1..ny - 1 {
            let laplacian = src[[i - 1, j]] + src[[i + 1, j]] + src[[i, j - 1]]
                + src[[i, j + 1]]
                - 4.0 * src[[i, j]];
            dst[[i, j]] = src[[i, j]] + alpha * laplacian;
        }
    }
}

/// Run `steps` reference updates, returning the final field.
pub fn ftcs_global_run(initial: &Array2<f64>, alpha: f64, steps: usize) -> Array2<f64> {
    let mut src = initial.clone();
    let mut dst = initial.clone();
    for _ in 0..steps {
        ftcs_global_step(&src, &mut dst, alpha);
        std::mem::swap(&mut src, &mut dst);
    }
    src
}
