// ─────────────────────────────────────────────────────────────────────
// SCPN Diffusion Lab — Collector
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Gather of worker interiors back into the global field.
//!
//! After the last step each worker contributes its non-ghost rows to
//! worker 0, which reassembles them in rank order. Only worker 0 ever
//! holds or persists the merged grid.

use diffusion_types::error::{DiffusionError, DiffusionResult};
use ndarray::{s, Array2};

use crate::partition::RowBand;

/// One worker's gather payload: its owned rows, ghosts stripped.
pub struct Contribution {
    pub rank: usize,
    pub interior: Array2<f64>,
}

/// Reassemble rank-ordered contributions into the (nx, ny) global
/// array. Every contribution's shape is checked against its assigned
/// partition; a mismatch is an explicit error, never a silent
/// broadcast. With W=1 this degenerates to an identity copy.
pub fn assemble(
    bands: &[RowBand],
    contributions: Vec<Contribution>,
    ny: usize,
) -> DiffusionResult<Array2<f64>> {
    if bands.is_empty() {
        return Err(DiffusionError::ConfigError(
            "assemble requires at least one band".to_string(),
        ));
    }
    let global_nx = bands[0].global_nx;
    let mut slots: Vec<Option<Array2<f64>>> = (0..bands.len()).map(|_| None).collect();

    for contribution in contributions {
        let rank = contribution.rank;
        if rank >= bands.len() || slots[rank].is_some() {
            return Err(DiffusionError::ChannelClosed(format!(
                "gather received an unexpected contribution for rank {rank}"
            )));
        }
        let band = &bands[rank];
        let expected = (band.owned_rows(), ny);
        let got = contribution.interior.dim();
        if got != expected {
            return Err(DiffusionError::ShapeMismatch {
                rank,
                expected,
                got,
            });
        }
        slots[rank] = Some(contribution.interior);
    }

    let mut global = Array2::zeros((global_nx, ny));
    for (band, slot) in bands.iter().zip(slots.into_iter()) {
        let interior = slot.ok_or_else(|| {
            DiffusionError::ChannelClosed(format!(
                "gather is missing the contribution from rank {}",
                band.rank
            ))
        })?;
        global
            .slice_mut(s![band.row_start..band.row_end, ..])
            .assign(&interior);
    }
    Ok(global)
}
