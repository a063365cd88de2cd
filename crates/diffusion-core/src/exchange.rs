// ─────────────────────────────────────────────────────────────────────
// SCPN Diffusion Lab — Halo Exchanger
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-neighbor channel plumbing for the ghost-row refresh.
//!
//! Every adjacent worker pair is wired with one unbounded channel per
//! direction, created once at startup. Per step each worker runs the
//! identical sequence: send its outermost owned rows, then receive the
//! neighbors' rows into its ghosts. Sends never block on an unbounded
//! channel, so the receive side always finds its message posted and the
//! chain cannot deadlock as long as every rank runs the same sequence.
//! The step barrier lives in the solver, not here.

use std::sync::mpsc::{self, Receiver, Sender};

use diffusion_types::error::{DiffusionError, DiffusionResult};
use ndarray::{Array1, Array2};

use crate::partition::RowBand;

/// Channel endpoints toward one neighbor, owned by one worker.
pub struct NeighborLink {
    pub neighbor: usize,
    tx: Sender<Array1<f64>>,
    rx: Receiver<Array1<f64>>,
}

/// A worker's halo endpoints: at most one link per side of the chain.
#[derive(Default)]
pub struct HaloLinks {
    pub upper: Option<NeighborLink>,
    pub lower: Option<NeighborLink>,
}

impl HaloLinks {
    pub fn neighbor_count(&self) -> usize {
        usize::from(self.upper.is_some()) + usize::from(self.lower.is_some())
    }
}

/// Wire the 1-D open chain of workers: ranks 0 and W-1 get one link,
/// interior ranks two, W=1 gets none. Called once before the run.
pub fn wire_chain(bands: &[RowBand]) -> Vec<HaloLinks> {
    let mut links: Vec<HaloLinks> = bands.iter().map(|_| HaloLinks::default()).collect();
    for rank in 1..bands.len() {
        let (down_tx, down_rx) = mpsc::channel(); // rank-1 -> rank
        let (up_tx, up_rx) = mpsc::channel(); // rank -> rank-1
        links[rank - 1].lower = Some(NeighborLink {
            neighbor: rank,
            tx: down_tx,
            rx: up_rx,
        });
        links[rank].upper = Some(NeighborLink {
            neighbor: rank - 1,
            tx: up_tx,
            rx: down_rx,
        });
    }
    links
}

/// Refresh this worker's ghost rows from its neighbors.
///
/// `local` holds the band values of the step just computed; on return
/// the ghost rows hold the neighbors' boundary rows of that same step.
/// With no neighbors (W=1) this is a no-op.
pub fn exchange_halos(
    local: &mut Array2<f64>,
    band: &RowBand,
    links: &HaloLinks,
) -> DiffusionResult<()> {
    let ny = local.ncols();
    let first_owned = band.interior_offset();
    let last_owned = first_owned + band.owned_rows() - 1;

    // Send phase. Identical structure on every rank; both sends are
    // posted before any receive is waited on.
    if let Some(link) = &links.upper {
        link.tx
            .send(local.row(first_owned).to_owned())
            .map_err(|_| {
                DiffusionError::ChannelClosed(format!(
                    "rank {}: send to rank {} failed",
                    band.rank, link.neighbor
                ))
            })?;
    }
    if let Some(link) = &links.lower {
        link.tx.send(local.row(last_owned).to_owned()).map_err(|_| {
            DiffusionError::ChannelClosed(format!(
                "rank {}: send to rank {} failed",
                band.rank, link.neighbor
            ))
        })?;
    }

    // Receive phase: fill ghosts.
    if let Some(link) = &links.upper {
        let row = recv_row(link, band.rank, ny)?;
        local.row_mut(0).assign(&row);
    }
    if let Some(link) = &links.lower {
        let row = recv_row(link, band.rank, ny)?;
        local.row_mut(last_owned + 1).assign(&row);
    }
    Ok(())
}

fn recv_row(link: &NeighborLink, rank: usize, ny: usize) -> DiffusionResult<Array1<f64>> {
    let row = link.rx.recv().map_err(|_| {
        DiffusionError::ChannelClosed(format!(
            "rank {rank}: receive from rank {} failed",
            link.neighbor
        ))
    })?;
    if row.len() != ny {
        return Err(DiffusionError::ShapeMismatch {
            rank: link.neighbor,
            expected: (1, ny),
            got: (1, row.len()),
        });
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::partition_rows;
    use ndarray::Array2;
    use std::thread;

    #[test]
    fn test_wire_chain_topology() {
        let bands = partition_rows(12, 3).unwrap();
        let links = wire_chain(&bands);
        assert_eq!(links[0].neighbor_count(), 1);
        assert_eq!(links[1].neighbor_count(), 2);
        assert_eq!(links[2].neighbor_count(), 1);
        assert!(links[0].upper.is_none());
        assert_eq!(links[0].lower.as_ref().unwrap().neighbor, 1);
        assert_eq!(links[1].upper.as_ref().unwrap().neighbor, 0);
        assert_eq!(links[2].upper.as_ref().unwrap().neighbor, 1);
        assert!(links[2].lower.is_none());
    }

    #[test]
    fn test_single_worker_exchange_is_noop() {
        let bands = partition_rows(8, 1).unwrap();
        let links = wire_chain(&bands);
        let mut local = Array2::from_elem((8, 4), 7.0);
        let before = local.clone();
        exchange_halos(&mut local, &bands[0], &links[0]).unwrap();
        assert_eq!(local, before);
    }

    #[test]
    fn test_ghost_rows_hold_current_step_neighbor_values() {
        // Fabricate three bands whose owned rows encode (rank, global row),
        // run one exchange on real threads, and check each ghost row
        // equals the neighbor's boundary row of this very step.
        let bands = partition_rows(12, 3).unwrap();
        let links = wire_chain(&bands);
        let ny = 4;

        let fabricated: Vec<Array2<f64>> = bands
            .iter()
            .map(|band| {
                let mut local = Array2::zeros((band.padded_rows(), ny));
                let off = band.interior_offset();
                for r in 0..band.owned_rows() {
                    let global_row = band.row_start + r;
                    for j in 0..ny {
                        local[[off + r, j]] = 1000.0 * band.rank as f64
                            + 10.0 * global_row as f64
                            + j as f64;
                    }
                }
                local
            })
            .collect();

        // Each worker owns its links outright; a Receiver can move into
        // a thread but cannot be shared between threads.
        let exchanged: Vec<Array2<f64>> = thread::scope(|scope| {
            let handles: Vec<_> = bands
                .iter()
                .zip(links.into_iter())
                .zip(fabricated.iter())
                .map(|((band, link), local)| {
                    scope.spawn(move || {
                        let mut local = local.clone();
                        exchange_halos(&mut local, band, &link).unwrap();
                        local
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        // Rank 1's upper ghost = rank 0's last owned row (global row 3).
        for j in 0..ny {
            let expect = 0.0 + 10.0 * 3.0 + j as f64;
            assert!((exchanged[1][[0, j]] - expect).abs() < 1e-15);
        }
        // Rank 1's lower ghost = rank 2's first owned row (global row 8).
        for j in 0..ny {
            let expect = 2000.0 + 80.0 + j as f64;
            assert!((exchanged[1][[bands[1].padded_rows() - 1, j]] - expect).abs() < 1e-15);
        }
        // Rank 0's lower ghost = rank 1's first owned row (global row 4).
        for j in 0..ny {
            let expect = 1000.0 + 40.0 + j as f64;
            assert!((exchanged[0][[bands[0].padded_rows() - 1, j]] - expect).abs() < 1e-15);
        }
        // Rank 2's upper ghost = rank 1's last owned row (global row 7).
        for j in 0..ny {
            let expect = 1000.0 + 70.0 + j as f64;
            assert!((exchanged[2][[0, j]] - expect).abs() < 1e-15);
        }
        // Owned rows are untouched by the exchange.
        for (band, (before, after)) in bands.iter().zip(fabricated.iter().zip(exchanged.iter())) {
            let off = band.interior_offset();
            for r in 0..band.owned_rows() {
                for j in 0..ny {
                    assert!((before[[off + r, j]] - after[[off + r, j]]).abs() < 1e-15);
                }
            }
        }
    }

    #[test]
    fn test_dropped_neighbor_surfaces_as_channel_error() {
        let bands = partition_rows(8, 2).unwrap();
        let mut links = wire_chain(&bands);
        // Rank 1 disappears: its endpoints are dropped.
        links.pop();
        let mut local = Array2::zeros((bands[0].padded_rows(), 4));
        let err = exchange_halos(&mut local, &bands[0], &links[0])
            .expect_err("exchange against a dead neighbor must fail");
        assert!(matches!(err, DiffusionError::ChannelClosed(_)));
    }
}
