// ─────────────────────────────────────────────────────────────────────
// SCPN Diffusion Lab — Solver Driver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Symmetric worker loop and the serial reference path.
//!
//! W workers run the identical program on OS threads, distinguished
//! only by rank, with no shared mutable state: coordination is the
//! per-neighbor channels plus one barrier per timestep. The barrier is
//! the ordering guarantee: step n's exchange completes on every rank
//! before any rank starts step n+1's update.

use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use diffusion_types::config::RunConfig;
use diffusion_types::error::{DiffusionError, DiffusionResult};
use ndarray::Array2;

use crate::collect::{assemble, Contribution};
use crate::exchange::{exchange_halos, wire_chain, HaloLinks};
use crate::partition::{extract_band, interior_of, partition_rows, RowBand};
use crate::stencil::{ftcs_band_step, ftcs_global_run};

/// Outcome of a completed run. Only the coordinating side ever holds
/// the merged field.
#[derive(Debug)]
pub struct SolveReport {
    pub initial: Array2<f64>,
    pub final_field: Array2<f64>,
    pub steps: usize,
    pub elapsed: Duration,
}

/// A worker's end of the gather: rank 0 receives, everyone else sends.
enum GatherEnd {
    Root(mpsc::Receiver<Contribution>),
    Leaf(mpsc::Sender<Contribution>),
}

/// Serial reference solve on the undivided grid. The oracle for the
/// partitioned path: halo exchange is a partitioning mechanism, not a
/// behavior-altering one.
pub fn run_serial(config: &RunConfig) -> DiffusionResult<SolveReport> {
    config.validate()?;
    let initial = config.grid().seed_field(&config.initial);
    let steps = config.num_steps();

    let start = Instant::now();
    let final_field = ftcs_global_run(&initial, config.alpha(), steps);
    Ok(SolveReport {
        initial,
        final_field,
        steps,
        elapsed: start.elapsed(),
    })
}

/// Domain-decomposed solve with `config.workers` symmetric workers.
pub fn run_distributed(config: &RunConfig) -> DiffusionResult<SolveReport> {
    config.validate()?;
    let initial = config.grid().seed_field(&config.initial);
    let alpha = config.alpha();
    let steps = config.num_steps();
    let workers = config.workers;

    let bands = partition_rows(config.nx(), workers)?;
    let links = wire_chain(&bands);
    let barrier = Arc::new(Barrier::new(workers));

    // Rank 0 receives the gather; every other rank holds one sender.
    // Leaving no spare sender alive means a dead leaf is detected as a
    // closed channel instead of blocking the root forever.
    let (gather_tx, gather_rx) = mpsc::channel::<Contribution>();
    let mut gather_ends = Vec::with_capacity(workers);
    gather_ends.push(GatherEnd::Root(gather_rx));
    for _ in 1..workers {
        gather_ends.push(GatherEnd::Leaf(gather_tx.clone()));
    }
    drop(gather_tx);

    let start = Instant::now();
    let outcomes: Vec<DiffusionResult<Option<Array2<f64>>>> = thread::scope(|scope| {
        let handles: Vec<_> = bands
            .iter()
            .zip(links.into_iter())
            .zip(gather_ends.into_iter())
            .map(|((band, band_links), gather)| {
                let barrier = Arc::clone(&barrier);
                let bands = &bands;
                let initial = &initial;
                scope.spawn(move || {
                    worker_loop(band, band_links, barrier, gather, bands, initial, alpha, steps)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle.join().unwrap_or_else(|_| {
                    Err(DiffusionError::ChannelClosed(
                        "worker thread panicked".to_string(),
                    ))
                })
            })
            .collect()
    });
    let elapsed = start.elapsed();

    let mut final_field = None;
    for outcome in outcomes {
        if let Some(field) = outcome? {
            final_field = Some(field);
        }
    }
    let final_field = final_field.ok_or_else(|| {
        DiffusionError::ChannelClosed("rank 0 produced no merged field".to_string())
    })?;

    Ok(SolveReport {
        initial,
        final_field,
        steps,
        elapsed,
    })
}

/// The identical per-rank program: update, exchange, barrier, repeated
/// Nt times, then gather. Structural identity of this sequence across
/// ranks is the deadlock defense.
#[allow(clippy::too_many_arguments)]
fn worker_loop(
    band: &RowBand,
    links: HaloLinks,
    barrier: Arc<Barrier>,
    gather: GatherEnd,
    bands: &[RowBand],
    initial: &Array2<f64>,
    alpha: f64,
    steps: usize,
) -> DiffusionResult<Option<Array2<f64>>> {
    println!(
        "rank {}: rows {}..{}",
        band.rank, band.row_start, band.row_end
    );

    let mut src = extract_band(initial, band)?;
    let mut dst = src.clone();
    for _ in 0..steps {
        ftcs_band_step(&src, &mut dst, band, alpha);
        std::mem::swap(&mut src, &mut dst);
        // Ghosts now refer to the step just computed; the barrier keeps
        // any rank from racing ahead into the next update.
        exchange_halos(&mut src, band, &links)?;
        barrier.wait();
    }

    let interior = interior_of(&src, band).to_owned();
    let ny = interior.ncols();
    let merged = match gather {
        GatherEnd::Root(rx) => {
            let mut contributions = Vec::with_capacity(band.workers);
            contributions.push(Contribution {
                rank: band.rank,
                interior,
            });
            for _ in 1..band.workers {
                let contribution = rx.recv().map_err(|_| {
                    DiffusionError::ChannelClosed(
                        "rank 0: gather channel closed before all contributions arrived"
                            .to_string(),
                    )
                })?;
                contributions.push(contribution);
            }
            Some(assemble(bands, contributions, ny)?)
        }
        GatherEnd::Leaf(tx) => {
            tx.send(Contribution {
                rank: band.rank,
                interior,
            })
            .map_err(|_| {
                DiffusionError::ChannelClosed(format!("rank {}: gather send failed", band.rank))
            })?;
            None
        }
    };
    println!("rank {}: run complete", band.rank);
    Ok(merged)
}
