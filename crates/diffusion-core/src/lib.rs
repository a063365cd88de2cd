// ─────────────────────────────────────────────────────────────────────
// SCPN Diffusion Lab — Diffusion Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Domain-decomposed FTCS diffusion solver.
//!
//! The global grid is split into contiguous row bands, one per worker.
//! Each step every worker applies the 5-point explicit update to its
//! band, refreshes its ghost rows through per-neighbor channels, and
//! synchronizes at a barrier. Worker 0 gathers the bands at the end.

pub mod collect;
pub mod exchange;
pub mod output;
pub mod partition;
pub mod solver;
pub mod stencil;
