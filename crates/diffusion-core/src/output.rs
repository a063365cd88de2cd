// ─────────────────────────────────────────────────────────────────────
// SCPN Diffusion Lab — Field Output
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Persisted array output. The plotting utility that renders these
//! files is an external consumer.

use diffusion_types::error::DiffusionResult;
use ndarray::Array2;
use ndarray_npy::write_npy;

/// Write one (nx, ny) field as a .npy file. Only the coordinating
/// worker ever calls this.
pub fn write_field(path: &str, field: &Array2<f64>) -> DiffusionResult<()> {
    write_npy(path, field)?;
    Ok(())
}
