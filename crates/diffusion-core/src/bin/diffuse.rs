// ─────────────────────────────────────────────────────────────────────
// SCPN Diffusion Lab — diffuse
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Run the domain-decomposed diffusion solver from a JSON config:
//!
//!     diffuse [diffusion_config.json]

use std::env;
use std::process;

use diffusion_core::{output, solver};
use diffusion_types::config::RunConfig;
use diffusion_types::error::DiffusionResult;

fn main() {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "diffusion_config.json".to_string());
    if let Err(err) = run(&path) {
        eprintln!("diffuse: {err}");
        process::exit(1);
    }
}

fn run(path: &str) -> DiffusionResult<()> {
    let config = RunConfig::from_file(path)?;
    config.validate()?;
    println!(
        "{}: {}x{} grid, {} workers, {} steps, alpha = {:.4}",
        config.run_name,
        config.nx(),
        config.ny(),
        config.workers,
        config.num_steps(),
        config.alpha()
    );

    let report = solver::run_distributed(&config)?;

    output::write_field(&config.output.initial_path, &report.initial)?;
    output::write_field(&config.output.final_path, &report.final_field)?;
    println!(
        "rank 0: {} steps in {:.3} s, fields written to {} and {}",
        report.steps,
        report.elapsed.as_secs_f64(),
        config.output.initial_path,
        config.output.final_path
    );
    Ok(())
}
