// ─────────────────────────────────────────────────────────────────────
// SCPN Diffusion Lab — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{DiffusionError, DiffusionResult};
use crate::state::DiffusionGrid;

/// Hard stability bound for the explicit FTCS scheme: alpha = D*dt/dx²
/// must stay strictly below this value or the update diverges.
pub const STABILITY_LIMIT: f64 = 0.25;

/// Relative tolerance for the square-cell check. The single-alpha FTCS
/// stencil assumes dx == dy.
const CELL_ASPECT_TOL: f64 = 1e-9;

/// Top-level run configuration.
/// Maps 1:1 to diffusion_config.json schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub run_name: String,
    /// [nx, ny]: rows (partition axis) and columns.
    pub grid_resolution: [usize; 2],
    pub dimensions: GridDimensions,
    pub physics: PhysicsParams,
    pub time: TimeParams,
    /// Worker count W. Supplied by the invocation, never computed.
    pub workers: usize,
    #[serde(default)]
    pub initial: InitialCondition,
    #[serde(default)]
    pub output: OutputParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridDimensions {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsParams {
    pub diffusivity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeParams {
    pub dt: f64,
    pub total_time: f64,
}

/// Initial concentration field shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialCondition {
    /// A single seeded cell at the grid centre.
    CentreImpulse {
        #[serde(default = "default_amplitude")]
        amplitude: f64,
    },
    /// A Gaussian blob centred on the domain midpoint.
    Gaussian {
        #[serde(default = "default_amplitude")]
        amplitude: f64,
        width: f64,
    },
}

fn default_amplitude() -> f64 {
    1.0
}

impl Default for InitialCondition {
    fn default() -> Self {
        InitialCondition::CentreImpulse {
            amplitude: default_amplitude(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputParams {
    #[serde(default = "default_initial_path")]
    pub initial_path: String,
    #[serde(default = "default_final_path")]
    pub final_path: String,
}

fn default_initial_path() -> String {
    "initial_field.npy".to_string()
}

fn default_final_path() -> String {
    "final_field.npy".to_string()
}

impl Default for OutputParams {
    fn default() -> Self {
        OutputParams {
            initial_path: default_initial_path(),
            final_path: default_final_path(),
        }
    }
}

impl RunConfig {
    /// Load from JSON file. Parsing only; call [`RunConfig::validate`]
    /// before running.
    pub fn from_file(path: &str) -> DiffusionResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn nx(&self) -> usize {
        self.grid_resolution[0]
    }

    pub fn ny(&self) -> usize {
        self.grid_resolution[1]
    }

    /// Create the computational mesh from this config's dimensions and
    /// resolution.
    pub fn grid(&self) -> DiffusionGrid {
        DiffusionGrid::new(
            self.nx(),
            self.ny(),
            self.dimensions.x_min,
            self.dimensions.x_max,
            self.dimensions.y_min,
            self.dimensions.y_max,
        )
    }

    /// Dimensionless diffusion number alpha = D*dt/dx².
    pub fn alpha(&self) -> f64 {
        let dx = self.grid().dx;
        self.physics.diffusivity * self.time.dt / (dx * dx)
    }

    /// Number of timesteps Nt covered by total_time.
    pub fn num_steps(&self) -> usize {
        (self.time.total_time / self.time.dt).round() as usize
    }

    /// Validate every startup precondition at once. Run setup must call
    /// this before any step executes; mid-simulation discovery of a bad
    /// configuration (diverging numerics, truncated bands) is a bug.
    pub fn validate(&self) -> DiffusionResult<()> {
        let nx = self.nx();
        let ny = self.ny();
        if nx < 3 || ny < 3 {
            return Err(DiffusionError::ConfigError(format!(
                "grid must be at least 3x3 to have an interior, got {nx}x{ny}"
            )));
        }
        if self.workers < 1 {
            return Err(DiffusionError::ConfigError(
                "worker count must be >= 1".to_string(),
            ));
        }
        if nx % self.workers != 0 {
            return Err(DiffusionError::ConfigError(format!(
                "global row count {nx} is not divisible by worker count {}",
                self.workers
            )));
        }
        if !(self.dimensions.x_max > self.dimensions.x_min)
            || !(self.dimensions.y_max > self.dimensions.y_min)
        {
            return Err(DiffusionError::ConfigError(format!(
                "domain extents must be increasing: x [{}, {}], y [{}, {}]",
                self.dimensions.x_min,
                self.dimensions.x_max,
                self.dimensions.y_min,
                self.dimensions.y_max
            )));
        }
        if !self.physics.diffusivity.is_finite() || self.physics.diffusivity <= 0.0 {
            return Err(DiffusionError::ConfigError(format!(
                "diffusivity must be finite and > 0, got {}",
                self.physics.diffusivity
            )));
        }
        if !self.time.dt.is_finite() || self.time.dt <= 0.0 {
            return Err(DiffusionError::ConfigError(format!(
                "dt must be finite and > 0, got {}",
                self.time.dt
            )));
        }
        if !self.time.total_time.is_finite() || self.num_steps() < 1 {
            return Err(DiffusionError::ConfigError(format!(
                "total_time {} must cover at least one step of dt {}",
                self.time.total_time, self.time.dt
            )));
        }
        let grid = self.grid();
        if (grid.dx - grid.dy).abs() > CELL_ASPECT_TOL * grid.dx {
            return Err(DiffusionError::ConfigError(format!(
                "cells must be square for the single-alpha stencil: dx={}, dy={}",
                grid.dx, grid.dy
            )));
        }
        let alpha = self.alpha();
        if alpha >= STABILITY_LIMIT {
            return Err(DiffusionError::ConfigError(format!(
                "stability violated: alpha = D*dt/dx² = {alpha:.6} >= {STABILITY_LIMIT}"
            )));
        }
        if let InitialCondition::Gaussian { width, .. } = self.initial {
            if !width.is_finite() || width <= 0.0 {
                return Err(DiffusionError::ConfigError(format!(
                    "gaussian width must be finite and > 0, got {width}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Build path relative to the workspace root. CARGO_MANIFEST_DIR
    /// points to crates/diffusion-types/ at compile time.
    fn workspace_path(relative: &str) -> String {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(relative)
            .to_string_lossy()
            .to_string()
    }

    /// Unit-spacing config helper used across the workspace tests:
    /// extents chosen so dx = dy = 1, hence alpha = diffusivity * dt.
    fn unit_config(nx: usize, ny: usize, workers: usize, alpha: f64, steps: usize) -> RunConfig {
        RunConfig {
            run_name: "test".to_string(),
            grid_resolution: [nx, ny],
            dimensions: GridDimensions {
                x_min: 0.0,
                x_max: (nx - 1) as f64,
                y_min: 0.0,
                y_max: (ny - 1) as f64,
            },
            physics: PhysicsParams { diffusivity: 1.0 },
            time: TimeParams {
                dt: alpha,
                total_time: alpha * steps as f64,
            },
            workers,
            initial: InitialCondition::default(),
            output: OutputParams::default(),
        }
    }

    #[test]
    fn test_load_demo_config() {
        let cfg = RunConfig::from_file(&workspace_path("diffusion_config.json")).unwrap();
        assert_eq!(cfg.run_name, "Centre-Impulse-Demo");
        assert_eq!(cfg.grid_resolution, [128, 128]);
        assert_eq!(cfg.workers, 4);
        assert!((cfg.physics.diffusivity - 1e-4).abs() < 1e-18);
        cfg.validate().unwrap();
        assert!(cfg.alpha() < STABILITY_LIMIT);
        assert_eq!(cfg.num_steps(), 100);
    }

    #[test]
    fn test_roundtrip_serialization() {
        let cfg = unit_config(8, 4, 2, 0.2, 1);
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let cfg2: RunConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.run_name, cfg2.run_name);
        assert_eq!(cfg.grid_resolution, cfg2.grid_resolution);
        assert_eq!(cfg.workers, cfg2.workers);
        assert!((cfg.alpha() - cfg2.alpha()).abs() < 1e-15);
    }

    #[test]
    fn test_from_file_with_defaults() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("minimal.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "run_name": "minimal",
                "grid_resolution": [8, 4],
                "dimensions": {{"x_min": 0.0, "x_max": 7.0, "y_min": 0.0, "y_max": 3.0}},
                "physics": {{"diffusivity": 1.0}},
                "time": {{"dt": 0.2, "total_time": 0.2}},
                "workers": 2
            }}"#
        )
        .unwrap();
        let cfg = RunConfig::from_file(&path.to_string_lossy()).unwrap();
        cfg.validate().unwrap();
        assert!(matches!(
            cfg.initial,
            InitialCondition::CentreImpulse { amplitude } if (amplitude - 1.0).abs() < 1e-15
        ));
        assert_eq!(cfg.output.initial_path, "initial_field.npy");
    }

    #[test]
    fn test_unstable_alpha_rejected_at_setup() {
        let cfg = unit_config(8, 4, 2, 0.3, 1);
        let err = cfg.validate().expect_err("alpha = 0.3 must be rejected");
        match err {
            DiffusionError::ConfigError(msg) => assert!(msg.contains("stability")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_indivisible_rows_rejected() {
        let cfg = unit_config(10, 4, 3, 0.2, 1);
        let err = cfg.validate().expect_err("10 rows over 3 workers must fail");
        match err {
            DiffusionError::ConfigError(msg) => assert!(msg.contains("not divisible")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_anisotropic_cells_rejected() {
        let mut cfg = unit_config(8, 4, 2, 0.2, 1);
        cfg.dimensions.y_max = 5.0;
        let err = cfg.validate().expect_err("dx != dy must fail");
        assert!(matches!(err, DiffusionError::ConfigError(_)));
    }

    #[test]
    fn test_zero_step_run_rejected() {
        let mut cfg = unit_config(8, 4, 2, 0.2, 1);
        cfg.time.total_time = 0.0;
        assert!(cfg.validate().is_err());
    }
}
