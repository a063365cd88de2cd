// ─────────────────────────────────────────────────────────────────────
// SCPN Diffusion Lab — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::{Array1, Array2};

use crate::config::InitialCondition;

/// 2D diffusion mesh with precomputed coordinates.
///
/// Concentration fields are [nx, ny] arrays: rows follow x (the
/// partition axis), columns follow y.
#[derive(Debug, Clone)]
pub struct DiffusionGrid {
    pub nx: usize,
    pub ny: usize,
    pub x: Array1<f64>, // x coordinates [nx] - linspace(x_min, x_max, nx)
    pub y: Array1<f64>, // y coordinates [ny] - linspace(y_min, y_max, ny)
    pub dx: f64,
    pub dy: f64,
}

impl DiffusionGrid {
    pub fn new(nx: usize, ny: usize, x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        let x = Array1::linspace(x_min, x_max, nx);
        let y = Array1::linspace(y_min, y_max, ny);
        let dx = if nx > 1 { x[1] - x[0] } else { x_max - x_min };
        let dy = if ny > 1 { y[1] - y[0] } else { y_max - y_min };

        DiffusionGrid { nx, ny, x, y, dx, dy }
    }

    /// Build the initial concentration field for this mesh.
    pub fn seed_field(&self, initial: &InitialCondition) -> Array2<f64> {
        match *initial {
            InitialCondition::CentreImpulse { amplitude } => {
                let mut field = Array2::zeros((self.nx, self.ny));
                field[[self.nx / 2, self.ny / 2]] = amplitude;
                field
            }
            InitialCondition::Gaussian { amplitude, width } => {
                let xc = 0.5 * (self.x[0] + self.x[self.nx - 1]);
                let yc = 0.5 * (self.y[0] + self.y[self.ny - 1]);
                Array2::from_shape_fn((self.nx, self.ny), |(i, j)| {
                    let rx = self.x[i] - xc;
                    let ry = self.y[j] - yc;
                    amplitude * (-(rx * rx + ry * ry) / (width * width)).exp()
                })
            }
        }
    }
}
