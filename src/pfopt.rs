// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::error::{ValidationError, Violation};
use derive_builder::Builder;
use serde::Serialize;

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, clap::ValueEnum)]
pub enum Alg {
    /// Newton's method.
    #[value(name = "nr")]
    NR,
    /// Gauss-Seidel method.
    #[value(name = "gs")]
    GS,
}

impl Alg {
    pub fn name(&self) -> &'static str {
        match self {
            Alg::NR => "Newton-Raphson",
            Alg::GS => "Gauss-Seidel",
        }
    }
}

/// Nominal voltage band used to flag buses in the result summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoltageBand {
    /// Lower bound (p.u.).
    pub vmin: f64,
    /// Upper bound (p.u.).
    pub vmax: f64,
}

impl Default for VoltageBand {
    fn default() -> Self {
        Self {
            vmin: 0.95,
            vmax: 1.05,
        }
    }
}

/// Power flow options.
#[derive(Debug, Clone, PartialEq, Serialize, Builder)]
#[builder(default, build_fn(validate = "Self::validate"))]
pub struct PFOpt {
    /// AC power flow algorithm.
    pub algorithm: Alg,

    /// Termination tolerance. Per unit P & Q mismatch for Newton's method,
    /// per unit voltage change for Gauss-Seidel. Default value is 1e-6.
    pub tolerance: f64,

    /// Maximum number of iterations. Defaults to 20 for Newton's method
    /// and 1000 for Gauss-Seidel.
    #[builder(setter(strip_option))]
    pub max_it: Option<usize>,

    /// Gauss-Seidel acceleration factor. Default value is 1.0.
    pub acceleration: f64,

    /// Demote PV buses to PQ when their generator hits a reactive limit.
    pub enforce_q_limits: bool,

    /// Start PQ buses at 1.0 p.u. and all non-slack angles at zero.
    /// Otherwise the case voltages are the initial guess.
    pub flat_start: bool,

    /// Band used to count over/under voltage buses.
    pub voltage_band: VoltageBand,

    /// Record per-iteration voltages for networks up to this size.
    pub snapshot_max_buses: usize,
}

impl Default for PFOpt {
    fn default() -> Self {
        Self {
            algorithm: Alg::NR,
            tolerance: 1e-6,
            max_it: None,
            acceleration: 1.0,
            enforce_q_limits: true,
            flat_start: true,
            voltage_band: VoltageBand::default(),
            snapshot_max_buses: 20,
        }
    }
}

pub const DEFAULT_MAX_IT_NR: usize = 20;
pub const DEFAULT_MAX_IT_GS: usize = 1000;

impl PFOpt {
    pub fn newton() -> Self {
        Self::default()
    }

    pub fn gauss_seidel() -> Self {
        Self {
            algorithm: Alg::GS,
            ..Self::default()
        }
    }

    /// Iteration cap for the selected algorithm.
    pub fn max_it(&self) -> usize {
        self.max_it.unwrap_or(match self.algorithm {
            Alg::NR => DEFAULT_MAX_IT_NR,
            Alg::GS => DEFAULT_MAX_IT_GS,
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let violations = option_violations(
            Some(self.tolerance),
            self.max_it,
            Some(self.acceleration),
            Some(&self.voltage_band),
        );
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(violations))
        }
    }
}

impl PFOptBuilder {
    fn validate(&self) -> Result<(), String> {
        let violations = option_violations(
            self.tolerance,
            self.max_it.flatten(),
            self.acceleration,
            self.voltage_band.as_ref(),
        );
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(violations).to_string())
        }
    }
}

fn option_violations(
    tolerance: Option<f64>,
    max_it: Option<usize>,
    acceleration: Option<f64>,
    band: Option<&VoltageBand>,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    if let Some(tol) = tolerance {
        if !(tol.is_finite() && tol > 0.0) {
            violations.push(Violation::InvalidOption {
                name: "tolerance",
                reason: format!("must be a positive number, got {}", tol),
            });
        }
    }
    if max_it == Some(0) {
        violations.push(Violation::InvalidOption {
            name: "max_it",
            reason: "must be greater than zero".to_string(),
        });
    }
    if let Some(alpha) = acceleration {
        if !(alpha.is_finite() && alpha > 0.0) {
            violations.push(Violation::InvalidOption {
                name: "acceleration",
                reason: format!("must be a positive number, got {}", alpha),
            });
        }
    }
    if let Some(band) = band {
        if !(band.vmin.is_finite() && band.vmax.is_finite() && band.vmin < band.vmax) {
            violations.push(Violation::InvalidOption {
                name: "voltage_band",
                reason: format!("vmin {} must be below vmax {}", band.vmin, band.vmax),
            });
        }
    }
    violations
}
