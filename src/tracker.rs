// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use num_complex::Complex64;
use serde::Serialize;

/// Convergence data for one iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationRecord {
    /// Iteration index. Newton records the initial state as iteration 0.
    pub iteration: usize,

    /// The metric the solver tests against its tolerance: max power
    /// mismatch for Newton-Raphson, max voltage change for Gauss-Seidel.
    pub error: f64,

    /// Max P & Q mismatch (p.u.) after the iteration.
    pub max_mismatch: f64,

    /// RMS of the P & Q mismatch vector.
    pub rms_mismatch: f64,

    /// Bus voltages (magnitude p.u., angle degrees) after the iteration,
    /// only kept for small networks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltages: Option<Vec<(f64, f64)>>,
}

impl IterationRecord {
    pub fn new(iteration: usize, error: f64) -> Self {
        Self {
            iteration,
            error,
            max_mismatch: error,
            rms_mismatch: 0.0,
            voltages: None,
        }
    }

    pub fn mismatch(mut self, max: f64, rms: f64) -> Self {
        self.max_mismatch = max;
        self.rms_mismatch = rms;
        self
    }

    pub fn snapshot(mut self, v: &[Complex64]) -> Self {
        self.voltages = Some(v.iter().map(|v| (v.norm(), v.arg().to_degrees())).collect());
        self
    }
}

/// Passive recorder of per-iteration convergence data.
#[derive(Debug, Clone, Default)]
pub struct ConvergenceTracker {
    records: Vec<IterationRecord>,
    snapshot_max_buses: usize,
}

impl ConvergenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Voltage snapshots are attached by the solvers when the network has
    /// at most `max_buses` buses. Zero disables snapshots.
    pub fn with_snapshots(max_buses: usize) -> Self {
        Self {
            records: Vec::new(),
            snapshot_max_buses: max_buses,
        }
    }

    pub fn wants_snapshot(&self, n_bus: usize) -> bool {
        n_bus <= self.snapshot_max_buses
    }

    pub fn append(&mut self, record: IterationRecord) {
        self.records.push(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&IterationRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<IterationRecord> {
        self.records
    }
}
