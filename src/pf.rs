// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::cancel::CancelToken;
use crate::error::{PowerFlowError, ValidationError};
use crate::gauss::gausspf;
use crate::network::{Branch, Bus, NetworkModel};
use crate::newton::{newtonpf, LogProgress, ProgressMonitor};
use crate::pfopt::{Alg, PFOpt};
use crate::pfsoln::{pfsoln, BranchFlow, BusResult, Summary};
use crate::tracker::{ConvergenceTracker, IterationRecord};
use crate::ybus::{make_ybus, YBus, YBusEntry};

use num_complex::Complex64;
use serde::Serialize;
use spsolve::rlu::RLU;
use spsolve::Solver;
use std::time::Instant;

/// Raw output of one solver run.
#[derive(Debug, Clone, PartialEq)]
pub struct PFSolution {
    /// Final complex bus voltages, internal bus order.
    pub v: Vec<Complex64>,
    pub converged: bool,
    pub iterations: usize,
    /// True if the solve stopped on a cancellation request.
    pub cancelled: bool,
    /// Internal indexes of PV buses demoted to PQ, in order of demotion.
    pub demoted: Vec<usize>,
}

/// Everything a consumer needs to report on a power flow run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerFlowResult {
    pub algorithm: Alg,
    pub converged: bool,
    pub cancelled: bool,
    pub iterations: usize,
    pub history: Vec<IterationRecord>,
    pub buses: Vec<BusResult>,
    pub branches: Vec<BranchFlow>,
    pub summary: Summary,
    pub ybus: Vec<YBusEntry>,
    /// Ids of PV buses demoted to PQ during the solve.
    pub demoted: Vec<usize>,
}

impl PowerFlowResult {
    pub fn bus(&self, id: usize) -> Option<&BusResult> {
        self.buses.iter().find(|b| b.id == id)
    }
}

/// Builds the initial voltage vector.
///
/// Slack keeps its magnitude and angle. With `flat_start`, PV buses keep
/// their magnitude set-point at zero angle and PQ buses start at
/// 1.0 p.u. and zero angle. Otherwise every bus starts from the case data,
/// with PV magnitudes still taken from the set-point.
pub fn init_v(net: &NetworkModel, flat_start: bool) -> Vec<Complex64> {
    net.buses()
        .iter()
        .map(|b| {
            if b.is_slack() || !flat_start {
                Complex64::from_polar(b.vm, b.va.to_radians())
            } else if b.is_pv() {
                Complex64::new(b.vm, 0.0)
            } else {
                Complex64::new(1.0, 0.0)
            }
        })
        .collect()
}

/// Runs a power flow on a validated network.
///
/// Builds the admittance matrix and calls [`runpf_ybus`], which validates
/// the options.
pub fn runpf(
    net: &NetworkModel,
    opt: &PFOpt,
    solver: &dyn Solver<usize, f64>,
    cancel: Option<&CancelToken>,
) -> Result<PowerFlowResult, PowerFlowError> {
    let y_bus = make_ybus(net);
    runpf_ybus(net, &y_bus, opt, solver, None, cancel)
}

/// Runs a power flow with a prebuilt admittance matrix.
///
/// Neither `net` nor `y_bus` is modified, so both may be shared between
/// concurrent solves. Non-convergence is reported in the result.
pub fn runpf_ybus(
    net: &NetworkModel,
    y_bus: &YBus,
    opt: &PFOpt,
    solver: &dyn Solver<usize, f64>,
    progress: Option<&dyn ProgressMonitor>,
    cancel: Option<&CancelToken>,
) -> Result<PowerFlowResult, PowerFlowError> {
    opt.validate()?;

    let alg = opt.algorithm;
    log::info!(
        " -- AC Power Flow ({}), {} buses, {} branches",
        alg.name(),
        net.n_bus(),
        net.n_branch()
    );

    let v0 = init_v(net, opt.flat_start);
    let mut tracker = ConvergenceTracker::with_snapshots(opt.snapshot_max_buses);
    let log_progress = LogProgress {};
    let progress = match progress {
        Some(progress) => progress,
        None => {
            log_progress.header();
            &log_progress as &dyn ProgressMonitor
        }
    };

    let t0 = Instant::now();
    let soln = match alg {
        Alg::NR => newtonpf(
            net,
            y_bus,
            &v0,
            solver,
            opt,
            &mut tracker,
            Some(progress),
            cancel,
        )?,
        Alg::GS => gausspf(net, y_bus, &v0, opt, &mut tracker, Some(progress), cancel)?,
    };
    log::debug!("{} solve took {:?}", alg.name(), t0.elapsed());

    let (buses, branches, summary) = pfsoln(net, y_bus, &soln.v, &soln.demoted, &opt.voltage_band);

    Ok(PowerFlowResult {
        algorithm: alg,
        converged: soln.converged,
        cancelled: soln.cancelled,
        iterations: soln.iterations,
        history: tracker.into_records(),
        buses,
        branches,
        summary,
        ybus: y_bus.entries(net),
        demoted: soln.demoted.iter().map(|&i| net.buses()[i].id).collect(),
    })
}

/// Validates the case and options together, then solves it with the
/// default sparse LU solver.
///
/// Every validation problem, in the case or in the options, is reported
/// in one error.
pub fn solve(
    buses: Vec<Bus>,
    branches: Vec<Branch>,
    opt: &PFOpt,
) -> Result<PowerFlowResult, PowerFlowError> {
    let net = match (NetworkModel::new(buses, branches), opt.validate()) {
        (Ok(net), Ok(())) => net,
        (Err(mut err), Err(ValidationError(more))) => {
            err.0.extend(more);
            return Err(err.into());
        }
        (Err(err), Ok(())) | (Ok(_), Err(err)) => return Err(err.into()),
    };
    let solver = RLU::default();
    runpf(&net, opt, &solver, None)
}
