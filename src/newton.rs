// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::bus_types::BusTypes;
use crate::cancel::{cancelled, CancelToken};
use crate::debug::{format_f64_vec, format_polar_vec};
use crate::error::NumericalError;
use crate::jac::{make_jac, UnknownIndex};
use crate::math::{norm_inf, rms};
use crate::network::NetworkModel;
use crate::pf::PFSolution;
use crate::pfopt::PFOpt;
use crate::qlim::{check_q_limits, clamped_injection};
use crate::sbus::{calc_sbus, make_sbus, mismatch};
use crate::tracker::{ConvergenceTracker, IterationRecord};
use crate::ybus::YBus;

use num_complex::Complex64;
use spsolve::Solver;
use std::iter::zip;

pub trait ProgressMonitor {
    fn update(&self, i: usize, norm_f: f64);
}

/// Writes the iteration table to the log at debug level.
pub struct LogProgress {}

impl LogProgress {
    pub fn header(&self) {
        log::debug!(" it    max error");
        log::debug!("----  ------------------");
    }
}

impl ProgressMonitor for LogProgress {
    fn update(&self, i: usize, norm_f: f64) {
        log::debug!("{:3}        {:10.3e}", i, norm_f);
    }
}

/// Solves power flow using full Newton's method (power/polar).
///
/// The unknowns are the voltage angles of all non-slack buses followed by
/// the voltage magnitudes of the PQ buses, both in ascending bus id order.
/// Magnitude corrections are additive, so the magnitude columns of the
/// Jacobian are `dS/d|V|`.
///
/// When `opt.enforce_q_limits` is set, the generator reactive output at
/// every PV bus is checked after each update, and at the starting point
/// when that already meets the tolerance. A bus outside its limits
/// has its reactive injection fixed at the violated bound and is solved
/// as a PQ bus for the rest of this call.
///
/// Returns the final complex voltages along with the convergence flag and
/// the number of iterations performed. A singular Jacobian is an error;
/// running out of iterations is not.
pub fn newtonpf(
    net: &NetworkModel,
    y_bus: &YBus,
    v0: &[Complex64],
    solver: &dyn Solver<usize, f64>,
    opt: &PFOpt,
    tracker: &mut ConvergenceTracker,
    progress: Option<&dyn ProgressMonitor>,
    cancel: Option<&CancelToken>,
) -> Result<PFSolution, NumericalError> {
    tracker.clear();

    let tol = opt.tolerance;
    let max_it = opt.max_it();
    let nb = net.n_bus();

    let mut types = BusTypes::new(net);
    let mut s_spec = make_sbus(net);
    let pvpq = types.non_slack();
    let (mut pv, mut pq) = types.pv_pq();

    let mut converged = false;
    let mut stopped = false;
    let mut i = 0;
    let mut v = v0.to_vec();
    log::trace!("V0: {}", format_polar_vec(&v));

    // evaluate F(x0)
    let s_calc = calc_sbus(y_bus, &v);
    let mut f = mismatch(&s_spec, &s_calc, &pvpq, &pq);

    // a starting point that already solves the case must still respect Q limits
    if opt.enforce_q_limits
        && norm_inf(&f) <= tol
        && enforce_q_limits(net, &mut types, &mut s_spec, &s_calc, &pv)
    {
        (pv, pq) = types.pv_pq();
        f = mismatch(&s_spec, &s_calc, &pvpq, &pq);
    }

    // check tolerance
    let norm_f = record(tracker, progress, i, &f, &v);
    if norm_f <= tol {
        converged = true;
        log::info!("Converged!");
    }

    // do Newton iterations
    while !converged && i < max_it {
        if cancelled(cancel) {
            stopped = true;
            log::info!("Newton's method power flow cancelled after {} iterations.", i);
            break;
        }

        // update iteration counter
        i += 1;

        // evaluate Jacobian
        let i_bus = y_bus.mul_vec(&v);
        let idx = UnknownIndex::new(nb, &pvpq, &pq);
        let jac = make_jac(y_bus, &v, &i_bus, &idx);

        // compute update step
        let dx = {
            let mut rhs = f.clone();
            solver
                .solve(
                    jac.cols(),
                    jac.rowidx(),
                    jac.colptr(),
                    jac.values(),
                    &mut rhs,
                    false,
                )
                .map_err(|e| NumericalError::SingularJacobian {
                    iteration: i,
                    reason: e.to_string(),
                })?;
            rhs
        };
        log::trace!("dx: {}", format_f64_vec(&dx));
        if dx.iter().any(|dx| !dx.is_finite()) {
            return Err(NumericalError::NonFiniteStep { iteration: i });
        }

        // update voltage
        let mut va: Vec<f64> = v.iter().map(|v| v.arg()).collect();
        let mut vm: Vec<f64> = v.iter().map(|v| v.norm()).collect();
        pvpq.iter().zip(&dx).for_each(|(&j, dx)| va[j] += dx);
        pq.iter()
            .zip(&dx[pvpq.len()..])
            .for_each(|(&j, dx)| vm[j] += dx);

        // go through polar form again in case we wrapped around with a negative Vm
        v = zip(vm, va)
            .map(|(vm, va)| Complex64::from_polar(vm, va))
            .collect();

        let s_calc = calc_sbus(y_bus, &v);

        // enforce generator Q limits
        if opt.enforce_q_limits && enforce_q_limits(net, &mut types, &mut s_spec, &s_calc, &pv) {
            (pv, pq) = types.pv_pq();
        }

        // evaluate F(x)
        f = mismatch(&s_spec, &s_calc, &pvpq, &pq);

        // check for convergence
        let norm_f = record(tracker, progress, i, &f, &v);
        if norm_f <= tol {
            converged = true;
            log::info!(
                "Newton's method power flow (power balance, polar) converged in {} iterations.",
                i
            );
        }
    }

    if !converged && !stopped {
        log::info!(
            "Newton's method power flow (power balance, polar) did not converge in {} iterations.",
            i
        );
    }

    Ok(PFSolution {
        v,
        converged,
        iterations: i,
        cancelled: stopped,
        demoted: types.demoted().to_vec(),
    })
}

/// Fixes the injection of every PV bus whose generator reactive output is
/// outside its limits and demotes it. Returns true if any bus was demoted.
fn enforce_q_limits(
    net: &NetworkModel,
    types: &mut BusTypes,
    s_spec: &mut [Complex64],
    s_calc: &[Complex64],
    pv: &[usize],
) -> bool {
    let mut demoted = false;
    for &j in pv {
        let bus = &net.buses()[j];
        if let Some(limit) = check_q_limits(bus, s_calc[j].im) {
            s_spec[j].im = clamped_injection(bus, limit);
            types.demote(j);
            demoted = true;
            log::warn!(
                "bus {} reactive output {:.4} p.u. outside limits, fixed at {:.4} and converted to PQ",
                bus.id,
                s_calc[j].im + bus.ql,
                limit.value()
            );
        }
    }
    demoted
}

fn record(
    tracker: &mut ConvergenceTracker,
    progress: Option<&dyn ProgressMonitor>,
    i: usize,
    f: &[f64],
    v: &[Complex64],
) -> f64 {
    let norm_f = norm_inf(f);
    let mut rec = IterationRecord::new(i, norm_f).mismatch(norm_f, rms(f));
    if tracker.wants_snapshot(v.len()) {
        rec = rec.snapshot(v);
    }
    tracker.append(rec);
    if let Some(pm) = progress {
        pm.update(i, norm_f);
    }
    norm_f
}
