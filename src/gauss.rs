// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::bus_types::BusTypes;
use crate::cancel::{cancelled, CancelToken};
use crate::debug::format_rect_vec;
use crate::error::NumericalError;
use crate::math::{all_finite, norm_inf, rms, with_magnitude};
use crate::network::NetworkModel;
use crate::newton::ProgressMonitor;
use crate::pf::PFSolution;
use crate::pfopt::PFOpt;
use crate::qlim::{check_q_limits, clamped_injection};
use crate::sbus::{calc_sbus, calc_sbus_at, make_sbus, mismatch};
use crate::tracker::{ConvergenceTracker, IterationRecord};
use crate::ybus::YBus;

use num_complex::Complex64;

/// Solves the power flow using a Gauss-Seidel method.
///
/// Buses are swept in ascending id order and each new voltage is used
/// immediately by the buses that follow it. The raw update is scaled by
/// the acceleration factor `opt.acceleration`:
///
/// ```txt
/// V_new = (conj(S_i) / conj(V_i) - sum_{j != i} Y_ij V_j) / Y_ii
/// V_i  <- V_i + alpha * (V_new - V_i)
/// ```
///
/// PV buses use the reactive injection implied by the present voltages and
/// are pulled back to their magnitude set-point after the update. If
/// the implied generator output is outside its limits the bus is fixed
/// at the limit and treated as PQ from then on.
///
/// The history starts with the initial mismatch at iteration 0, where the
/// voltage change is zero. Converges when the largest voltage change of a
/// sweep is within the tolerance. Hitting the iteration cap, or a sweep that produces
/// non-finite voltages, ends the solve without convergence and returns
/// the last finite voltages.
pub fn gausspf(
    net: &NetworkModel,
    y_bus: &YBus,
    v0: &[Complex64],
    opt: &PFOpt,
    tracker: &mut ConvergenceTracker,
    progress: Option<&dyn ProgressMonitor>,
    cancel: Option<&CancelToken>,
) -> Result<PFSolution, NumericalError> {
    tracker.clear();

    let tol = opt.tolerance;
    let max_it = opt.max_it();
    let alpha = opt.acceleration;

    let mut types = BusTypes::new(net);
    let mut s_spec = make_sbus(net);
    let order = types.non_slack();

    for &k in order.iter() {
        if y_bus.diag(k).norm() == 0.0 {
            return Err(NumericalError::ZeroDiagonal {
                bus: net.buses()[k].id,
            });
        }
    }

    let mut converged = false;
    let mut stopped = false;
    let mut diverged = false;
    let mut i = 0;
    let mut v = v0.to_vec();

    // initial mismatch, before any sweep
    let (_, pq) = types.pv_pq();
    let f = mismatch(&s_spec, &calc_sbus(y_bus, &v), &order, &pq);
    record(tracker, progress, i, 0.0, &f, &v);

    while !converged && i < max_it {
        if cancelled(cancel) {
            stopped = true;
            log::info!("Gauss-Seidel power flow cancelled after {} iterations.", i);
            break;
        }

        // update iteration counter
        i += 1;

        let v_prev = v.clone();
        let mut max_dv: f64 = 0.0;

        for &k in order.iter() {
            let bus = &net.buses()[k];

            if types.is_pv(k) {
                let q_inj = calc_sbus_at(y_bus, &v, k).im;
                let limit = if opt.enforce_q_limits {
                    check_q_limits(bus, q_inj)
                } else {
                    None
                };
                match limit {
                    Some(limit) => {
                        s_spec[k].im = clamped_injection(bus, limit);
                        types.demote(k);
                        log::warn!(
                            "bus {} reactive output {:.4} p.u. outside limits, fixed at {:.4} and converted to PQ",
                            bus.id,
                            q_inj + bus.ql,
                            limit.value()
                        );
                    }
                    None => s_spec[k].im = q_inj,
                }
            }

            let sum_yv: Complex64 = y_bus
                .row(k)
                .filter(|&(j, _)| j != k)
                .map(|(j, y)| y * v[j])
                .sum();

            let v_old = v[k];
            let v_new = (s_spec[k].conj() / v_old.conj() - sum_yv) / y_bus.diag(k);
            let mut v_acc = v_old + (v_new - v_old) * alpha;
            if types.is_pv(k) {
                v_acc = with_magnitude(v_acc, bus.vm);
            }
            v[k] = v_acc;

            max_dv = max_dv.max((v_acc - v_old).norm());
        }

        if !all_finite(&v) {
            log::warn!(
                "Gauss-Seidel power flow diverged at iteration {}, keeping the previous voltages.",
                i
            );
            v = v_prev;
            diverged = true;
            break;
        }

        log::trace!("V{}: {}", i, format_rect_vec(&v));

        // P & Q mismatch for monitoring only
        let (_, pq) = types.pv_pq();
        let f = mismatch(&s_spec, &calc_sbus(y_bus, &v), &order, &pq);
        record(tracker, progress, i, max_dv, &f, &v);

        if max_dv <= tol {
            converged = true;
            log::info!("Gauss-Seidel power flow converged in {} iterations.", i);
        }
    }

    if !converged && !stopped && !diverged {
        log::info!(
            "Gauss-Seidel power flow did not converge in {} iterations.",
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

fn record(
    tracker: &mut ConvergenceTracker,
    progress: Option<&dyn ProgressMonitor>,
    i: usize,
    max_dv: f64,
    f: &[f64],
    v: &[Complex64],
) {
    let mut rec = IterationRecord::new(i, max_dv).mismatch(norm_inf(f), rms(f));
    if tracker.wants_snapshot(v.len()) {
        rec = rec.snapshot(v);
    }
    tracker.append(rec);
    if let Some(pm) = progress {
        pm.update(i, max_dv);
    }
}
