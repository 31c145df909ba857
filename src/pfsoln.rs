// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::math::J;
use crate::network::{BusType, NetworkModel};
use crate::pfopt::VoltageBand;
use crate::sbus::calc_sbus;
use crate::ybus::YBus;
use num_complex::Complex64;
use serde::Serialize;

/// Solved state of one bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusResult {
    pub id: usize,

    /// Type declared in the case.
    pub bus_type: BusType,

    /// Type the bus ended the solve with (PV buses may have been demoted).
    pub effective_type: BusType,

    /// Voltage magnitude (p.u.).
    pub vm: f64,

    /// Voltage angle (degrees).
    pub va: f64,

    /// Calculated net injection (p.u.).
    pub p_calc: f64,
    pub q_calc: f64,

    /// Specified net injection from the case, generation minus load (p.u.).
    pub p_spec: f64,
    pub q_spec: f64,

    /// Generation implied by the solution, calculated injection plus load (p.u.).
    pub pg: f64,
    pub qg: f64,

    /// Load (p.u.).
    pub pl: f64,
    pub ql: f64,
}

/// Power flowing into a branch at each end, and the branch losses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchFlow {
    /// Position of the branch in the case.
    pub index: usize,
    pub from: usize,
    pub to: usize,

    /// Real/reactive power injected at the "from" end (p.u.).
    pub pf: f64,
    pub qf: f64,

    /// Real/reactive power injected at the "to" end (p.u.).
    pub pt: f64,
    pub qt: f64,

    /// Real/reactive losses, the sum of both end injections (p.u.).
    pub p_loss: f64,
    pub q_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub vm_min: f64,
    pub vm_min_bus: usize,
    pub vm_max: f64,
    pub vm_max_bus: usize,
    pub vm_avg: f64,
    pub vm_std: f64,

    pub total_gen_p: f64,
    pub total_gen_q: f64,
    pub total_load_p: f64,
    pub total_load_q: f64,
    pub total_loss_p: f64,
    pub total_loss_q: f64,

    pub voltage_band: VoltageBand,
    /// Ids of buses below `voltage_band.vmin`.
    pub under_voltage: Vec<usize>,
    /// Ids of buses above `voltage_band.vmax`.
    pub over_voltage: Vec<usize>,
}

impl Summary {
    /// Number of buses outside the voltage band.
    pub fn n_out_of_band(&self) -> usize {
        self.under_voltage.len() + self.over_voltage.len()
    }
}

/// Computes branch flows at both ends for the voltages `v`.
///
/// ```txt
/// S_ft = V_f conj(y (V_f - V_t) + j b/2 V_f)
/// S_tf = V_t conj(y (V_t - V_f) + j b/2 V_t)
/// ```
pub fn branch_flows(net: &NetworkModel, v: &[Complex64]) -> Vec<BranchFlow> {
    net.branches()
        .iter()
        .enumerate()
        .map(|(l, br)| {
            let (f, t) = net.branch_ends(l);
            let y_s = br.y_s();
            let b_c = J * (br.b / 2.0);

            let s_f = v[f] * (y_s * (v[f] - v[t]) + b_c * v[f]).conj(); // complex power at "from" bus
            let s_t = v[t] * (y_s * (v[t] - v[f]) + b_c * v[t]).conj(); // complex power injected at "to" bus
            let loss = s_f + s_t;

            BranchFlow {
                index: l,
                from: br.from,
                to: br.to,
                pf: s_f.re,
                qf: s_f.im,
                pt: s_t.re,
                qt: s_t.im,
                p_loss: loss.re,
                q_loss: loss.im,
            }
        })
        .collect()
}

/// Derives bus results, branch flows and summary statistics from a
/// (converged or best-effort) voltage solution.
///
/// `demoted` holds the internal indexes of PV buses that were solved as
/// PQ, which only changes the reported effective type.
pub fn pfsoln(
    net: &NetworkModel,
    y_bus: &YBus,
    v: &[Complex64],
    demoted: &[usize],
    band: &VoltageBand,
) -> (Vec<BusResult>, Vec<BranchFlow>, Summary) {
    let s_calc = calc_sbus(y_bus, v);

    let buses: Vec<BusResult> = net
        .buses()
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let s_spec = b.s_spec();
            let s_gen = s_calc[i] + b.s_load();
            BusResult {
                id: b.id,
                bus_type: b.bus_type,
                effective_type: if demoted.contains(&i) {
                    BusType::PQ
                } else {
                    b.bus_type
                },
                vm: v[i].norm(),
                va: v[i].arg().to_degrees(),
                p_calc: s_calc[i].re,
                q_calc: s_calc[i].im,
                p_spec: s_spec.re,
                q_spec: s_spec.im,
                pg: s_gen.re,
                qg: s_gen.im,
                pl: b.pl,
                ql: b.ql,
            }
        })
        .collect();

    let branches = branch_flows(net, v);
    let summary = summarize(&buses, &branches, band);

    (buses, branches, summary)
}

fn summarize(buses: &[BusResult], branches: &[BranchFlow], band: &VoltageBand) -> Summary {
    let n = buses.len() as f64;

    let (mut vm_min, mut vm_min_bus) = (f64::INFINITY, 0);
    let (mut vm_max, mut vm_max_bus) = (f64::NEG_INFINITY, 0);
    for b in buses {
        if b.vm < vm_min {
            (vm_min, vm_min_bus) = (b.vm, b.id);
        }
        if b.vm > vm_max {
            (vm_max, vm_max_bus) = (b.vm, b.id);
        }
    }
    let vm_avg = buses.iter().map(|b| b.vm).sum::<f64>() / n;
    let vm_std = (buses.iter().map(|b| (b.vm - vm_avg).powi(2)).sum::<f64>() / n).sqrt();

    let under_voltage = buses
        .iter()
        .filter(|b| b.vm < band.vmin)
        .map(|b| b.id)
        .collect();
    let over_voltage = buses
        .iter()
        .filter(|b| b.vm > band.vmax)
        .map(|b| b.id)
        .collect();

    Summary {
        vm_min,
        vm_min_bus,
        vm_max,
        vm_max_bus,
        vm_avg,
        vm_std,
        total_gen_p: buses.iter().map(|b| b.pg).sum(),
        total_gen_q: buses.iter().map(|b| b.qg).sum(),
        total_load_p: buses.iter().map(|b| b.pl).sum(),
        total_load_q: buses.iter().map(|b| b.ql).sum(),
        total_loss_p: branches.iter().map(|br| br.p_loss).sum(),
        total_loss_q: branches.iter().map(|br| br.q_loss).sum(),
        voltage_band: *band,
        under_voltage,
        over_voltage,
    }
}
