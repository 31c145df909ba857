// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::network::NetworkModel;
use crate::ybus::YBus;
use num_complex::Complex64;
use std::iter::zip;

/// Builds the vector of specified complex bus power injections.
///
/// Returns generation minus load for every bus, in per unit and
/// internal bus order.
pub fn make_sbus(net: &NetworkModel) -> Vec<Complex64> {
    net.buses().iter().map(|b| b.s_spec()).collect()
}

/// Computes the complex power injected at every bus, `V .* conj(Ybus * V)`.
pub fn calc_sbus(y_bus: &YBus, v: &[Complex64]) -> Vec<Complex64> {
    let i_bus = y_bus.mul_vec(v);
    zip(v, &i_bus).map(|(v, i)| v * i.conj()).collect()
}

/// Complex power injected at bus `i` given the latest voltages.
pub fn calc_sbus_at(y_bus: &YBus, v: &[Complex64], i: usize) -> Complex64 {
    v[i] * y_bus.row_dot(i, v).conj()
}

/// Stacks the active and reactive power mismatch `s_spec - s_calc`
/// into the order used for the Newton unknowns: real parts for
/// `pvpq`, then imaginary parts for `pq`.
pub fn mismatch(
    s_spec: &[Complex64],
    s_calc: &[Complex64],
    pvpq: &[usize],
    pq: &[usize],
) -> Vec<f64> {
    let mis = |i: usize| s_spec[i] - s_calc[i];
    pvpq.iter()
        .map(|&i| mis(i).re)
        .chain(pq.iter().map(|&i| mis(i).im))
        .collect()
}
