// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

mod debug;
mod jac;
mod pf;
mod pfopt;
mod qlim;
mod ybus;

use crate::cancel::CancelToken;
use crate::network::{Branch, Bus, NetworkModel};
use crate::newton::ProgressMonitor;

/// Single lossless line feeding a 0.5 + j0.2 p.u. load.
pub(crate) fn two_bus() -> (Vec<Bus>, Vec<Branch>) {
    let buses = vec![Bus::slack(1, 1.0, 0.0), Bus::pq(2, 0.5, 0.2)];
    let branches = vec![Branch::new(1, 2, 0.0, 0.1, 0.0)];
    (buses, branches)
}

/// `two_bus` with an unconnected 0.1 p.u. load at bus 3.
pub(crate) fn two_bus_isolated() -> (Vec<Bus>, Vec<Branch>) {
    let (mut buses, branches) = two_bus();
    buses.push(Bus::pq(3, 0.1, 0.0));
    (buses, branches)
}

/// Meshed slack/PV/PQ network with line charging.
pub(crate) fn three_bus() -> (Vec<Bus>, Vec<Branch>) {
    let buses = vec![
        Bus::slack(1, 1.02, 0.0),
        Bus::pv(2, 1.03, 0.5),
        Bus::pq(3, 0.8, 0.3),
    ];
    let branches = vec![
        Branch::new(1, 2, 0.02, 0.06, 0.06),
        Branch::new(1, 3, 0.08, 0.24, 0.05),
        Branch::new(2, 3, 0.06, 0.18, 0.04),
    ];
    (buses, branches)
}

/// `three_bus` with the generator at bus 2 unable to reach its set-point
/// (it needs about 0.327 p.u. of reactive power).
pub(crate) fn three_bus_qlim() -> (Vec<Bus>, Vec<Branch>) {
    let (mut buses, branches) = three_bus();
    buses[1] = buses[1].clone().with_q_limits(Some(-0.5), Some(0.2));
    (buses, branches)
}

pub(crate) fn model(case: (Vec<Bus>, Vec<Branch>)) -> NetworkModel {
    let (buses, branches) = case;
    NetworkModel::new(buses, branches).unwrap()
}

pub(crate) fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {} got {} (tol {})",
        expected,
        actual,
        tol
    );
}

/// Requests cancellation once the given iteration has been reported.
pub(crate) struct CancelAt {
    pub iteration: usize,
    pub token: CancelToken,
}

impl ProgressMonitor for CancelAt {
    fn update(&self, i: usize, _norm_f: f64) {
        if i == self.iteration {
            self.token.cancel();
        }
    }
}
