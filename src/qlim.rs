// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::network::Bus;

/// Which reactive limit a generator has hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QLimit {
    Upper(f64),
    Lower(f64),
}

impl QLimit {
    pub fn value(&self) -> f64 {
        match *self {
            QLimit::Upper(q) | QLimit::Lower(q) => q,
        }
    }
}

/// Checks the generator reactive output implied by the net injection
/// `q_inj` at `bus` against its limits.
///
/// The generator output is the injection plus the local reactive load.
/// Returns the violated bound, if any. Buses without limits never violate.
pub fn check_q_limits(bus: &Bus, q_inj: f64) -> Option<QLimit> {
    let qg = q_inj + bus.ql;
    match (bus.qmin, bus.qmax) {
        (_, Some(qmax)) if qg > qmax => Some(QLimit::Upper(qmax)),
        (Some(qmin), _) if qg < qmin => Some(QLimit::Lower(qmin)),
        _ => None,
    }
}

/// Net reactive injection at `bus` with its generator held at `limit`.
pub fn clamped_injection(bus: &Bus, limit: QLimit) -> f64 {
    limit.value() - bus.ql
}
