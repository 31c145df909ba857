// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::error::Violation;
use crate::pfopt::{Alg, PFOpt, PFOptBuilder, VoltageBand, DEFAULT_MAX_IT_GS, DEFAULT_MAX_IT_NR};

#[test]
fn defaults() {
    let opt = PFOpt::default();
    assert_eq!(opt.algorithm, Alg::NR);
    assert_eq!(opt.tolerance, 1e-6);
    assert_eq!(opt.max_it(), DEFAULT_MAX_IT_NR);
    assert_eq!(opt.acceleration, 1.0);
    assert!(opt.enforce_q_limits);
    assert!(opt.flat_start);
    assert_eq!(opt.voltage_band, VoltageBand { vmin: 0.95, vmax: 1.05 });

    assert_eq!(PFOpt::gauss_seidel().max_it(), DEFAULT_MAX_IT_GS);
    assert_eq!(PFOptBuilder::default().build().unwrap(), opt);
}

#[test]
fn explicit_max_it_overrides_default() {
    let opt = PFOptBuilder::default()
        .algorithm(Alg::GS)
        .max_it(50)
        .build()
        .unwrap();
    assert_eq!(opt.max_it(), 50);
}

#[test]
fn builder_rejects_invalid_values() {
    assert!(PFOptBuilder::default().tolerance(0.0).build().is_err());
    assert!(PFOptBuilder::default().acceleration(-1.0).build().is_err());
    assert!(PFOptBuilder::default().max_it(0).build().is_err());
    assert!(PFOptBuilder::default()
        .voltage_band(VoltageBand { vmin: 1.1, vmax: 0.9 })
        .build()
        .is_err());
}

#[test]
fn validate_collects_every_problem() {
    let opt = PFOpt {
        tolerance: f64::NAN,
        acceleration: 0.0,
        ..PFOpt::default()
    };
    let err = opt.validate().unwrap_err();
    let names: Vec<&str> = err
        .violations()
        .iter()
        .filter_map(|v| match v {
            Violation::InvalidOption { name, .. } => Some(*name),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["tolerance", "acceleration"]);
}
