// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use super::{assert_close, model, three_bus, three_bus_qlim, two_bus};
use crate::error::Violation;
use crate::network::{Branch, NetworkModel};
use crate::pf::{init_v, runpf, runpf_ybus, solve};
use crate::pfopt::{Alg, PFOpt, PFOptBuilder};
use crate::ybus::make_ybus;
use num_complex::Complex64;
use spsolve::rlu::RLU;
use std::sync::Arc;

#[test]
fn flat_start() {
    let net = model(three_bus());
    let v0 = init_v(&net, true);
    assert_eq!(
        v0,
        vec![
            Complex64::new(1.02, 0.0),
            Complex64::new(1.03, 0.0),
            Complex64::new(1.0, 0.0)
        ]
    );
}

#[test]
fn case_start() {
    let (mut buses, branches) = three_bus();
    buses[2].vm = 0.98;
    buses[2].va = -3.0;
    let net = NetworkModel::new(buses, branches).unwrap();

    let v0 = init_v(&net, false);
    assert_close(v0[2].norm(), 0.98, 1e-12);
    assert_close(v0[2].arg().to_degrees(), -3.0, 1e-12);

    let opt = PFOptBuilder::default().flat_start(false).build().unwrap();
    let result = runpf(&net, &opt, &RLU::default(), None).unwrap();
    assert!(result.converged);
    assert_close(result.bus(3).unwrap().vm, 0.967107, 1e-5);
}

#[test]
fn solve_reports_ybus() {
    let (buses, branches) = two_bus();
    let result = solve(buses, branches, &PFOpt::newton()).unwrap();

    assert!(result.converged);
    assert_eq!(result.ybus.len(), 4);
    assert_eq!((result.ybus[1].row, result.ybus[1].col), (1, 2));
    assert_close(result.ybus[1].b, 10.0, 1e-9);
}

#[test]
fn solve_merges_case_and_option_violations() {
    let (buses, _) = two_bus();
    let branches = vec![Branch::new(1, 2, 0.0, 0.0, 0.0)];
    let opt = PFOpt {
        tolerance: -1.0,
        ..PFOpt::default()
    };

    let err = solve(buses, branches, &opt).unwrap_err();
    assert!(err.is_validation());
    let msg = err.to_string();
    assert!(msg.contains("zero reactance"), "{}", msg);
    assert!(msg.contains("invalid option tolerance"), "{}", msg);
}

#[test]
fn invalid_options_rejected_before_solving() {
    let net = model(two_bus());
    let opt = PFOpt {
        max_it: Some(0),
        ..PFOpt::default()
    };
    let err = runpf(&net, &opt, &RLU::default(), None).unwrap_err();
    match err {
        crate::error::PowerFlowError::Validation(v) => assert!(matches!(
            v.violations(),
            [Violation::InvalidOption { name: "max_it", .. }]
        )),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn deterministic() {
    let net = model(three_bus_qlim());
    let solver = RLU::default();
    for opt in [PFOpt::newton(), PFOpt::gauss_seidel()] {
        let a = runpf(&net, &opt, &solver, None).unwrap();
        let b = runpf(&net, &opt, &solver, None).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn branch_order_does_not_change_voltages() {
    let (buses, branches) = three_bus();
    let mut reversed = branches.clone();
    reversed.reverse();
    let a = solve(buses.clone(), branches, &PFOpt::newton()).unwrap();
    let b = solve(buses, reversed, &PFOpt::newton()).unwrap();

    assert_eq!(a.buses, b.buses);
    assert_eq!(a.history, b.history);
}

#[test]
fn concurrent_solves_share_model() {
    let net = Arc::new(model(three_bus()));
    let y_bus = Arc::new(make_ybus(&net));
    let expected = runpf_ybus(&net, &y_bus, &PFOpt::newton(), &RLU::default(), None, None)
        .unwrap();

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = [Alg::NR, Alg::GS, Alg::NR, Alg::GS]
            .into_iter()
            .map(|alg| {
                let (net, y_bus) = (Arc::clone(&net), Arc::clone(&y_bus));
                s.spawn(move || {
                    let opt = PFOptBuilder::default()
                        .algorithm(alg)
                        .tolerance(if alg == Alg::GS { 1e-9 } else { 1e-6 })
                        .build()
                        .unwrap();
                    runpf_ybus(&net, &y_bus, &opt, &RLU::default(), None, None).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for result in results {
        assert!(result.converged);
        for (a, b) in expected.buses.iter().zip(&result.buses) {
            assert_close(b.vm, a.vm, 1e-6);
            assert_close(b.va, a.va, 1e-4);
        }
    }
    assert_eq!(*y_bus, make_ybus(&net));
}

#[test]
fn result_serializes_to_json() {
    let (buses, branches) = two_bus();
    let result = solve(buses, branches, &PFOpt::newton()).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["algorithm"], "NR");
    assert_eq!(json["converged"], true);
    assert_eq!(json["buses"][1]["effective_type"], "PQ");
    assert_eq!(json["history"].as_array().map(|h| h.len()), Some(4));
    assert!(json["history"][0]["voltages"].is_array());
}
