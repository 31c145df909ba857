// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use super::{assert_close, model, three_bus, two_bus};
use crate::network::{Branch, NetworkModel};
use crate::ybus::make_ybus;
use num_complex::Complex64;

#[test]
fn two_bus_elements() {
    let net = model(two_bus());
    let y_bus = make_ybus(&net);

    let y = Complex64::new(1.0, 0.0) / Complex64::new(0.0, 0.1);
    assert_eq!(y_bus.n(), 2);
    assert_eq!(y_bus.nnz(), 4);
    assert_eq!(y_bus.get(0, 0), y);
    assert_eq!(y_bus.get(1, 1), y);
    assert_eq!(y_bus.get(0, 1), -y);
    assert_eq!(y_bus.get(1, 0), -y);
    assert_close(y.re, 0.0, 1e-12);
    assert_close(y.im, -10.0, 1e-9);
}

#[test]
fn off_diagonals_sum_to_minus_diagonal_without_charging() {
    let (buses, branches) = three_bus();
    let branches: Vec<Branch> = branches
        .into_iter()
        .map(|br| Branch { b: 0.0, ..br })
        .collect();
    let net = NetworkModel::new(buses, branches).unwrap();
    let y_bus = make_ybus(&net);

    for i in 0..y_bus.n() {
        let off: Complex64 = y_bus.row(i).filter(|&(j, _)| j != i).map(|(_, y)| y).sum();
        let sum = off + y_bus.diag(i);
        assert!(sum.norm() < 1e-12, "row {} sums to {}", i, sum);
    }
}

#[test]
fn line_charging_adds_to_diagonal_only() {
    let net = model(three_bus());
    let y_bus = make_ybus(&net);

    // half the charging of both branches at each bus
    let expected = [0.06 + 0.05, 0.06 + 0.04, 0.05 + 0.04];
    for (i, b) in expected.iter().enumerate() {
        let row_sum: Complex64 = y_bus.row(i).map(|(_, y)| y).sum();
        assert_close(row_sum.re, 0.0, 1e-12);
        assert_close(row_sum.im, b / 2.0, 1e-12);
    }
}

#[test]
fn symmetric() {
    let net = model(three_bus());
    let y_bus = make_ybus(&net);
    for i in 0..3 {
        for j in 0..3 {
            assert_eq!(y_bus.get(i, j), y_bus.get(j, i));
        }
    }
}

#[test]
fn parallel_branches_are_summed() {
    let (buses, mut branches) = two_bus();
    branches.push(Branch::new(2, 1, 0.0, 0.1, 0.0));
    let net = NetworkModel::new(buses, branches).unwrap();
    let y_bus = make_ybus(&net);

    let y = Complex64::new(1.0, 0.0) / Complex64::new(0.0, 0.1);
    assert_eq!(y_bus.nnz(), 4);
    assert_eq!(y_bus.get(0, 1), -y - y);
    assert_eq!(y_bus.diag(1), y + y);
}

#[test]
fn independent_of_branch_and_bus_order() {
    let (buses, branches) = three_bus();
    let y_bus = make_ybus(&NetworkModel::new(buses.clone(), branches.clone()).unwrap());

    let mut rev_buses = buses;
    rev_buses.reverse();
    let mut rev_branches = branches;
    rev_branches.reverse();
    let y_rev = make_ybus(&NetworkModel::new(rev_buses, rev_branches).unwrap());

    assert_eq!(y_bus, y_rev);
}

#[test]
fn entries_are_addressed_by_bus_id() {
    let (mut buses, branches) = two_bus();
    buses[1].id = 7;
    let branches = branches
        .into_iter()
        .map(|br| Branch { to: 7, ..br })
        .collect();
    let net = NetworkModel::new(buses, branches).unwrap();
    let entries = make_ybus(&net).entries(&net);

    let positions: Vec<(usize, usize)> = entries.iter().map(|e| (e.row, e.col)).collect();
    assert_eq!(positions, vec![(1, 1), (1, 7), (7, 1), (7, 7)]);
    assert!(entries[1].b > 0.0);
    assert!(entries[0].b < 0.0);
}

#[test]
fn mul_vec_matches_dense() {
    let net = model(three_bus());
    let y_bus = make_ybus(&net);
    let v = vec![
        Complex64::from_polar(1.02, 0.0),
        Complex64::from_polar(1.03, -0.01),
        Complex64::from_polar(0.97, -0.07),
    ];

    let dense = y_bus.to_dense();
    let i_bus = y_bus.mul_vec(&v);
    for i in 0..3 {
        let expected: Complex64 = (0..3).map(|j| dense[i][j] * v[j]).sum();
        assert!((i_bus[i] - expected).norm() < 1e-12);
    }
}
