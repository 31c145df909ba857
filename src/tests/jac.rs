// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use super::{model, three_bus};
use crate::bus_types::BusTypes;
use crate::jac::{make_jac, UnknownIndex};
use crate::sbus::calc_sbus;
use crate::ybus::make_ybus;
use num_complex::Complex64;

#[test]
fn unknown_ordering() {
    let idx = UnknownIndex::new(4, &[1, 2, 3], &[2, 3]);
    assert_eq!(idx.len(), 5);
    assert_eq!(idx.angle(0), None);
    assert_eq!(idx.angle(2), Some(1));
    assert_eq!(idx.magnitude(1), None);
    assert_eq!(idx.magnitude(2), Some(3));
    assert_eq!(idx.magnitude(3), Some(4));
}

#[test]
fn matches_finite_differences() {
    let net = model(three_bus());
    let y_bus = make_ybus(&net);
    let types = BusTypes::new(&net);
    let pvpq = types.non_slack();
    let (_, pq) = types.pv_pq();
    let idx = UnknownIndex::new(net.n_bus(), &pvpq, &pq);

    let va = [0.0, -0.01, -0.07];
    let vm = [1.02, 1.03, 0.97];
    let polar = |va: &[f64], vm: &[f64]| -> Vec<Complex64> {
        (0..3).map(|i| Complex64::from_polar(vm[i], va[i])).collect()
    };
    let residual = |va: &[f64], vm: &[f64]| -> Vec<f64> {
        let s = calc_sbus(&y_bus, &polar(va, vm));
        pvpq.iter()
            .map(|&i| s[i].re)
            .chain(pq.iter().map(|&i| s[i].im))
            .collect()
    };

    let v = polar(&va[..], &vm[..]);
    let i_bus = y_bus.mul_vec(&v);
    let jac = make_jac(&y_bus, &v, &i_bus, &idx);

    let n = idx.len();
    let mut dense = vec![vec![0.0; n]; n];
    let (colptr, rowidx, values) = (jac.colptr(), jac.rowidx(), jac.values());
    for col in 0..n {
        for k in colptr[col]..colptr[col + 1] {
            dense[rowidx[k]][col] += values[k];
        }
    }

    let h = 1e-7;
    let f0 = residual(&va[..], &vm[..]);
    for col in 0..n {
        let (mut va1, mut vm1) = (va, vm);
        if col < pvpq.len() {
            va1[pvpq[col]] += h;
        } else {
            vm1[pq[col - pvpq.len()]] += h;
        }
        let f1 = residual(&va1[..], &vm1[..]);
        for row in 0..n {
            let fd = (f1[row] - f0[row]) / h;
            assert!(
                (dense[row][col] - fd).abs() < 1e-4,
                "J[{}][{}] = {} but finite difference is {}",
                row,
                col,
                dense[row][col],
                fd
            );
        }
    }
}
