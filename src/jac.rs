// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::math::J;
use crate::ybus::YBus;
use num_complex::Complex64;
use sparsetools::coo::Coo;
use sparsetools::csc::CSC;

/// Position of each bus in the Newton unknown vector.
///
/// Angles of the `pvpq` buses come first, followed by the magnitudes of
/// the `pq` buses. The same ordering is used for the P and Q mismatch rows.
pub struct UnknownIndex {
    ang: Vec<Option<usize>>,
    mag: Vec<Option<usize>>,
    len: usize,
}

impl UnknownIndex {
    pub fn new(nb: usize, pvpq: &[usize], pq: &[usize]) -> Self {
        let mut ang = vec![None; nb];
        let mut mag = vec![None; nb];
        for (k, &i) in pvpq.iter().enumerate() {
            ang[i] = Some(k);
        }
        for (k, &i) in pq.iter().enumerate() {
            mag[i] = Some(pvpq.len() + k);
        }
        Self {
            ang,
            mag,
            len: pvpq.len() + pq.len(),
        }
    }

    pub fn angle(&self, i: usize) -> Option<usize> {
        self.ang[i]
    }

    pub fn magnitude(&self, i: usize) -> Option<usize> {
        self.mag[i]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Forms the reduced power flow Jacobian in polar coordinates.
///
/// Rows are the P equations of the angle unknowns followed by the Q
/// equations of the magnitude unknowns. Entries are the real and imaginary
/// parts of
///
/// ```txt
/// dS_i/dVa_j = j V_i conj(d_ij I_i - Y_ij V_j)
/// dS_i/dVm_j = V_i conj(Y_ij V_j/|V_j|) + d_ij conj(I_i) V_i/|V_i|
/// ```
///
/// taken only over the stored pattern of `y_bus`, so the result has the
/// sparsity of the admittance matrix.
pub fn make_jac(
    y_bus: &YBus,
    v: &[Complex64],
    i_bus: &[Complex64],
    idx: &UnknownIndex,
) -> CSC<usize, f64> {
    let n = idx.len();
    let mut jac = Coo::<usize, f64>::with_size(n, n);

    let v_norm: Vec<Complex64> = v.iter().map(|v| v / v.norm()).collect();

    for i in 0..y_bus.n() {
        let (p_row, q_row) = match idx.angle(i) {
            Some(p) => (p, idx.magnitude(i)),
            None => continue, // slack
        };

        // (column bus, dS/dVa, dS/dVm) for this row
        let mut terms: Vec<(usize, Complex64, Complex64)> = y_bus
            .row(i)
            .map(|(j, y)| {
                let d_va = -J * v[i] * (y * v[j]).conj();
                let d_vm = v[i] * (y * v_norm[j]).conj();
                (j, d_va, d_vm)
            })
            .collect();

        let d_va_ii = J * v[i] * i_bus[i].conj();
        let d_vm_ii = i_bus[i].conj() * v_norm[i];
        match terms.iter_mut().find(|(j, _, _)| *j == i) {
            Some((_, d_va, d_vm)) => {
                *d_va += d_va_ii;
                *d_vm += d_vm_ii;
            }
            None => terms.push((i, d_va_ii, d_vm_ii)),
        }

        for (j, d_va, d_vm) in terms {
            if let Some(col) = idx.angle(j) {
                jac.push(p_row, col, d_va.re);
                if let Some(q_row) = q_row {
                    jac.push(q_row, col, d_va.im);
                }
            }
            if let Some(col) = idx.magnitude(j) {
                jac.push(p_row, col, d_vm.re);
                if let Some(q_row) = q_row {
                    jac.push(q_row, col, d_vm.im);
                }
            }
        }
    }

    jac.to_csc()
}
