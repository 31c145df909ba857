// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::network::NetworkModel;
use num_complex::Complex64;
use serde::Serialize;
use sparsetools::coo::Coo;
use std::collections::BTreeMap;

/// Bus admittance matrix in compressed sparse row form.
///
/// Each (row, col) position is stored at most once. Row and column
/// indexes are internal bus indexes (ascending bus id).
#[derive(Debug, Clone, PartialEq)]
pub struct YBus {
    n: usize,
    rowptr: Vec<usize>,
    colidx: Vec<usize>,
    values: Vec<Complex64>,
}

/// Non-zero YBus element addressed by bus id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YBusEntry {
    pub row: usize,
    pub col: usize,
    pub g: f64,
    pub b: f64,
}

/// Builds the bus admittance matrix.
///
/// Each branch is a nominal-pi section: the series admittance
/// `y = 1/(r + jx)` is added to both diagonal terms together with half
/// the line charging, and subtracted from both off-diagonal terms.
/// Contributions are collected per position and summed in a canonical
/// order before compression, so the result is bit-for-bit independent of
/// the order of the branch list.
pub fn make_ybus(net: &NetworkModel) -> YBus {
    let nb = net.n_bus();

    let mut acc = BTreeMap::<(usize, usize), Vec<Complex64>>::new();
    let mut add = |i: usize, j: usize, y: Complex64| {
        acc.entry((i, j)).or_default().push(y);
    };

    for (l, br) in net.branches().iter().enumerate() {
        let y_s = br.y_s(); // series admittance
        let b_c = Complex64::new(0.0, br.b / 2.0); // half line charging
        let (f, t) = net.branch_ends(l);

        add(f, f, y_s + b_c);
        add(t, t, y_s + b_c);
        add(f, t, -y_s);
        add(t, f, -y_s);
    }

    let mut y_bus = Coo::<usize, Complex64>::with_size(nb, nb);
    for ((i, j), mut terms) in acc {
        terms.sort_by(|a, b| a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im)));
        y_bus.push(i, j, terms.into_iter().sum::<Complex64>());
    }
    let csr = y_bus.to_csr();

    let y_bus = YBus {
        n: nb,
        rowptr: csr.rowptr().to_vec(),
        colidx: csr.colidx().to_vec(),
        values: csr.values().to_vec(),
    };
    log::trace!("Ybus: {} x {}, {} non-zeros", nb, nb, y_bus.nnz());
    y_bus
}

impl YBus {
    /// Matrix dimension (number of buses).
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Iterates the stored (column, value) pairs of row `i`.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, Complex64)> + '_ {
        let (start, end) = (self.rowptr[i], self.rowptr[i + 1]);
        self.colidx[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter().copied())
    }

    /// Element (i, j), zero if not stored.
    pub fn get(&self, i: usize, j: usize) -> Complex64 {
        self.row(i)
            .find(|&(c, _)| c == j)
            .map(|(_, y)| y)
            .unwrap_or_default()
    }

    pub fn diag(&self, i: usize) -> Complex64 {
        self.get(i, i)
    }

    /// Computes the bus current injections `Ybus * V`.
    pub fn mul_vec(&self, v: &[Complex64]) -> Vec<Complex64> {
        assert_eq!(v.len(), self.n);
        (0..self.n).map(|i| self.row_dot(i, v)).collect()
    }

    /// Row `i` of `Ybus * V`.
    pub fn row_dot(&self, i: usize, v: &[Complex64]) -> Complex64 {
        self.row(i).map(|(j, y)| y * v[j]).sum()
    }

    /// Non-zero elements addressed by bus id, in row-major order.
    pub fn entries(&self, net: &NetworkModel) -> Vec<YBusEntry> {
        let ids = net.bus_ids();
        let mut entries: Vec<YBusEntry> = (0..self.n)
            .flat_map(|i| {
                let ids = &ids;
                self.row(i).map(move |(j, y)| YBusEntry {
                    row: ids[i],
                    col: ids[j],
                    g: y.re,
                    b: y.im,
                })
            })
            .collect();
        entries.sort_by_key(|e| (e.row, e.col));
        entries
    }

    /// Dense copy of the matrix, for display of small networks.
    pub fn to_dense(&self) -> Vec<Vec<Complex64>> {
        let mut dense = vec![vec![Complex64::default(); self.n]; self.n];
        for (i, row) in dense.iter_mut().enumerate() {
            for (j, y) in self.row(i) {
                row[j] += y;
            }
        }
        dense
    }
}
