// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::network::{BusType, NetworkModel};

/// Builds index lists for each type of bus (Slack, PV, PQ).
///
/// Indexes are internal (ascending bus id), so each list is sorted.
pub fn bus_types(net: &NetworkModel) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
    let of_type = |t: BusType| {
        net.buses()
            .iter()
            .enumerate()
            .filter(|(_, b)| b.bus_type == t)
            .map(|(i, _)| i)
            .collect::<Vec<usize>>()
    };
    (
        of_type(BusType::Slack),
        of_type(BusType::PV),
        of_type(BusType::PQ),
    )
}

/// Effective bus classification for the duration of one solve.
///
/// Starts as a copy of the declared types. PV buses that hit a reactive
/// limit are demoted here; the network model is never touched.
#[derive(Debug, Clone)]
pub struct BusTypes {
    effective: Vec<BusType>,
    demoted: Vec<usize>,
}

impl BusTypes {
    pub fn new(net: &NetworkModel) -> Self {
        Self {
            effective: net.buses().iter().map(|b| b.bus_type).collect(),
            demoted: Vec::new(),
        }
    }

    pub fn is_pv(&self, i: usize) -> bool {
        self.effective[i] == BusType::PV
    }

    /// Reclassifies PV bus `i` as PQ. Returns false if it was not PV.
    pub fn demote(&mut self, i: usize) -> bool {
        if self.effective[i] != BusType::PV {
            return false;
        }
        self.effective[i] = BusType::PQ;
        self.demoted.push(i);
        true
    }

    /// Internal indexes of demoted buses, in order of demotion.
    pub fn demoted(&self) -> &[usize] {
        &self.demoted
    }

    /// Effective PV and PQ index lists, both ascending.
    pub fn pv_pq(&self) -> (Vec<usize>, Vec<usize>) {
        let mut pv = Vec::new();
        let mut pq = Vec::new();
        for (i, t) in self.effective.iter().enumerate() {
            match t {
                BusType::PV => pv.push(i),
                BusType::PQ => pq.push(i),
                BusType::Slack => {}
            }
        }
        (pv, pq)
    }

    /// All non-slack indexes, ascending.
    pub fn non_slack(&self) -> Vec<usize> {
        self.effective
            .iter()
            .enumerate()
            .filter(|(_, &t)| t != BusType::Slack)
            .map(|(i, _)| i)
            .collect()
    }
}
