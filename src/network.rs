// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::error::{ValidationError, Violation};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::convert::TryFrom;

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
pub enum BusType {
    /// Reference voltage angle and magnitude. Slack active and reactive power.
    Slack = 1,
    /// Fixed voltage magnitude and active power.
    PV = 2,
    /// Fixed active and reactive power.
    PQ = 3,
}

impl TryFrom<u8> for BusType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(BusType::Slack),
            2 => Ok(BusType::PV),
            3 => Ok(BusType::PQ),
            _ => Err(format!("unknown bus type code {} (1=Slack, 2=PV, 3=PQ)", code)),
        }
    }
}

/// Bus is a node in the network with its voltage and power injection data.
/// All powers are per unit, generation positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    /// Bus number.
    pub id: usize,

    #[serde(rename = "type")]
    pub bus_type: BusType,

    /// Voltage magnitude (p.u.). Set-point for Slack and PV buses.
    pub vm: f64,

    /// Voltage angle (degrees). Only fixed for the Slack bus.
    #[serde(default)]
    pub va: f64,

    /// Real power generation (p.u.).
    #[serde(default)]
    pub pg: f64,

    /// Reactive power generation (p.u.).
    #[serde(default)]
    pub qg: f64,

    /// Real power load (p.u.).
    #[serde(default)]
    pub pl: f64,

    /// Reactive power load (p.u.).
    #[serde(default)]
    pub ql: f64,

    /// Minimum reactive power output of the generator (p.u.).
    #[serde(default)]
    pub qmin: Option<f64>,

    /// Maximum reactive power output of the generator (p.u.).
    #[serde(default)]
    pub qmax: Option<f64>,
}

impl Bus {
    pub fn new(id: usize, bus_type: BusType, vm: f64, va: f64) -> Self {
        Self {
            id,
            bus_type,
            vm,
            va,
            pg: 0.0,
            qg: 0.0,
            pl: 0.0,
            ql: 0.0,
            qmin: None,
            qmax: None,
        }
    }

    pub fn slack(id: usize, vm: f64, va: f64) -> Self {
        Self::new(id, BusType::Slack, vm, va)
    }

    pub fn pv(id: usize, vm: f64, pg: f64) -> Self {
        Self {
            pg,
            ..Self::new(id, BusType::PV, vm, 0.0)
        }
    }

    pub fn pq(id: usize, pl: f64, ql: f64) -> Self {
        Self {
            pl,
            ql,
            ..Self::new(id, BusType::PQ, 1.0, 0.0)
        }
    }

    pub fn with_load(mut self, pl: f64, ql: f64) -> Self {
        self.pl = pl;
        self.ql = ql;
        self
    }

    pub fn with_q_limits(mut self, qmin: Option<f64>, qmax: Option<f64>) -> Self {
        self.qmin = qmin;
        self.qmax = qmax;
        self
    }

    pub fn is_slack(&self) -> bool {
        self.bus_type == BusType::Slack
    }
    pub fn is_pv(&self) -> bool {
        self.bus_type == BusType::PV
    }
    pub fn is_pq(&self) -> bool {
        self.bus_type == BusType::PQ
    }

    /// Specified net complex injection, generation minus load.
    pub fn s_spec(&self) -> Complex64 {
        Complex64::new(self.pg - self.pl, self.qg - self.ql)
    }

    /// Load as a complex quantity.
    pub fn s_load(&self) -> Complex64 {
        Complex64::new(self.pl, self.ql)
    }

    /// True if either reactive limit is set.
    pub fn has_q_limits(&self) -> bool {
        self.qmin.is_some() || self.qmax.is_some()
    }
}

/// Branch is a transmission line modelled as a nominal-pi section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// "From" bus number.
    pub from: usize,

    /// "To" bus number.
    pub to: usize,

    /// Series resistance (p.u.).
    pub r: f64,

    /// Series reactance (p.u.).
    pub x: f64,

    /// Total line charging susceptance (p.u.).
    #[serde(default)]
    pub b: f64,
}

impl Branch {
    pub fn new(from: usize, to: usize, r: f64, x: f64, b: f64) -> Self {
        Self { from, to, r, x, b }
    }

    /// Series admittance.
    pub fn y_s(&self) -> Complex64 {
        Complex64::new(1.0, 0.0) / Complex64::new(self.r, self.x)
    }
}

/// A validated network. Immutable once constructed.
///
/// Buses are kept in ascending id order and the internal index of a bus is
/// its position in `buses()`. Branch endpoints are resolved to internal
/// indexes at construction.
#[derive(Debug, Clone)]
pub struct NetworkModel {
    buses: Vec<Bus>,
    branches: Vec<Branch>,
    index: HashMap<usize, usize>,
    ends: Vec<(usize, usize)>,
    slack: usize,
}

impl NetworkModel {
    /// Validates the case and builds the model. All violations are
    /// collected before returning.
    pub fn new(mut buses: Vec<Bus>, branches: Vec<Branch>) -> Result<Self, ValidationError> {
        let mut violations = Vec::new();

        let mut seen = HashSet::new();
        for b in buses.iter() {
            if b.id == 0 {
                violations.push(Violation::NonPositiveBusId(b.id));
            }
            if !seen.insert(b.id) {
                violations.push(Violation::DuplicateBusId(b.id));
            }
            check_bus(b, &mut violations);
        }

        let slack_ids: Vec<usize> = buses.iter().filter(|b| b.is_slack()).map(|b| b.id).collect();
        match slack_ids.len() {
            0 => violations.push(Violation::NoSlackBus),
            1 => {}
            _ => violations.push(Violation::MultipleSlackBuses { ids: slack_ids }),
        }

        for (i, br) in branches.iter().enumerate() {
            for bus in [br.from, br.to] {
                if !seen.contains(&bus) {
                    violations.push(Violation::DanglingBranchEndpoint { branch: i, bus });
                }
            }
            if br.from == br.to {
                violations.push(Violation::SelfLoop {
                    branch: i,
                    bus: br.from,
                });
            }
            check_branch(i, br, &mut violations);
        }

        if !violations.is_empty() {
            return Err(ValidationError(violations));
        }

        buses.sort_by_key(|b| b.id);
        let index: HashMap<usize, usize> =
            buses.iter().enumerate().map(|(i, b)| (b.id, i)).collect();
        let ends = branches
            .iter()
            .map(|br| (index[&br.from], index[&br.to]))
            .collect();
        let slack = buses.iter().position(|b| b.is_slack()).unwrap_or_default();

        log::debug!(
            "network model: {} buses, {} branches, slack bus {}",
            buses.len(),
            branches.len(),
            buses[slack].id
        );

        Ok(Self {
            buses,
            branches,
            index,
            ends,
            slack,
        })
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn n_bus(&self) -> usize {
        self.buses.len()
    }

    pub fn n_branch(&self) -> usize {
        self.branches.len()
    }

    /// Internal index of the bus with the given id.
    pub fn bus_index(&self, id: usize) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn bus(&self, id: usize) -> Option<&Bus> {
        self.bus_index(id).map(|i| &self.buses[i])
    }

    /// Internal (from, to) indexes of branch `l`.
    pub fn branch_ends(&self, l: usize) -> (usize, usize) {
        self.ends[l]
    }

    /// Internal index of the slack bus.
    pub fn slack(&self) -> usize {
        self.slack
    }

    /// Bus ids in internal order.
    pub fn bus_ids(&self) -> Vec<usize> {
        self.buses.iter().map(|b| b.id).collect()
    }
}

fn check_finite(what: impl Fn() -> String, v: f64, violations: &mut Vec<Violation>) {
    if !v.is_finite() {
        violations.push(Violation::NonFinite { what: what() });
    }
}

fn check_bus(b: &Bus, violations: &mut Vec<Violation>) {
    let fields = [
        ("vm", b.vm),
        ("va", b.va),
        ("pg", b.pg),
        ("qg", b.qg),
        ("pl", b.pl),
        ("ql", b.ql),
    ];
    for (name, v) in fields {
        check_finite(|| format!("bus {} {}", b.id, name), v, violations);
    }
    if !b.is_pq() && b.vm.is_finite() && b.vm <= 0.0 {
        violations.push(Violation::NonPositiveSetPoint { bus: b.id, vm: b.vm });
    }
    for (name, q) in [("qmin", b.qmin), ("qmax", b.qmax)] {
        if let Some(q) = q {
            // infinite limits are allowed, NaN is not
            if q.is_nan() {
                violations.push(Violation::NonFinite {
                    what: format!("bus {} {}", b.id, name),
                });
            }
        }
    }
    if let (Some(qmin), Some(qmax)) = (b.qmin, b.qmax) {
        if qmin > qmax {
            violations.push(Violation::InvalidQLimits {
                bus: b.id,
                qmin,
                qmax,
            });
        }
    }
}

fn check_branch(i: usize, br: &Branch, violations: &mut Vec<Violation>) {
    for (name, v) in [("r", br.r), ("x", br.x), ("b", br.b)] {
        check_finite(|| format!("branch {} {}", i, name), v, violations);
    }
    if br.x == 0.0 {
        violations.push(Violation::ZeroReactance { branch: i, r: br.r });
    }
    if br.r < 0.0 {
        violations.push(Violation::NegativeResistance { branch: i, r: br.r });
    }
    if br.b < 0.0 {
        violations.push(Violation::NegativeCharging { branch: i, b: br.b });
    }
}
