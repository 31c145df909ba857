// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use std::fmt;
use thiserror::Error;

/// A single problem found while validating a case or solver options.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("bus id {0} is not a positive integer")]
    NonPositiveBusId(usize),

    #[error("bus id {0} is defined more than once")]
    DuplicateBusId(usize),

    #[error("case has no slack bus")]
    NoSlackBus,

    #[error("case has {} slack buses (ids {ids:?}), exactly one is required", .ids.len())]
    MultipleSlackBuses { ids: Vec<usize> },

    #[error("branch {branch} references unknown bus {bus}")]
    DanglingBranchEndpoint { branch: usize, bus: usize },

    #[error("branch {branch} connects bus {bus} to itself")]
    SelfLoop { branch: usize, bus: usize },

    #[error("branch {branch} has zero reactance (r = {r}, x = 0)")]
    ZeroReactance { branch: usize, r: f64 },

    #[error("branch {branch} has negative resistance {r}")]
    NegativeResistance { branch: usize, r: f64 },

    #[error("branch {branch} has negative line charging {b}")]
    NegativeCharging { branch: usize, b: f64 },

    #[error("bus {bus} has Qmin {qmin} greater than Qmax {qmax}")]
    InvalidQLimits { bus: usize, qmin: f64, qmax: f64 },

    #[error("bus {bus} has non-positive voltage set-point {vm}")]
    NonPositiveSetPoint { bus: usize, vm: f64 },

    #[error("{what} is not finite")]
    NonFinite { what: String },

    #[error("invalid option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}

/// Every violation found in one pass over the input.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError(pub Vec<Violation>);

impl ValidationError {
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.0.len())?;
        for v in &self.0 {
            write!(f, "\n  - {}", v)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Fatal numerical failure during a solve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericalError {
    #[error("singular Jacobian at iteration {iteration}: {reason}")]
    SingularJacobian { iteration: usize, reason: String },

    #[error("non-finite Newton step at iteration {iteration}")]
    NonFiniteStep { iteration: usize },

    #[error("zero diagonal admittance at bus {bus}")]
    ZeroDiagonal { bus: usize },
}

#[derive(Debug, Error)]
pub enum PowerFlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Numerical(#[from] NumericalError),
}

impl PowerFlowError {
    pub fn is_validation(&self) -> bool {
        matches!(self, PowerFlowError::Validation(_))
    }

    pub fn is_numerical(&self) -> bool {
        matches!(self, PowerFlowError::Numerical(_))
    }
}
