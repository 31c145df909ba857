// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

mod math;

mod bus_types;
mod cancel;
mod error;
mod gauss;
mod jac;
mod loadcase;
mod network;
mod newton;
mod pf;
mod pfopt;
mod pfsoln;
mod printpf;
mod qlim;
mod sbus;
mod tracker;
mod ybus;

pub mod debug;

#[cfg(test)]
mod tests;

pub use bus_types::*;
pub use cancel::*;
pub use error::*;
pub use gauss::*;
pub use jac::*;
pub use loadcase::*;
pub use math::*;
pub use network::*;
pub use newton::*;
pub use pf::*;
pub use pfopt::*;
pub use pfsoln::*;
pub use printpf::*;
pub use qlim::*;
pub use sbus::*;
pub use tracker::*;
pub use ybus::*;
