// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::network::NetworkModel;
use crate::ybus::YBus;
use num_complex::Complex64;
use pretty_dtoa::{dtoa, FmtFloatConfig};

const FLOAT_CONFIG: FmtFloatConfig = FmtFloatConfig::default()
    .add_point_zero(false)
    .max_significant_digits(9);

const FIXED_CONFIG: FmtFloatConfig = FmtFloatConfig::default()
    .add_point_zero(true)
    .max_decimal_digits(4)
    .min_decimal_digits(4);

/// Four decimal places, for tables.
pub fn format_fixed(f: f64) -> String {
    dtoa(f, FIXED_CONFIG)
}

fn format_vec<T>(v: &[T], f: impl Fn(&T) -> String) -> String {
    let a: Vec<String> = v.iter().map(f).collect();
    format!("[{}]", a.join(", "))
}

pub fn format_f64_vec(v: &[f64]) -> String {
    format_vec(v, |f| dtoa(*f, FLOAT_CONFIG))
}

/// Rectangular form, `re±jim`.
pub fn format_complex(z: &Complex64) -> String {
    format!(
        "{}{}j{}",
        dtoa(z.re, FLOAT_CONFIG),
        if z.im.is_sign_negative() { "-" } else { "+" },
        dtoa(z.im.abs(), FLOAT_CONFIG)
    )
}

pub fn format_rect_vec(v: &[Complex64]) -> String {
    format_vec(v, format_complex)
}

pub fn format_polar(z: &Complex64) -> String {
    format!(
        "{}\u{2220}{}\u{00B0}",
        dtoa(z.norm(), FLOAT_CONFIG),
        dtoa(z.arg().to_degrees(), FLOAT_CONFIG)
    )
}

/// Magnitude and angle in degrees, e.g. `[1∠0°, 0.97∠-2.9°]`.
pub fn format_polar_vec(v: &[Complex64]) -> String {
    format_vec(v, format_polar)
}

/// Dense rectangular-form table of the admittance matrix, one row per
/// line. Networks larger than `max_buses` are summarised instead.
pub fn format_ybus(y_bus: &YBus, net: &NetworkModel, max_buses: usize) -> String {
    let n = y_bus.n();
    if n > max_buses {
        return format!(
            "Ybus: {} x {} with {} non-zeros (too large to display)",
            n,
            n,
            y_bus.nnz()
        );
    }
    let ids = net.bus_ids();
    let mut s = String::from("Ybus (rectangular form):\n");
    for (i, row) in y_bus.to_dense().iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(|y| {
                format!(
                    "{} {} j{}",
                    format_fixed(y.re),
                    if y.im.is_sign_negative() { "-" } else { "+" },
                    format_fixed(y.im.abs())
                )
            })
            .collect();
        s.push_str(&format!("{:>5}  {}\n", ids[i], cells.join("\t")));
    }
    s
}
