// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use super::{model, two_bus};
use crate::debug::{format_polar_vec, format_ybus};
use crate::ybus::make_ybus;
use num_complex::Complex64;

#[test]
fn polar_vector() {
    let s = format_polar_vec(&[Complex64::new(1.0, 0.0), Complex64::new(0.0, 2.0)]);
    assert!(s.starts_with('['));
    assert!(s.ends_with(']'));
    assert_eq!(s.matches('\u{2220}').count(), 2);
    assert!(s.contains("90"));
}

#[test]
fn small_ybus_table() {
    let net = model(two_bus());
    let y_bus = make_ybus(&net);
    let s = format_ybus(&y_bus, &net, 10);

    let lines: Vec<&str> = s.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].trim_start().starts_with("1 "));
    assert!(lines[1].contains("+ j"));
    assert!(lines[2].contains("- j"));
}

#[test]
fn large_ybus_summarised() {
    let net = model(two_bus());
    let y_bus = make_ybus(&net);
    let s = format_ybus(&y_bus, &net, 1);
    assert!(s.contains("4 non-zeros"));
}
