// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::network::Bus;
use crate::qlim::{check_q_limits, clamped_injection, QLimit};

#[test]
fn limits_apply_to_generator_output() {
    let bus = Bus::pv(2, 1.0, 0.5)
        .with_load(0.1, 0.3)
        .with_q_limits(Some(-0.2), Some(0.4));

    // injection 0.05 means 0.35 from the generator
    assert_eq!(check_q_limits(&bus, 0.05), None);
    assert_eq!(check_q_limits(&bus, 0.15), Some(QLimit::Upper(0.4)));
    assert_eq!(check_q_limits(&bus, -0.6), Some(QLimit::Lower(-0.2)));

    assert!((clamped_injection(&bus, QLimit::Upper(0.4)) - 0.1).abs() < 1e-12);
    assert!((clamped_injection(&bus, QLimit::Lower(-0.2)) + 0.5).abs() < 1e-12);
}

#[test]
fn missing_limit_is_unbounded() {
    let bus = Bus::pv(2, 1.0, 0.5).with_q_limits(None, Some(1.0));
    assert_eq!(check_q_limits(&bus, -100.0), None);
    assert_eq!(check_q_limits(&bus, 1.5), Some(QLimit::Upper(1.0)));

    let bus = Bus::pv(2, 1.0, 0.5);
    assert!(!bus.has_q_limits());
    assert_eq!(check_q_limits(&bus, 1e6), None);
}
