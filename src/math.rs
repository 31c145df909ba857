// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use num_complex::Complex64;
use num_traits::Float;

pub const J: Complex64 = Complex64 { re: 0.0, im: 1.0 };

#[macro_export]
macro_rules! cmplx {
    () => {
        num_complex::Complex64::new(0.0, 0.0)
    };
    ($arg1:expr) => {
        num_complex::Complex64::new($arg1, 0.0)
    };
    ($arg1:expr, $arg2:expr) => {
        num_complex::Complex64::new($arg1, $arg2)
    };
}

/// Computes the infinity norm: `max(abs(a))`.
///
/// Returns zero for an empty slice.
pub fn norm_inf<F: Float>(a: &[F]) -> F {
    a.iter().fold(F::zero(), |max, v| {
        let abs = v.abs();
        if abs > max || abs.is_nan() {
            abs
        } else {
            max
        }
    })
}

/// Root-mean-square of `a`, zero for an empty slice.
pub fn rms<F: Float>(a: &[F]) -> F {
    if a.is_empty() {
        return F::zero();
    }
    let n = F::from(a.len()).unwrap_or_else(F::one);
    let sqsum = a.iter().fold(F::zero(), |s, &v| s + v * v);
    (sqsum / n).sqrt()
}

/// Returns true if both parts of every element are finite.
pub fn all_finite(v: &[Complex64]) -> bool {
    v.iter().all(|z| z.re.is_finite() && z.im.is_finite())
}

/// Rescales `z` to magnitude `vm` keeping its angle.
pub fn with_magnitude(z: Complex64, vm: f64) -> Complex64 {
    let norm = z.norm();
    if norm > 0.0 {
        z * (vm / norm)
    } else {
        cmplx!(vm)
    }
}
