//! The synthetic compute block workers spin on. It has no meaningful output;
//! its only job is to keep the floating-point units busy.

use std::hint::black_box;

/// Rounds of the transcendental update applied per call to [`burn`].
pub const ROUNDS: usize = 10_000;

/// Runs one pass of the compute block: seed a value at 1.0, then fold
/// `sin(v) * tan(v) + sqrt(v)` over it [`ROUNDS`] times.
///
/// The value can wander negative, at which point `sqrt` produces NaN and the
/// update keeps folding NaN forward. That is fine — the caller only cares
/// that the cycles were spent, not what came out.
///
/// Both the seed and the result pass through [`black_box`] so the optimizer
/// cannot prove the loop dead and delete it.
pub fn burn() -> f64 {
    let mut value = black_box(1.0_f64);
    for _ in 0..ROUNDS {
        value = value.sin() * value.tan() + value.sqrt();
    }
    black_box(value)
}
