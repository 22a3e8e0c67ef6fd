//! Money rounding.

/// Round an amount to 2 decimal places, ties away from zero.
///
/// Every allocated share of a shared cost is rounded independently with this
/// function. The residue between a nominal shared total and the sum of its
/// rounded shares is not redistributed.
#[must_use]
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
