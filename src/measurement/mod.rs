//! The measurement extend primitive: `new = SHA-384(old || measurement)`.
//!
//! Callers thread the accumulator themselves; nothing is retained between calls. Extension
//! does not commute, so measurements must be folded in the order they were taken.

pub mod boot;

use crate::types::MeasurementRegister;
use crate::utils::hash::{sha384sum, sha384sum_parts};

/// SHA-384 digest of a single measured artifact.
pub fn digest(data: &[u8]) -> MeasurementRegister {
    MeasurementRegister(sha384sum(data))
}

/// Folds `measurement` into `accumulator`.
pub fn extend(
    accumulator: &MeasurementRegister,
    measurement: &MeasurementRegister,
) -> MeasurementRegister {
    MeasurementRegister(sha384sum_parts(&[&accumulator.0[..], &measurement.0[..]]))
}

/// Extends a zeroed register with every measurement, in order.
pub fn replay<'a>(
    measurements: impl IntoIterator<Item = &'a MeasurementRegister>,
) -> MeasurementRegister {
    measurements
        .into_iter()
        .fold(MeasurementRegister::ZERO, |acc, m| extend(&acc, m))
}
