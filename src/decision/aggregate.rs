//! Aggregate metrics over a driver list: renormalized weights, net signal,
//! conflict and coverage.

use super::driver::DriverSignal;
use crate::calculations::round3;

/// Signals inside (-DEAD_ZONE, DEAD_ZONE) count toward neither conflict bucket
pub const CONFLICT_DEAD_ZONE: f64 = 0.10;

fn eligible_weight(drivers: &[DriverSignal]) -> f64 {
    drivers
        .iter()
        .filter(|d| d.is_eligible())
        .map(|d| d.weight())
        .sum()
}

/// Rescale eligible weights so they sum to 1
///
/// With no eligible weight the list is returned unchanged; the net of such a
/// list is 0 and the market falls to PASS downstream.
pub fn renormalize_driver_weights(drivers: &[DriverSignal]) -> Vec<DriverSignal> {
    let total_weight = eligible_weight(drivers);
    if total_weight <= 0.0 {
        return drivers.to_vec();
    }
    drivers
        .iter()
        .map(|d| {
            if d.is_eligible() {
                d.with_weight(d.weight() / total_weight)
            } else {
                d.clone()
            }
        })
        .collect()
}

/// Sum of eligible contributions, rounded to 3 decimals
pub fn compute_net(drivers: &[DriverSignal]) -> f64 {
    let sum: f64 = drivers
        .iter()
        .filter(|d| d.is_eligible())
        .map(|d| d.contrib())
        .sum();
    round3(sum)
}

/// Opposing-signal mass: `min(support weight, oppose weight)`
pub fn compute_conflict(drivers: &[DriverSignal]) -> f64 {
    let mut support = 0.0;
    let mut oppose = 0.0;
    for d in drivers.iter().filter(|d| d.is_eligible()) {
        if d.signal() > CONFLICT_DEAD_ZONE {
            support += d.weight();
        } else if d.signal() < -CONFLICT_DEAD_ZONE {
            oppose += d.weight();
        }
    }
    f64::min(support, oppose)
}

/// Completeness-weighted share of eligible weight, rounded to 3 decimals
pub fn compute_coverage(drivers: &[DriverSignal]) -> f64 {
    let total_weight = eligible_weight(drivers);
    if total_weight <= 0.0 {
        return 0.0;
    }
    let credited: f64 = drivers
        .iter()
        .filter(|d| d.is_eligible())
        .map(|d| d.weight() * d.status().coverage_credit())
        .sum();
    round3(credited / total_weight)
}
