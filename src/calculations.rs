//! Centralized numeric helpers
//!
//! Rounding, clamping and the normal CDF shared by the driver math, the sport
//! decision sets and the pricing utilities.

/// Round half up to `places` decimals (`floor(x * 10^places + 0.5) / 10^places`)
///
/// Negative halves round toward zero: -0.0005 becomes 0.0.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    let rounded = (value * factor + 0.5).floor() / factor;
    // Collapse -0.0
    rounded + 0.0
}

/// Round to 3 decimals (scores, net, coverage)
pub fn round3(value: f64) -> f64 {
    round_to(value, 3)
}

/// Clamp into the signal range [-1, 1]
pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(-1.0, 1.0)
}

/// Mean of the values that are present, `None` if none are
pub fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// Standard normal CDF (Abramowitz & Stegun 7.1.26, |error| < 1.5e-7)
pub fn normal_cdf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let z = x.abs() / std::f64::consts::SQRT_2;

    let t = 1.0 / (1.0 + p * z);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-z * z).exp();

    0.5 * (1.0 + sign * y)
}
