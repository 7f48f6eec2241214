//! Sport-specific decision sets: raw stats to driver lists, penalties, risk
//! flags and resolvers for each market a league offers.

pub mod calibration;
pub mod nba;
pub mod nhl;
pub mod projection;
pub mod resolvers;

pub use calibration::{NbaCalibration, NhlCalibration};
pub use nba::compute_nba_market_decisions;
pub use nhl::compute_nhl_market_decisions;
pub use projection::{project_nba, project_nhl, Projection};

fn delta(home: Option<f64>, away: Option<f64>) -> Option<f64> {
    Some(home? - away?)
}

/// Smaller of the present values
fn min_present(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn on_key_number(value: f64, keys: &[f64]) -> bool {
    keys.iter().any(|k| (value - k).abs() < 1e-9)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_requires_both() {
        assert_eq!(delta(Some(3.0), Some(1.0)), Some(2.0));
        assert_eq!(delta(Some(3.0), None), None);
    }

    #[test]
    fn test_min_present() {
        assert_eq!(min_present(Some(2.0), Some(0.0)), Some(0.0));
        assert_eq!(min_present(None, Some(1.0)), Some(1.0));
        assert_eq!(min_present(None, None), None);
    }

    #[test]
    fn test_on_key_number() {
        assert!(on_key_number(6.0, &[5.5, 6.0]));
        assert!(!on_key_number(6.5, &[5.5, 6.0]));
    }
}
