//! Driver signals: the scored inputs behind every market decision.
//!
//! A driver carries a nominal weight, an eligibility bit (were its raw inputs
//! present?), a directional signal in [-1, 1] and a derived contribution.
//! `contrib` is never stored independently of the other fields: every
//! constructor and transform re-derives it as `eligible ? signal * weight : 0`.

use serde::Serialize;

use crate::calculations::clamp_unit;

/// Data-completeness classification of the inputs behind a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataStatus {
    Ok,
    Partial,
    Missing,
}

impl DataStatus {
    /// Coverage credit for this completeness level
    pub fn coverage_credit(&self) -> f64 {
        match self {
            DataStatus::Ok => 1.0,
            DataStatus::Partial => 0.5,
            DataStatus::Missing => 0.0,
        }
    }
}

/// Sign applied to every driver once a market's direction is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Toward the market's default side
    Positive,
    /// Toward the opposite side
    Negative,
}

impl Direction {
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Positive => 1.0,
            Direction::Negative => -1.0,
        }
    }

    /// `Positive` for a non-negative net, `Negative` otherwise
    pub fn from_net(net: f64) -> Self {
        if net >= 0.0 {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }
}

/// Author-supplied description of a driver before `contrib` is derived
#[derive(Debug, Clone)]
pub struct DriverSpec {
    pub key: String,
    pub weight: f64,
    pub eligible: bool,
    pub signal: f64,
    pub status: DataStatus,
    pub note: String,
}

/// One scored input to a market decision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverSignal {
    #[serde(rename = "driverKey")]
    driver_key: String,
    weight: f64,
    eligible: bool,
    signal: f64,
    contrib: f64,
    status: DataStatus,
    note: String,
}

impl DriverSignal {
    /// Build a driver, deriving `contrib` from the other fields
    pub fn new(spec: DriverSpec) -> Self {
        Self::assemble(
            spec.key,
            spec.weight,
            spec.eligible,
            spec.signal,
            spec.status,
            spec.note,
        )
    }

    fn assemble(
        driver_key: String,
        weight: f64,
        eligible: bool,
        signal: f64,
        status: DataStatus,
        note: String,
    ) -> Self {
        let contrib = if eligible { signal * weight } else { 0.0 };
        Self {
            driver_key,
            weight,
            eligible,
            signal,
            contrib,
            status,
            note,
        }
    }

    pub fn key(&self) -> &str {
        &self.driver_key
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_eligible(&self) -> bool {
        self.eligible
    }

    pub fn signal(&self) -> f64 {
        self.signal
    }

    pub fn contrib(&self) -> f64 {
        self.contrib
    }

    pub fn status(&self) -> DataStatus {
        self.status
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    /// Copy with a new weight; `contrib` re-derived
    pub fn with_weight(&self, weight: f64) -> Self {
        Self::assemble(
            self.driver_key.clone(),
            weight,
            self.eligible,
            self.signal,
            self.status,
            self.note.clone(),
        )
    }

    /// Copy with a new signal; `contrib` re-derived
    pub fn with_signal(&self, signal: f64) -> Self {
        Self::assemble(
            self.driver_key.clone(),
            self.weight,
            self.eligible,
            signal,
            self.status,
            self.note.clone(),
        )
    }
}

/// Build a driver from its spec
pub fn build_driver(spec: DriverSpec) -> DriverSignal {
    DriverSignal::new(spec)
}

/// Re-sign a driver list for the chosen direction
///
/// Ineligible drivers get signal 0 (and therefore contrib 0). The input slice
/// is left untouched.
pub fn apply_direction(drivers: &[DriverSignal], direction: Direction) -> Vec<DriverSignal> {
    let sign = direction.sign();
    drivers
        .iter()
        .map(|d| {
            if d.is_eligible() {
                d.with_signal(d.signal() * sign)
            } else {
                d.with_signal(0.0)
            }
        })
        .collect()
}

/// `Ok` if every number is present, `Partial` if some are, `Missing` if none
pub fn status_from_numbers(values: &[Option<f64>]) -> DataStatus {
    let present = values.iter().filter(|v| v.is_some()).count();
    if present == 0 {
        DataStatus::Missing
    } else if present == values.len() {
        DataStatus::Ok
    } else {
        DataStatus::Partial
    }
}

/// `clamp((raw - center) / scale, -1, 1)`
pub fn scaled_signal(raw: f64, center: f64, scale: f64) -> f64 {
    if scale == 0.0 {
        return 0.0;
    }
    clamp_unit((raw - center) / scale)
}

/// Build a driver from an optional derived value
///
/// Eligible iff `value` is present; the signal is the scaled transform
/// (negated when `invert` is set) and completeness comes from `inputs`.
pub fn driver_from_value(
    key: &str,
    weight: f64,
    value: Option<f64>,
    transform: SignalTransform,
    inputs: &[Option<f64>],
    note: &str,
) -> DriverSignal {
    let signal = value
        .map(|v| transform.apply(v))
        .unwrap_or(0.0);
    build_driver(DriverSpec {
        key: key.to_string(),
        weight,
        eligible: value.is_some(),
        signal,
        status: status_from_numbers(inputs),
        note: note.to_string(),
    })
}

/// Linear transform of a raw stat into a signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalTransform {
    pub center: f64,
    pub scale: f64,
    /// Flip the sign (e.g. better goaltending pushes toward UNDER)
    pub invert: bool,
}

impl SignalTransform {
    pub const fn new(center: f64, scale: f64) -> Self {
        Self {
            center,
            scale,
            invert: false,
        }
    }

    pub const fn inverted(center: f64, scale: f64) -> Self {
        Self {
            center,
            scale,
            invert: true,
        }
    }

    pub fn apply(&self, raw: f64) -> f64 {
        let s = scaled_signal(raw, self.center, self.scale);
        if self.invert {
            -s
        } else {
            s
        }
    }
}
