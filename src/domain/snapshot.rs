//! Odds/stats snapshot for a single game.
//!
//! The snapshot provider hands over a handful of typed odds fields plus a
//! loosely-typed `raw_data` blob of team statistics. The blob may arrive as a
//! JSON object or as a JSON-encoded string; anything unparseable degrades to an
//! empty set of stats so every stat-derived driver simply becomes ineligible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::Sport;
use crate::error::Result;

/// Market odds and raw stats for one game at one point in time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OddsSnapshot {
    #[serde(default)]
    pub game_id: Option<String>,
    #[serde(default)]
    pub sport: Option<Sport>,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    #[serde(default)]
    pub commence_time: Option<DateTime<Utc>>,

    /// Posted game total
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub total_over_price: Option<f64>,
    #[serde(default)]
    pub total_under_price: Option<f64>,

    /// Home team spread (negative = home favored)
    #[serde(default)]
    pub spread_home: Option<f64>,
    #[serde(default)]
    pub spread_home_price: Option<f64>,
    #[serde(default)]
    pub spread_away_price: Option<f64>,

    /// Moneyline American odds
    #[serde(default)]
    pub h2h_home: Option<f64>,
    #[serde(default)]
    pub h2h_away: Option<f64>,

    #[serde(default)]
    pub raw_data: RawStats,
}

impl OddsSnapshot {
    /// Strictly parse a snapshot document
    ///
    /// Only the outer document must be valid JSON; `raw_data` stays lenient.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Team names, falling back to generic labels
    pub fn matchup(&self) -> Matchup {
        Matchup {
            home: self.home_team.clone().unwrap_or_else(|| "Home".to_string()),
            away: self.away_team.clone().unwrap_or_else(|| "Away".to_string()),
        }
    }
}

/// Display names for both teams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub home: String,
    pub away: String,
}

impl Default for Matchup {
    fn default() -> Self {
        Self {
            home: "Home".to_string(),
            away: "Away".to_string(),
        }
    }
}

/// Loosely-typed team statistics
///
/// Lookups accept dotted paths (`home.goals_for_pg`) and numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawStats(Map<String, Value>);

impl RawStats {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Build from any JSON value: objects are kept, JSON strings are parsed,
    /// everything else becomes empty.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            Value::String(text) => Self::parse(&text),
            Value::Null => Self::default(),
            other => {
                warn!("raw_data has unexpected type ({}), ignoring", type_name(&other));
                Self::default()
            }
        }
    }

    /// Parse a JSON-encoded stats blob, degrading to empty on any failure
    pub fn parse(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Self(map),
            Ok(other) => {
                warn!("raw_data string decoded to {}, ignoring", type_name(&other));
                Self::default()
            }
            Err(e) => {
                warn!("raw_data is not valid JSON ({}), treating as empty", e);
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn lookup(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.0.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Finite number at `path`, accepting numeric strings
    pub fn number(&self, path: &str) -> Option<f64> {
        let value = match self.lookup(path)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        value.is_finite().then_some(value)
    }

    /// Boolean at `path`, accepting "true"/"false" and 1/0
    pub fn flag(&self, path: &str) -> Option<bool> {
        match self.lookup(path)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            Value::Number(n) => n.as_f64().map(|v| v != 0.0),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for RawStats {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(RawStats::from_value(value))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_data_as_object() {
        let snap: OddsSnapshot = serde_json::from_value(json!({
            "total": 6.5,
            "raw_data": { "home_pace": 101.2, "home": { "rest_days": "2" } }
        }))
        .unwrap();

        assert_eq!(snap.total, Some(6.5));
        assert_eq!(snap.raw_data.number("home_pace"), Some(101.2));
        assert_eq!(snap.raw_data.number("home.rest_days"), Some(2.0));
    }

    #[test]
    fn test_raw_data_as_json_string() {
        let snap: OddsSnapshot = serde_json::from_value(json!({
            "raw_data": "{\"away_pace\": 97.5}"
        }))
        .unwrap();
        assert_eq!(snap.raw_data.number("away_pace"), Some(97.5));
    }

    #[test]
    fn test_invalid_raw_data_degrades_to_empty() {
        let snap: OddsSnapshot = serde_json::from_value(json!({
            "spread_home": -1.5,
            "raw_data": "{invalid json"
        }))
        .unwrap();
        assert!(snap.raw_data.is_empty());
        assert_eq!(snap.spread_home, Some(-1.5));

        let arr: OddsSnapshot = serde_json::from_value(json!({ "raw_data": [1, 2] })).unwrap();
        assert!(arr.raw_data.is_empty());
    }

    #[test]
    fn test_number_rejects_non_numeric() {
        let stats = RawStats::from_value(json!({
            "a": "n/a",
            "b": null,
            "c": true,
            "d": " 0.912 "
        }));
        assert_eq!(stats.number("a"), None);
        assert_eq!(stats.number("b"), None);
        assert_eq!(stats.number("c"), None);
        assert_eq!(stats.number("d"), Some(0.912));
        assert_eq!(stats.number("missing"), None);
        assert_eq!(stats.number("d.deeper"), None);
    }

    #[test]
    fn test_flag_parsing() {
        let stats = RawStats::from_value(json!({
            "a": false,
            "b": "TRUE",
            "c": 0,
            "d": "maybe"
        }));
        assert_eq!(stats.flag("a"), Some(false));
        assert_eq!(stats.flag("b"), Some(true));
        assert_eq!(stats.flag("c"), Some(false));
        assert_eq!(stats.flag("d"), None);
    }

    #[test]
    fn test_strict_outer_parse() {
        assert!(OddsSnapshot::from_json("{not json").is_err());
        let snap = OddsSnapshot::from_json(r#"{"h2h_home": -150, "h2h_away": 130}"#).unwrap();
        assert_eq!(snap.h2h_home, Some(-150.0));
        assert_eq!(snap.matchup(), Matchup::default());
    }
}
