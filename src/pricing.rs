//! Odds conversion and edge math.
//!
//! American odds throughout: `+150` pays 150 on 100, `-150` risks 150 to win
//! 100. Probabilities are plain `f64` in (0, 1).

use serde::{Deserialize, Serialize};

use crate::calculations::{round3, round_to};
use crate::domain::{DecisionStatus, Market, OddsSnapshot, Side};
use crate::sports::Projection;

pub use crate::calculations::normal_cdf;

/// Price assumed for a side whose odds are not quoted
pub const STANDARD_JUICE: f64 = -110.0;

/// Implied probability of an American price
pub fn odds_to_probability(american: f64) -> Option<f64> {
    if !american.is_finite() || american == 0.0 {
        return None;
    }
    if american > 0.0 {
        Some(100.0 / (american + 100.0))
    } else {
        let risk = american.abs();
        Some(risk / (risk + 100.0))
    }
}

/// Fair American price for a probability, rounded to whole odds
pub fn probability_to_american(probability: f64) -> Option<f64> {
    if !probability.is_finite() || probability <= 0.0 || probability >= 1.0 {
        return None;
    }
    let odds = if probability >= 0.5 {
        -(probability / (1.0 - probability)) * 100.0
    } else {
        ((1.0 - probability) / probability) * 100.0
    };
    Some(odds.round())
}

/// Strip the bookmaker margin from a two-way market
pub fn no_vig_probabilities(home: f64, away: f64) -> Option<(f64, f64)> {
    let home_implied = odds_to_probability(home)?;
    let away_implied = odds_to_probability(away)?;
    let overround = home_implied + away_implied;
    if overround <= 0.0 {
        return None;
    }
    Some((home_implied / overround, away_implied / overround))
}

/// Probability that a normally-distributed result lands above zero
///
/// A non-positive sigma degrades to a step function.
pub fn margin_to_win_probability(margin: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 || !sigma.is_finite() {
        return if margin > 0.0 {
            1.0
        } else if margin < 0.0 {
            0.0
        } else {
            0.5
        };
    }
    normal_cdf(margin / sigma)
}

/// Projected total minus the posted line (positive favors OVER)
pub fn calculate_total_edge(projected_total: f64, line: f64) -> Option<f64> {
    let edge = projected_total - line;
    edge.is_finite().then(|| round_to(edge, 2))
}

/// Projected home cover margin (positive favors HOME)
///
/// `spread_home` is the home handicap, so a -1.5 home favorite must win by
/// two to cover.
pub fn calculate_spread_edge(projected_margin: f64, spread_home: f64) -> Option<f64> {
    let edge = projected_margin + spread_home;
    edge.is_finite().then(|| round_to(edge, 2))
}

/// Model home win probability minus the market's
///
/// The market probability is de-vigged when both prices are known and the raw
/// implied probability otherwise.
pub fn calculate_moneyline_edge(
    model_home_prob: f64,
    h2h_home: f64,
    h2h_away: Option<f64>,
) -> Option<f64> {
    let market_home = match h2h_away.and_then(|away| no_vig_probabilities(h2h_home, away)) {
        Some((home, _)) => home,
        None => odds_to_probability(h2h_home)?,
    };
    let edge = model_home_prob - market_home;
    edge.is_finite().then(|| round3(edge))
}

/// Tuning for single-market recommendations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationParams {
    /// Standard deviation of the game total around the projection
    pub total_sigma: f64,
    /// Standard deviation of the final margin around the projection
    pub margin_sigma: f64,
    /// Probability edge for FIRE
    pub fire_edge: f64,
    /// Probability edge for WATCH
    pub watch_edge: f64,
    /// Projections below this confidence never rise above PASS
    pub min_confidence: f64,
}

impl RecommendationParams {
    pub fn nhl() -> Self {
        Self {
            total_sigma: 2.2,
            margin_sigma: 2.4,
            fire_edge: 0.06,
            watch_edge: 0.03,
            min_confidence: 0.5,
        }
    }

    pub fn nba() -> Self {
        Self {
            total_sigma: 18.0,
            margin_sigma: 12.0,
            fire_edge: 0.05,
            watch_edge: 0.025,
            min_confidence: 0.5,
        }
    }

    fn status_for(&self, edge: f64, confidence: f64) -> DecisionStatus {
        if confidence < self.min_confidence {
            DecisionStatus::Pass
        } else if edge >= self.fire_edge {
            DecisionStatus::Fire
        } else if edge >= self.watch_edge {
            DecisionStatus::Watch
        } else {
            DecisionStatus::Pass
        }
    }
}

/// Single-market pick derived straight from a projection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub market: Market,
    pub side: Side,
    pub line: Option<f64>,
    pub price: Option<f64>,
    /// Model probability minus the price's implied probability
    pub edge: f64,
    /// Projection minus line, in goals or points
    pub point_edge: Option<f64>,
    pub win_probability: f64,
    pub fair_price: Option<f64>,
    pub confidence: f64,
    pub status: DecisionStatus,
}

/// Build a single-market recommendation from a projection
///
/// Returns `None` when the snapshot lacks the market's line or odds.
pub fn build_recommendation_from_prediction(
    market: Market,
    projection: &Projection,
    snapshot: &OddsSnapshot,
    params: &RecommendationParams,
) -> Option<Recommendation> {
    let (side, line, price, point_edge, win_probability, implied) = match market {
        Market::Total => {
            let line = snapshot.total?;
            let point_edge = calculate_total_edge(projection.total(), line)?;
            let p_over = margin_to_win_probability(projection.total() - line, params.total_sigma);
            let (side, prob, quoted) = if point_edge >= 0.0 {
                (Side::Over, p_over, snapshot.total_over_price)
            } else {
                (Side::Under, 1.0 - p_over, snapshot.total_under_price)
            };
            let implied = odds_to_probability(quoted.unwrap_or(STANDARD_JUICE))?;
            (side, Some(line), quoted, Some(point_edge), prob, implied)
        }
        Market::Spread => {
            let spread_home = snapshot.spread_home?;
            let point_edge = calculate_spread_edge(projection.margin(), spread_home)?;
            let p_home = margin_to_win_probability(
                projection.margin() + spread_home,
                params.margin_sigma,
            );
            let (side, line, prob, quoted) = if point_edge >= 0.0 {
                (Side::Home, spread_home, p_home, snapshot.spread_home_price)
            } else {
                (Side::Away, -spread_home, 1.0 - p_home, snapshot.spread_away_price)
            };
            let implied = odds_to_probability(quoted.unwrap_or(STANDARD_JUICE))?;
            (side, Some(line + 0.0), quoted, Some(point_edge), prob, implied)
        }
        Market::Ml => {
            let h2h_home = snapshot.h2h_home?;
            let p_home = margin_to_win_probability(projection.margin(), params.margin_sigma);
            let home_edge = calculate_moneyline_edge(p_home, h2h_home, snapshot.h2h_away)?;
            let implied_home = p_home - home_edge;
            if home_edge >= 0.0 {
                (Side::Home, None, Some(h2h_home), None, p_home, implied_home)
            } else {
                (Side::Away, None, snapshot.h2h_away, None, 1.0 - p_home, 1.0 - implied_home)
            }
        }
    };

    let edge = round3(win_probability - implied);
    let confidence = projection.confidence;

    Some(Recommendation {
        market,
        side,
        line,
        price,
        edge,
        point_edge,
        win_probability: round3(win_probability),
        fair_price: probability_to_american(win_probability),
        confidence,
        status: params.status_for(edge, confidence),
    })
}
