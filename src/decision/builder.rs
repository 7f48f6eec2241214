//! Per-market decision builder.
//!
//! Takes a raw (un-normalized, un-directed) driver list for one market and
//! turns it into a `MarketDecision`: direction and candidate side, net /
//! conflict / coverage / score, a FIRE/WATCH/PASS status, risk flags, and the
//! market-specific edge / fair price / line / price looked up through a
//! `MarketResolvers` implementation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::aggregate::{
    compute_conflict, compute_coverage, compute_net, renormalize_driver_weights,
};
use super::driver::{apply_direction, Direction, DriverSignal};
use crate::calculations::round3;
use crate::domain::{DecisionStatus, Market, RiskFlag, Side};

/// Conflict above this always caps the status at PASS
pub const CONFLICT_PASS_CEILING: f64 = 0.30;

/// Number of drivers summarized in the reasoning string
const TOP_DRIVER_COUNT: usize = 3;

/// Status gates for one market
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum |net| to act on a direction at all
    pub t_dir: f64,
    /// Minimum score for FIRE
    pub t_fire: f64,
    /// Minimum score for WATCH
    pub t_watch: f64,
    /// Conflict above this caps the status at WATCH
    pub conflict_cap: f64,
    pub min_coverage_fire: f64,
    pub min_coverage_watch: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            t_dir: 0.10,
            t_fire: 0.35,
            t_watch: 0.20,
            conflict_cap: 0.20,
            min_coverage_fire: 0.70,
            min_coverage_watch: 0.50,
        }
    }
}

/// A named deduction from a market's score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Penalty {
    pub key: String,
    pub value: f64,
}

impl Penalty {
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Market-specific lookups keyed by the candidate side
///
/// Every method defaults to `None`; implementations return `None` when their
/// inputs are missing rather than failing.
#[cfg_attr(test, mockall::automock)]
pub trait MarketResolvers {
    fn edge(&self, _side: Side) -> Option<f64> {
        None
    }

    fn fair_price(&self, _side: Side) -> Option<f64> {
        None
    }

    fn line(&self, _side: Side) -> Option<f64> {
        None
    }

    fn price(&self, _side: Side) -> Option<f64> {
        None
    }
}

/// Resolver set with nothing to resolve
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolvers;

impl MarketResolvers for NoResolvers {}

/// Everything `build_market_decision` needs apart from the resolvers
#[derive(Debug, Clone)]
pub struct MarketDecisionInput {
    pub market: Market,
    /// Side a positive net points to
    pub default_side: Side,
    /// Raw drivers, before renormalization and direction
    pub drivers: Vec<DriverSignal>,
    pub penalties: Vec<Penalty>,
    pub thresholds: Thresholds,
    /// Base flags computed by the caller
    pub risk_flags: Vec<RiskFlag>,
}

/// The side the engine would bet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub side: Side,
    pub line: Option<f64>,
    pub price: Option<f64>,
}

/// Output of one market's evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketDecision {
    pub market: Market,
    pub best_candidate: Candidate,
    pub status: DecisionStatus,
    pub score: f64,
    pub net: f64,
    pub conflict: f64,
    pub coverage: f64,
    pub edge: Option<f64>,
    pub fair_price: Option<f64>,
    pub drivers: Vec<DriverSignal>,
    pub risk_flags: Vec<RiskFlag>,
    pub reasoning: String,
}

impl MarketDecision {
    pub fn has_flag(&self, flag: RiskFlag) -> bool {
        self.risk_flags.contains(&flag)
    }

    /// Top eligible drivers by |signal|, formatted `key:signal`
    pub fn top_drivers(&self) -> Vec<String> {
        top_driver_summary(&self.drivers)
    }
}

/// Classify a market from its metrics
///
/// Conflict produces a cap (PASS above 0.30, WATCH above `conflict_cap`) that
/// can only demote the score/coverage-derived status.
pub fn classify_status(
    net: f64,
    score: f64,
    conflict: f64,
    coverage: f64,
    thresholds: &Thresholds,
) -> DecisionStatus {
    // a zero net has no direction to act on, whatever t_dir says
    if net <= 0.0 || net < thresholds.t_dir {
        return DecisionStatus::Pass;
    }

    let max_status = if conflict > CONFLICT_PASS_CEILING {
        DecisionStatus::Pass
    } else if conflict > thresholds.conflict_cap {
        DecisionStatus::Watch
    } else {
        DecisionStatus::Fire
    };

    if score >= thresholds.t_fire
        && conflict <= thresholds.conflict_cap
        && coverage >= thresholds.min_coverage_fire
    {
        DecisionStatus::Fire.capped_at(max_status)
    } else if score >= thresholds.t_watch && coverage >= thresholds.min_coverage_watch {
        DecisionStatus::Watch.capped_at(max_status)
    } else {
        DecisionStatus::Pass
    }
}

fn top_driver_summary(drivers: &[DriverSignal]) -> Vec<String> {
    let mut eligible: Vec<&DriverSignal> = drivers.iter().filter(|d| d.is_eligible()).collect();
    eligible.sort_by(|a, b| b.signal().abs().total_cmp(&a.signal().abs()));
    eligible
        .into_iter()
        .take(TOP_DRIVER_COUNT)
        .map(|d| format!("{}:{:.2}", d.key(), d.signal() + 0.0))
        .collect()
}

fn format_reasoning(
    status: DecisionStatus,
    score: f64,
    conflict: f64,
    coverage: f64,
    top: &[String],
) -> String {
    let drivers = if top.is_empty() {
        "none".to_string()
    } else {
        top.join(", ")
    };
    format!(
        "{} score={:.3} conflict={:.3} coverage={:.3} top=[{}]",
        status, score, conflict, coverage, drivers
    )
}

/// Evaluate one market
pub fn build_market_decision(
    input: MarketDecisionInput,
    resolvers: &dyn MarketResolvers,
) -> MarketDecision {
    let MarketDecisionInput {
        market,
        default_side,
        drivers,
        penalties,
        thresholds,
        risk_flags: base_flags,
    } = input;

    let normalized = renormalize_driver_weights(&drivers);
    let base_net = compute_net(&apply_direction(&normalized, Direction::Positive));
    let direction = Direction::from_net(base_net);
    let candidate_side = match direction {
        Direction::Positive => default_side,
        Direction::Negative => default_side.opposite(),
    };

    let directed = apply_direction(&normalized, direction);
    let net = compute_net(&directed).abs();
    let conflict = compute_conflict(&directed);
    let coverage = compute_coverage(&directed);

    let penalty_total: f64 = penalties.iter().map(|p| p.value).sum();
    let score = round3(net - penalty_total);

    let status = classify_status(net, score, conflict, coverage, &thresholds);

    let top = top_driver_summary(&directed);

    let mut risk_flags = base_flags;
    if coverage < thresholds.min_coverage_watch {
        risk_flags.push(RiskFlag::LowCoverage);
    }
    if conflict > thresholds.conflict_cap {
        risk_flags.push(RiskFlag::ConflictHigh);
    }

    let edge = resolvers.edge(candidate_side);
    let fair_price = resolvers.fair_price(candidate_side);
    let line = resolvers.line(candidate_side);
    let price = resolvers.price(candidate_side);

    let reasoning = format_reasoning(status, score, conflict, coverage, &top);

    debug!(
        "{} decision: {} {} net={:.3} score={:.3} conflict={:.3} coverage={:.3} penalties={:.3}",
        market, status, candidate_side, net, score, conflict, coverage, penalty_total
    );

    MarketDecision {
        market,
        best_candidate: Candidate {
            side: candidate_side,
            line,
            price,
        },
        status,
        score,
        net,
        conflict,
        coverage,
        edge,
        fair_price,
        drivers: directed,
        risk_flags,
        reasoning,
    }
}
