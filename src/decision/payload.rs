//! Display-ready summary of the chosen market.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::arbitrate::{ArbitrationRule, ExpressionChoice, RejectionReason};
use super::builder::MarketDecision;
use super::set::DecisionSet;
use crate::domain::{DecisionStatus, Market, Matchup, RiskFlag, Side};

/// Inputs for `build_market_payload`
#[derive(Debug, Clone, Copy)]
pub struct PayloadInput<'a> {
    pub decisions: &'a DecisionSet,
    pub expression_choice: Option<&'a ExpressionChoice>,
    pub matchup: &'a Matchup,
    pub commence_time: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

/// One line of the per-market summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    pub market: Market,
    pub status: DecisionStatus,
    pub score: f64,
    pub pick: String,
}

/// Presentation shape; every field is omitted when no market was chosen
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<Market>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pick: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DecisionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fair_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<ArbitrationRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<BTreeMap<Market, RejectionReason>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_flags: Option<Vec<RiskFlag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_drivers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_markets: Option<Vec<MarketSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_in: Option<String>,
}

impl MarketPayload {
    pub fn is_empty(&self) -> bool {
        self.market.is_none()
    }
}

/// Build the payload for the chosen market, or an empty payload without one
pub fn build_market_payload(input: &PayloadInput<'_>) -> MarketPayload {
    let Some(choice) = input.expression_choice else {
        return MarketPayload::default();
    };
    let chosen = &choice.chosen;

    let all_markets = input
        .decisions
        .iter()
        .map(|d| MarketSummary {
            market: d.market,
            status: d.status,
            score: d.score,
            pick: format_pick(d, input.matchup),
        })
        .collect();

    MarketPayload {
        market: Some(choice.chosen_market),
        pick: Some(format_pick(chosen, input.matchup)),
        status: Some(chosen.status),
        score: Some(chosen.score),
        line: chosen.best_candidate.line,
        price: chosen.best_candidate.price,
        edge: chosen.edge,
        fair_price: chosen.fair_price,
        rule: Some(choice.why_this_market),
        narrative: Some(choice.story.narrative.clone()),
        alternatives: Some(choice.story.alternatives.clone()),
        risk_flags: Some(chosen.risk_flags.clone()),
        top_drivers: Some(chosen.top_drivers()),
        reasoning: Some(chosen.reasoning.clone()),
        all_markets: Some(all_markets),
        starts_in: input
            .commence_time
            .map(|commence| format_countdown(commence, input.now)),
    }
}

/// Human-readable pick: `Over 6.5 (-110)`, `Boston Bruins -1.5 (+150)`,
/// `Boston Bruins ML (-150)`
pub fn format_pick(decision: &MarketDecision, matchup: &Matchup) -> String {
    let candidate = &decision.best_candidate;
    let mut pick = match decision.market {
        Market::Total => {
            let mut s = candidate.side.label().to_string();
            if let Some(line) = candidate.line {
                s.push(' ');
                s.push_str(&format_number(line));
            }
            s
        }
        Market::Spread => {
            let mut s = side_name(candidate.side, matchup).to_string();
            if let Some(line) = candidate.line {
                s.push(' ');
                s.push_str(&format_signed(line));
            }
            s
        }
        Market::Ml => format!("{} ML", side_name(candidate.side, matchup)),
    };
    if let Some(price) = candidate.price {
        pick.push_str(&format!(" ({})", format_american(price)));
    }
    pick
}

/// Time until puck drop / tip-off: `2h 05m`, `45m`, or `started`
pub fn format_countdown(commence: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (commence - now).num_minutes();
    if minutes <= 0 {
        return "started".to_string();
    }
    let hours = minutes / 60;
    let rem = minutes % 60;
    if hours > 0 {
        format!("{}h {:02}m", hours, rem)
    } else {
        format!("{}m", rem)
    }
}

fn side_name(side: Side, matchup: &Matchup) -> &str {
    match side {
        Side::Home => &matchup.home,
        Side::Away => &matchup.away,
        other => other.label(),
    }
}

fn format_number(value: f64) -> String {
    format!("{}", value + 0.0)
}

fn format_signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", value)
    } else {
        format_number(value)
    }
}

fn format_american(price: f64) -> String {
    if price > 0.0 {
        format!("+{:.0}", price)
    } else {
        format!("{:.0}", price)
    }
}
