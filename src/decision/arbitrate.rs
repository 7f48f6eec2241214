//! Cross-market arbitration.
//!
//! Picks the single market to surface from a decision set using a fixed
//! cascade:
//!
//! 1. Status: a unique best status (FIRE > WATCH > PASS) wins outright.
//! 2. Score gap: among tied statuses, a score lead above 0.10 wins.
//! 4. ML value realism: SPREAD and ML tied within 0.05, SPREAD on a bad number
//!    and ML in the coinflip zone with positive edge, ML wins. Otherwise the
//!    SPREAD/ML tie goes to the higher score ("score tie").
//! 3. Market preference: first tied market in TOTAL, SPREAD, ML order.
//!
//! A three-way tie that misses both the gap and the SPREAD/ML tie band falls
//! through to rule 3's fixed order.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use tracing::debug;

use super::builder::MarketDecision;
use super::set::DecisionSet;
use crate::calculations::round3;
use crate::domain::{DecisionStatus, Market, RiskFlag};

/// Minimum score lead for rule 2 to pick the leader outright
pub const SCORE_GAP_THRESHOLD: f64 = 0.10;

/// SPREAD and ML scores within this band count as tied
pub const SPREAD_ML_TIE_BAND: f64 = 0.05;

/// The rule that decided the arbitration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArbitrationRule {
    Status,
    ScoreGap,
    ScoreTie,
    MarketPreference,
    MlValueRealism,
}

impl ArbitrationRule {
    pub fn label(&self) -> &'static str {
        match self {
            ArbitrationRule::Status => "Rule 1: status",
            ArbitrationRule::ScoreGap => "Rule 2: score gap",
            ArbitrationRule::ScoreTie => "Rule 2: score tie",
            ArbitrationRule::MarketPreference => "Rule 3: market preference",
            ArbitrationRule::MlValueRealism => "Rule 4: ML value realism",
        }
    }
}

impl std::fmt::Display for ArbitrationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for ArbitrationRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Why a market lost the arbitration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    Pass,
    LowerStatus,
    LowerScore,
}

impl RejectionReason {
    fn classify(decision: &MarketDecision, chosen_status: DecisionStatus) -> Self {
        if decision.status == DecisionStatus::Pass {
            RejectionReason::Pass
        } else if decision.status.rank() < chosen_status.rank() {
            RejectionReason::LowerStatus
        } else {
            RejectionReason::LowerScore
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedMarket {
    pub market: Market,
    pub decision: MarketDecision,
    pub rejection_reason: RejectionReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Story {
    pub narrative: String,
    pub alternatives: BTreeMap<Market, RejectionReason>,
}

/// Result of cross-market arbitration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionChoice {
    pub chosen_market: Market,
    pub chosen: MarketDecision,
    pub rejected: Vec<RejectedMarket>,
    pub why_this_market: ArbitrationRule,
    pub story: Story,
}

/// Choose the market to surface, `None` for an empty set
pub fn select_expression_choice(decisions: &DecisionSet) -> Option<ExpressionChoice> {
    let top_rank = decisions.iter().map(|d| d.status.rank()).max()?;
    let tied: Vec<&MarketDecision> = decisions
        .iter()
        .filter(|d| d.status.rank() == top_rank)
        .collect();

    let (chosen, rule) = if tied.len() == 1 {
        (tied[0], ArbitrationRule::Status)
    } else {
        break_status_tie(decisions, tied)
    };

    let rejected: Vec<RejectedMarket> = decisions
        .iter()
        .filter(|d| d.market != chosen.market)
        .map(|d| RejectedMarket {
            market: d.market,
            decision: d.clone(),
            rejection_reason: RejectionReason::classify(d, chosen.status),
        })
        .collect();

    let alternatives = rejected
        .iter()
        .map(|r| (r.market, r.rejection_reason))
        .collect();

    let narrative = format!(
        "{} leads on {}.",
        chosen.market,
        rule.label().to_lowercase()
    );

    debug!(
        "Arbitration: {} chosen via {} ({} rejected)",
        chosen.market,
        rule,
        rejected.len()
    );

    Some(ExpressionChoice {
        chosen_market: chosen.market,
        chosen: chosen.clone(),
        rejected,
        why_this_market: rule,
        story: Story {
            narrative,
            alternatives,
        },
    })
}

/// Rules 2-4 for two or more decisions sharing the top status
fn break_status_tie<'a>(
    decisions: &'a DecisionSet,
    mut tied: Vec<&'a MarketDecision>,
) -> (&'a MarketDecision, ArbitrationRule) {
    let top_status = tied[0].status;

    // Stable: equal scores keep market priority order
    tied.sort_by(|a, b| b.score.total_cmp(&a.score));
    let leader = tied[0];
    // Compared on 3-dp differences: 0.40 vs 0.30 is a gap of exactly 0.10, not a lead
    let gap = round3(leader.score - tied[1].score);
    if gap > SCORE_GAP_THRESHOLD {
        return (leader, ArbitrationRule::ScoreGap);
    }

    let at_top = |market: Market| decisions.get(market).filter(|d| d.status == top_status);
    if let (Some(spread), Some(ml)) = (at_top(Market::Spread), at_top(Market::Ml)) {
        // Same 3-dp comparison as the gap
        if round3((spread.score - ml.score).abs()) <= SPREAD_ML_TIE_BAND {
            let ml_value = spread.has_flag(RiskFlag::BadNumber)
                && ml.has_flag(RiskFlag::CoinflipZone)
                && ml.edge.is_some_and(|edge| edge > 0.0);
            if ml_value {
                return (ml, ArbitrationRule::MlValueRealism);
            }
            return (leader, ArbitrationRule::ScoreTie);
        }
    }

    let preferred = Market::PRIORITY
        .iter()
        .find_map(|market| at_top(*market))
        .unwrap_or(leader);
    (preferred, ArbitrationRule::MarketPreference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::builder::Candidate;
    use crate::domain::Side;

    fn decision(market: Market, status: DecisionStatus, score: f64) -> MarketDecision {
        let side = match market {
            Market::Total => Side::Over,
            _ => Side::Home,
        };
        MarketDecision {
            market,
            best_candidate: Candidate {
                side,
                line: None,
                price: None,
            },
            status,
            score,
            net: score,
            conflict: 0.0,
            coverage: 1.0,
            edge: None,
            fair_price: None,
            drivers: vec![],
            risk_flags: vec![],
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_empty_set_returns_none() {
        assert!(select_expression_choice(&DecisionSet::new()).is_none());
    }

    #[test]
    fn test_rule1_unique_status() {
        let set: DecisionSet = vec![
            decision(Market::Total, DecisionStatus::Watch, 0.9),
            decision(Market::Spread, DecisionStatus::Fire, 0.4),
            decision(Market::Ml, DecisionStatus::Pass, 0.0),
        ]
        .into_iter()
        .collect();

        let choice = select_expression_choice(&set).unwrap();
        assert_eq!(choice.chosen_market, Market::Spread);
        assert_eq!(choice.why_this_market, ArbitrationRule::Status);
        assert_eq!(choice.story.narrative, "SPREAD leads on rule 1: status.");
        assert_eq!(
            choice.story.alternatives.get(&Market::Total),
            Some(&RejectionReason::LowerStatus)
        );
        assert_eq!(
            choice.story.alternatives.get(&Market::Ml),
            Some(&RejectionReason::Pass)
        );
    }

    #[test]
    fn test_rule2_score_gap() {
        let set: DecisionSet = vec![
            decision(Market::Total, DecisionStatus::Fire, 0.30),
            decision(Market::Spread, DecisionStatus::Fire, 0.42),
        ]
        .into_iter()
        .collect();

        let choice = select_expression_choice(&set).unwrap();
        assert_eq!(choice.chosen_market, Market::Spread);
        assert_eq!(choice.why_this_market, ArbitrationRule::ScoreGap);
        assert_eq!(choice.rejected.len(), 1);
        assert_eq!(choice.rejected[0].rejection_reason, RejectionReason::LowerScore);
    }

    #[test]
    fn test_gap_of_exactly_threshold_is_not_a_gap() {
        let set: DecisionSet = vec![
            decision(Market::Total, DecisionStatus::Fire, 0.30),
            decision(Market::Spread, DecisionStatus::Fire, 0.40),
        ]
        .into_iter()
        .collect();

        let choice = select_expression_choice(&set).unwrap();
        assert_eq!(choice.chosen_market, Market::Total);
        assert_eq!(choice.why_this_market, ArbitrationRule::MarketPreference);
    }

    #[test]
    fn test_rule4_ml_value_realism() {
        let mut spread = decision(Market::Spread, DecisionStatus::Watch, 0.25);
        spread.risk_flags = vec![RiskFlag::BadNumber];
        let mut ml = decision(Market::Ml, DecisionStatus::Watch, 0.22);
        ml.risk_flags = vec![RiskFlag::CoinflipZone];
        ml.edge = Some(0.03);
        let set: DecisionSet = vec![spread, ml].into_iter().collect();

        let choice = select_expression_choice(&set).unwrap();
        assert_eq!(choice.chosen_market, Market::Ml);
        assert_eq!(choice.why_this_market, ArbitrationRule::MlValueRealism);
        assert_eq!(choice.story.narrative, "ML leads on rule 4: ml value realism.");
        assert_eq!(
            choice.story.alternatives.get(&Market::Spread),
            Some(&RejectionReason::LowerScore)
        );
    }

    #[test]
    fn test_spread_ml_tie_without_value_goes_to_score() {
        let mut spread = decision(Market::Spread, DecisionStatus::Watch, 0.25);
        spread.risk_flags = vec![RiskFlag::BadNumber];
        let mut ml = decision(Market::Ml, DecisionStatus::Watch, 0.22);
        ml.risk_flags = vec![RiskFlag::CoinflipZone];
        ml.edge = Some(-0.01);
        let set: DecisionSet = vec![spread, ml].into_iter().collect();

        let choice = select_expression_choice(&set).unwrap();
        assert_eq!(choice.chosen_market, Market::Spread);
        assert_eq!(choice.why_this_market, ArbitrationRule::ScoreTie);
    }

    #[test]
    fn test_rule3_market_preference() {
        // SPREAD/ML gap 0.08: outside the tie band, inside the score-gap band
        let set: DecisionSet = vec![
            decision(Market::Spread, DecisionStatus::Watch, 0.30),
            decision(Market::Ml, DecisionStatus::Watch, 0.22),
        ]
        .into_iter()
        .collect();

        let choice = select_expression_choice(&set).unwrap();
        assert_eq!(choice.chosen_market, Market::Spread);
        assert_eq!(choice.why_this_market, ArbitrationRule::MarketPreference);
    }

    #[test]
    fn test_rule3_prefers_total_over_higher_score() {
        let set: DecisionSet = vec![
            decision(Market::Total, DecisionStatus::Fire, 0.36),
            decision(Market::Spread, DecisionStatus::Fire, 0.44),
        ]
        .into_iter()
        .collect();

        let choice = select_expression_choice(&set).unwrap();
        assert_eq!(choice.chosen_market, Market::Total);
        assert_eq!(choice.why_this_market, ArbitrationRule::MarketPreference);
    }

    #[test]
    fn test_all_pass_still_chooses() {
        let set: DecisionSet = vec![
            decision(Market::Total, DecisionStatus::Pass, 0.05),
            decision(Market::Spread, DecisionStatus::Pass, 0.02),
        ]
        .into_iter()
        .collect();

        let choice = select_expression_choice(&set).unwrap();
        assert_eq!(choice.chosen_market, Market::Total);
        assert_eq!(choice.rejected[0].rejection_reason, RejectionReason::Pass);
    }

    #[test]
    fn test_arbitration_is_deterministic() {
        let set: DecisionSet = vec![
            decision(Market::Total, DecisionStatus::Watch, 0.21),
            decision(Market::Spread, DecisionStatus::Watch, 0.24),
            decision(Market::Ml, DecisionStatus::Watch, 0.23),
        ]
        .into_iter()
        .collect();

        let a = select_expression_choice(&set).unwrap();
        let b = select_expression_choice(&set).unwrap();
        assert_eq!(a.chosen_market, b.chosen_market);
        assert_eq!(a.why_this_market, b.why_this_market);
        // SPREAD/ML within 0.05 with no value flags -> score tie, top score wins
        assert_eq!(a.chosen_market, Market::Spread);
        assert_eq!(a.why_this_market, ArbitrationRule::ScoreTie);
    }

    #[test]
    fn test_score_gap_boundary_uses_rounded_difference() {
        // 0.40 - 0.30 is 0.10000000000000003 in f64; rounded it is no lead
        let set: DecisionSet = vec![
            decision(Market::Total, DecisionStatus::Watch, 0.30),
            decision(Market::Spread, DecisionStatus::Watch, 0.40),
        ]
        .into_iter()
        .collect();
        let choice = select_expression_choice(&set).unwrap();
        assert_eq!(choice.chosen_market, Market::Total);
        assert_eq!(choice.why_this_market, ArbitrationRule::MarketPreference);

        let set: DecisionSet = vec![
            decision(Market::Total, DecisionStatus::Watch, 0.30),
            decision(Market::Spread, DecisionStatus::Watch, 0.401),
        ]
        .into_iter()
        .collect();
        let choice = select_expression_choice(&set).unwrap();
        assert_eq!(choice.chosen_market, Market::Spread);
        assert_eq!(choice.why_this_market, ArbitrationRule::ScoreGap);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&ArbitrationRule::ScoreGap).unwrap(),
            "\"Rule 2: score gap\""
        );
        assert_eq!(
            serde_json::to_string(&RejectionReason::LowerStatus).unwrap(),
            "\"LOWER_STATUS\""
        );
    }
}
