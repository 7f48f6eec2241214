//! Engine façade: sport decision set, arbitration and payload in one call.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::decision::{
    build_market_payload, select_expression_choice, DecisionSet, ExpressionChoice,
    MarketPayload, PayloadInput,
};
use crate::domain::{OddsSnapshot, Sport};
use crate::sports::{compute_nba_market_decisions, compute_nhl_market_decisions};

/// Full output for one game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub sport: Sport,
    pub decisions: DecisionSet,
    pub choice: Option<ExpressionChoice>,
    pub payload: MarketPayload,
}

/// Stateless evaluator holding the active calibration
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    config: EngineConfig,
}

impl DecisionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Per-market decisions only
    pub fn decisions(&self, sport: Sport, snapshot: &OddsSnapshot) -> DecisionSet {
        if !sport.has_decision_set() {
            debug!("No decision set for {}, returning empty set", sport);
            return DecisionSet::new();
        }
        match sport {
            Sport::NHL => compute_nhl_market_decisions(snapshot, &self.config.nhl),
            Sport::NBA => compute_nba_market_decisions(snapshot, &self.config.nba),
            Sport::NFL | Sport::MLB => DecisionSet::new(),
        }
    }

    /// Evaluate a snapshot with the countdown measured from now
    pub fn evaluate(&self, sport: Sport, snapshot: &OddsSnapshot) -> Evaluation {
        self.evaluate_at(sport, snapshot, Utc::now())
    }

    /// Evaluate a snapshot as of `now`
    pub fn evaluate_at(
        &self,
        sport: Sport,
        snapshot: &OddsSnapshot,
        now: DateTime<Utc>,
    ) -> Evaluation {
        let decisions = self.decisions(sport, snapshot);
        let choice = select_expression_choice(&decisions);
        let matchup = snapshot.matchup();

        let payload = build_market_payload(&PayloadInput {
            decisions: &decisions,
            expression_choice: choice.as_ref(),
            matchup: &matchup,
            commence_time: snapshot.commence_time,
            now,
        });

        match &choice {
            Some(c) => info!(
                "{} {} @ {}: {} {} score={:.3} ({})",
                sport,
                matchup.away,
                matchup.home,
                c.chosen_market,
                c.chosen.status,
                c.chosen.score,
                c.why_this_market
            ),
            None => info!("{} {} @ {}: no markets evaluated", sport, matchup.away, matchup.home),
        }

        Evaluation {
            sport,
            decisions,
            choice,
            payload,
        }
    }
}
