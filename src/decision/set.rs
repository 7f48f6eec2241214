use std::collections::BTreeMap;

use serde::Serialize;

use super::builder::MarketDecision;
use crate::domain::Market;

/// Per-market decisions for one game
///
/// Iteration follows market priority (TOTAL, SPREAD, ML). Markets a sport does
/// not offer are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DecisionSet(BTreeMap<Market, MarketDecision>);

impl DecisionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a decision under its own market, replacing any previous one
    pub fn insert(&mut self, decision: MarketDecision) {
        self.0.insert(decision.market, decision);
    }

    pub fn get(&self, market: Market) -> Option<&MarketDecision> {
        self.0.get(&market)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarketDecision> {
        self.0.values()
    }

    pub fn markets(&self) -> impl Iterator<Item = Market> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<MarketDecision> for DecisionSet {
    fn from_iter<I: IntoIterator<Item = MarketDecision>>(iter: I) -> Self {
        let mut set = DecisionSet::new();
        for decision in iter {
            set.insert(decision);
        }
        set
    }
}
