pub mod calculations;
pub mod config;
pub mod decision;
pub mod domain;
pub mod engine;
pub mod error;
pub mod logging;
pub mod pricing;
pub mod sports;

pub use config::{EngineConfig, LoggingConfig};
pub use decision::{
    build_market_decision, build_market_payload, format_pick, select_expression_choice,
    DecisionSet, ExpressionChoice, MarketDecision, MarketPayload,
};
pub use domain::{DecisionStatus, Market, OddsSnapshot, RiskFlag, Side, Sport};
pub use engine::{DecisionEngine, Evaluation};
pub use error::{EngineError, Result};
pub use sports::{compute_nba_market_decisions, compute_nhl_market_decisions};
