//! Sport-agnostic decision core: drivers, aggregation, per-market decisions,
//! cross-market arbitration and the presentation payload.

pub mod aggregate;
pub mod arbitrate;
pub mod builder;
pub mod driver;
pub mod payload;
pub mod set;

pub use aggregate::{
    compute_conflict, compute_coverage, compute_net, renormalize_driver_weights,
    CONFLICT_DEAD_ZONE,
};
pub use arbitrate::{
    select_expression_choice, ArbitrationRule, ExpressionChoice, RejectedMarket,
    RejectionReason, Story,
};
pub use builder::{
    build_market_decision, classify_status, Candidate, MarketDecision, MarketDecisionInput,
    MarketResolvers, NoResolvers, Penalty, Thresholds, CONFLICT_PASS_CEILING,
};
pub use driver::{
    apply_direction, build_driver, driver_from_value, scaled_signal, status_from_numbers,
    DataStatus, Direction, DriverSignal, DriverSpec, SignalTransform,
};
pub use payload::{
    build_market_payload, format_countdown, format_pick, MarketPayload, MarketSummary,
    PayloadInput,
};
pub use set::DecisionSet;
