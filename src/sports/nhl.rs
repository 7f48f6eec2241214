//! NHL decision set: TOTAL, SPREAD (puck line) and ML.

use tracing::debug;

use super::calibration::NhlCalibration;
use super::projection::{project_nhl, Projection};
use super::resolvers::{MoneylineResolvers, SpreadResolvers, TotalResolvers};
use super::{delta, min_present, on_key_number};
use crate::calculations::mean_present;
use crate::decision::{
    build_market_decision, driver_from_value, DecisionSet, DriverSignal, MarketDecisionInput,
    Penalty, SignalTransform,
};
use crate::domain::{Market, OddsSnapshot, RawStats, RiskFlag, Side};
use crate::pricing::{margin_to_win_probability, no_vig_probabilities, odds_to_probability};

// Signal transforms. TOTAL signals point toward OVER, side signals toward HOME.
const GOALIE_QUALITY: SignalTransform = SignalTransform::inverted(0.905, 0.015);
const PROJECTION_VS_LINE: SignalTransform = SignalTransform::new(0.0, 0.75);
const PACE: SignalTransform = SignalTransform::new(60.0, 8.0);
const SPECIAL_TEAMS: SignalTransform = SignalTransform::new(0.21, 0.05);
const REST: SignalTransform = SignalTransform::inverted(1.0, 2.0);
const GOALIE_DELTA: SignalTransform = SignalTransform::new(0.0, 0.012);
const SHOT_QUALITY: SignalTransform = SignalTransform::new(0.0, 0.08);
const PROJECTION_MARGIN: SignalTransform = SignalTransform::new(0.0, 1.0);
const SPECIAL_TEAMS_DELTA: SignalTransform = SignalTransform::new(0.0, 0.08);
const REST_DELTA: SignalTransform = SignalTransform::new(0.0, 2.0);

/// Raw inputs read once per evaluation
#[derive(Debug, Clone, Copy, Default)]
struct NhlStats {
    home_save_pct: Option<f64>,
    away_save_pct: Option<f64>,
    home_shots: Option<f64>,
    away_shots: Option<f64>,
    home_pp: Option<f64>,
    away_pp: Option<f64>,
    home_pk: Option<f64>,
    away_pk: Option<f64>,
    home_xgf: Option<f64>,
    away_xgf: Option<f64>,
    home_rest: Option<f64>,
    away_rest: Option<f64>,
    home_goalie_confirmed: Option<bool>,
    away_goalie_confirmed: Option<bool>,
}

impl NhlStats {
    fn read(raw: &RawStats) -> Self {
        Self {
            home_save_pct: raw.number("goalie_home_save_pct"),
            away_save_pct: raw.number("goalie_away_save_pct"),
            home_shots: raw.number("home_shots_pg"),
            away_shots: raw.number("away_shots_pg"),
            home_pp: raw.number("home_pp_pct"),
            away_pp: raw.number("away_pp_pct"),
            home_pk: raw.number("home_pk_pct"),
            away_pk: raw.number("away_pk_pct"),
            home_xgf: raw.number("home_xgf_pct"),
            away_xgf: raw.number("away_xgf_pct"),
            home_rest: raw.number("home_rest_days"),
            away_rest: raw.number("away_rest_days"),
            home_goalie_confirmed: raw.flag("goalie_home_confirmed"),
            away_goalie_confirmed: raw.flag("goalie_away_confirmed"),
        }
    }

    fn goalie_unconfirmed(&self) -> bool {
        self.home_goalie_confirmed == Some(false) || self.away_goalie_confirmed == Some(false)
    }
}

fn total_drivers(
    stats: &NhlStats,
    projection: Option<&Projection>,
    line: Option<f64>,
    cal: &NhlCalibration,
) -> Vec<DriverSignal> {
    let w = &cal.total_weights;
    let projected_total = projection.map(Projection::total);
    vec![
        driver_from_value(
            "goalie_quality",
            w.goalie_quality,
            mean_present(&[stats.home_save_pct, stats.away_save_pct]),
            GOALIE_QUALITY,
            &[stats.home_save_pct, stats.away_save_pct],
            "mean starter save pct",
        ),
        driver_from_value(
            "projection_vs_line",
            w.projection_vs_line,
            delta(projected_total, line),
            PROJECTION_VS_LINE,
            &[projected_total, line],
            "projected total minus line",
        ),
        driver_from_value(
            "pace",
            w.pace,
            mean_present(&[stats.home_shots, stats.away_shots]).map(|m| m * 2.0),
            PACE,
            &[stats.home_shots, stats.away_shots],
            "combined shots per game",
        ),
        driver_from_value(
            "special_teams",
            w.special_teams,
            mean_present(&[stats.home_pp, stats.away_pp]),
            SPECIAL_TEAMS,
            &[stats.home_pp, stats.away_pp],
            "mean power-play pct",
        ),
        driver_from_value(
            "rest",
            w.rest,
            min_present(stats.home_rest, stats.away_rest),
            REST,
            &[stats.home_rest, stats.away_rest],
            "fewest rest days",
        ),
    ]
}

/// Drivers shared by SPREAD and ML; `projection_margin` is measured against the puck line
fn side_drivers(
    stats: &NhlStats,
    projection: Option<&Projection>,
    spread_home: Option<f64>,
    cal: &NhlCalibration,
) -> Vec<DriverSignal> {
    let w = &cal.side_weights;
    let margin = projection.map(Projection::margin);
    let special_teams = |pp: Option<f64>, pk: Option<f64>| -> Option<f64> { Some(pp? + pk?) };
    let st_inputs = [stats.home_pp, stats.home_pk, stats.away_pp, stats.away_pk];
    vec![
        driver_from_value(
            "goalie_delta",
            w.goalie_delta,
            delta(stats.home_save_pct, stats.away_save_pct),
            GOALIE_DELTA,
            &[stats.home_save_pct, stats.away_save_pct],
            "home minus away save pct",
        ),
        driver_from_value(
            "shot_quality",
            w.shot_quality,
            delta(stats.home_xgf, stats.away_xgf),
            SHOT_QUALITY,
            &[stats.home_xgf, stats.away_xgf],
            "xGF% delta",
        ),
        driver_from_value(
            "projection_margin",
            w.projection_margin,
            margin.map(|m| m + spread_home.unwrap_or(0.0)),
            PROJECTION_MARGIN,
            &[margin, spread_home],
            "projected margin against the line",
        ),
        driver_from_value(
            "special_teams_delta",
            w.special_teams_delta,
            delta(
                special_teams(stats.home_pp, stats.home_pk),
                special_teams(stats.away_pp, stats.away_pk),
            ),
            SPECIAL_TEAMS_DELTA,
            &st_inputs,
            "(PP + PK) delta",
        ),
        driver_from_value(
            "rest_delta",
            w.rest_delta,
            delta(stats.home_rest, stats.away_rest),
            REST_DELTA,
            &[stats.home_rest, stats.away_rest],
            "rest days delta",
        ),
    ]
}

fn penalties(stats: &NhlStats, projection: Option<&Projection>, cal: &NhlCalibration) -> Vec<Penalty> {
    let mut penalties = Vec::new();
    if stats.goalie_unconfirmed() {
        penalties.push(Penalty::new("goalie_unconfirmed", cal.goalie_unconfirmed_penalty));
    }
    if projection.is_some_and(|p| p.confidence < cal.min_projection_confidence) {
        penalties.push(Penalty::new("projection_low_confidence", cal.low_confidence_penalty));
    }
    penalties
}

fn total_flags(
    projection: Option<&Projection>,
    line: Option<f64>,
    cal: &NhlCalibration,
) -> Vec<RiskFlag> {
    let mut flags = Vec::new();
    if line.is_some_and(|l| on_key_number(l, &cal.key_totals)) {
        flags.push(RiskFlag::KeyNumber);
    }
    match (projection, line) {
        (Some(p), Some(l)) if (p.total() - l).abs() < cal.total_bad_number_band => {
            flags.push(RiskFlag::BadNumber);
        }
        (None, _) => flags.push(RiskFlag::NoProjection),
        _ => {}
    }
    flags
}

fn spread_flags(
    projection: Option<&Projection>,
    spread_home: Option<f64>,
    cal: &NhlCalibration,
) -> Vec<RiskFlag> {
    match (projection, spread_home) {
        (Some(p), Some(s)) if (p.margin() + s).abs() < cal.spread_bad_number_band => {
            vec![RiskFlag::BadNumber]
        }
        (None, _) => vec![RiskFlag::NoProjection],
        _ => vec![],
    }
}

fn moneyline_flags(snapshot: &OddsSnapshot, cal: &NhlCalibration) -> Vec<RiskFlag> {
    let home_prob = match (snapshot.h2h_home, snapshot.h2h_away) {
        (Some(home), Some(away)) => no_vig_probabilities(home, away).map(|(h, _)| h),
        (Some(home), None) => odds_to_probability(home),
        _ => None,
    };
    match home_prob {
        Some(p) if (p - 0.5).abs() <= cal.coinflip_band => vec![RiskFlag::CoinflipZone],
        _ => vec![],
    }
}

/// Evaluate TOTAL, SPREAD and ML for one NHL game
pub fn compute_nhl_market_decisions(snapshot: &OddsSnapshot, cal: &NhlCalibration) -> DecisionSet {
    let stats = NhlStats::read(&snapshot.raw_data);
    let projection = project_nhl(&snapshot.raw_data);
    let projection = projection.as_ref();
    let penalties = penalties(&stats, projection, cal);

    if projection.is_none() {
        debug!(
            "NHL {}: no projection, line-based drivers ineligible",
            snapshot.game_id.as_deref().unwrap_or("-")
        );
    }

    let total = build_market_decision(
        MarketDecisionInput {
            market: Market::Total,
            default_side: Side::Over,
            drivers: total_drivers(&stats, projection, snapshot.total, cal),
            penalties: penalties.clone(),
            thresholds: cal.total_thresholds,
            risk_flags: total_flags(projection, snapshot.total, cal),
        },
        &TotalResolvers {
            projected_total: projection.map(Projection::total),
            line: snapshot.total,
            over_price: snapshot.total_over_price,
            under_price: snapshot.total_under_price,
            sigma: cal.total_sigma,
        },
    );

    let side = side_drivers(&stats, projection, snapshot.spread_home, cal);

    let spread = build_market_decision(
        MarketDecisionInput {
            market: Market::Spread,
            default_side: Side::Home,
            drivers: side.clone(),
            penalties: penalties.clone(),
            thresholds: cal.spread_thresholds,
            risk_flags: spread_flags(projection, snapshot.spread_home, cal),
        },
        &SpreadResolvers {
            projected_margin: projection.map(Projection::margin),
            spread_home: snapshot.spread_home,
            home_price: snapshot.spread_home_price,
            away_price: snapshot.spread_away_price,
            sigma: cal.margin_sigma,
        },
    );

    let moneyline = build_market_decision(
        MarketDecisionInput {
            market: Market::Ml,
            default_side: Side::Home,
            drivers: side,
            penalties,
            thresholds: cal.ml_thresholds,
            risk_flags: moneyline_flags(snapshot, cal),
        },
        &MoneylineResolvers {
            home_win_probability: projection
                .map(|p| margin_to_win_probability(p.margin(), cal.margin_sigma)),
            h2h_home: snapshot.h2h_home,
            h2h_away: snapshot.h2h_away,
        },
    );

    [total, spread, moneyline].into_iter().collect()
}
