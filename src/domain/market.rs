use serde::{Deserialize, Serialize};

/// Betting market evaluated by the engine
///
/// Variant order is the arbitration priority: TOTAL, then SPREAD, then ML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    Total,
    Spread,
    Ml,
}

impl Market {
    /// Fixed market priority used when statuses and scores cannot separate markets
    pub const PRIORITY: [Market; 3] = [Market::Total, Market::Spread, Market::Ml];

    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Total => "TOTAL",
            Market::Spread => "SPREAD",
            Market::Ml => "ML",
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The outcome a candidate bet is placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Over,
    Under,
    Home,
    Away,
    /// Three-way regulation result; has no opposite
    Draw,
}

impl Side {
    /// Get the opposite side
    ///
    /// OVER/UNDER and HOME/AWAY swap; DRAW is returned unchanged.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Over => Side::Under,
            Side::Under => Side::Over,
            Side::Home => Side::Away,
            Side::Away => Side::Home,
            Side::Draw => Side::Draw,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Over => "OVER",
            Side::Under => "UNDER",
            Side::Home => "HOME",
            Side::Away => "AWAY",
            Side::Draw => "DRAW",
        }
    }

    /// Title-case label for display
    pub fn label(&self) -> &'static str {
        match self {
            Side::Over => "Over",
            Side::Under => "Under",
            Side::Home => "Home",
            Side::Away => "Away",
            Side::Draw => "Draw",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confidence status attached to a market decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecisionStatus {
    Fire,
    Watch,
    Pass,
}

impl DecisionStatus {
    /// Arbitration rank: FIRE=2 > WATCH=1 > PASS=0
    pub fn rank(&self) -> u8 {
        match self {
            DecisionStatus::Fire => 2,
            DecisionStatus::Watch => 1,
            DecisionStatus::Pass => 0,
        }
    }

    /// Demote to `cap` when the cap ranks lower. Never promotes.
    pub fn capped_at(self, cap: DecisionStatus) -> DecisionStatus {
        if cap.rank() < self.rank() {
            cap
        } else {
            self
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStatus::Fire => "FIRE",
            DecisionStatus::Watch => "WATCH",
            DecisionStatus::Pass => "PASS",
        }
    }
}

impl std::fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Risk annotations accumulated on a market decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskFlag {
    /// Coverage below the watch floor
    LowCoverage,
    /// Conflict above the market's cap
    ConflictHigh,
    /// Line sits on a frequently landed margin/total
    KeyNumber,
    /// Projection barely clears the line
    BadNumber,
    /// Market prices the game near 50/50
    CoinflipZone,
    /// Projection unavailable for a line-dependent market
    NoProjection,
}

impl RiskFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskFlag::LowCoverage => "LOW_COVERAGE",
            RiskFlag::ConflictHigh => "CONFLICT_HIGH",
            RiskFlag::KeyNumber => "KEY_NUMBER",
            RiskFlag::BadNumber => "BAD_NUMBER",
            RiskFlag::CoinflipZone => "COINFLIP_ZONE",
            RiskFlag::NoProjection => "NO_PROJECTION",
        }
    }
}

impl std::fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
