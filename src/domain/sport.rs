use serde::{Deserialize, Serialize};

/// Leagues a snapshot can belong to
///
/// Serialized with the odds-feed sport keys; short league codes are accepted
/// on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    #[serde(rename = "basketball_nba", alias = "NBA", alias = "nba")]
    NBA,
    #[serde(rename = "icehockey_nhl", alias = "NHL", alias = "nhl")]
    NHL,
    #[serde(rename = "americanfootball_nfl", alias = "NFL", alias = "nfl")]
    NFL,
    #[serde(rename = "baseball_mlb", alias = "MLB", alias = "mlb")]
    MLB,
}

impl Sport {
    pub fn display_name(&self) -> &'static str {
        match self {
            Sport::NBA => "NBA",
            Sport::NHL => "NHL",
            Sport::NFL => "NFL",
            Sport::MLB => "MLB",
        }
    }

    /// Whether the engine has a decision set wired for this league
    pub fn has_decision_set(&self) -> bool {
        matches!(self, Sport::NBA | Sport::NHL)
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
