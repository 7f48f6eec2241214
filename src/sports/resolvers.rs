//! Market resolvers shared by the sport decision sets.

use crate::decision::MarketResolvers;
use crate::domain::Side;
use crate::pricing::{
    calculate_moneyline_edge, calculate_spread_edge, calculate_total_edge,
    margin_to_win_probability, probability_to_american,
};

/// TOTAL: point edge and fair price against the posted total
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalResolvers {
    pub projected_total: Option<f64>,
    pub line: Option<f64>,
    pub over_price: Option<f64>,
    pub under_price: Option<f64>,
    pub sigma: f64,
}

impl TotalResolvers {
    fn over_probability(&self) -> Option<f64> {
        let projected = self.projected_total?;
        let line = self.line?;
        Some(margin_to_win_probability(projected - line, self.sigma))
    }
}

impl MarketResolvers for TotalResolvers {
    fn edge(&self, side: Side) -> Option<f64> {
        let edge = calculate_total_edge(self.projected_total?, self.line?)?;
        match side {
            Side::Over => Some(edge),
            Side::Under => Some(-edge + 0.0),
            _ => None,
        }
    }

    fn fair_price(&self, side: Side) -> Option<f64> {
        let p_over = self.over_probability()?;
        match side {
            Side::Over => probability_to_american(p_over),
            Side::Under => probability_to_american(1.0 - p_over),
            _ => None,
        }
    }

    fn line(&self, side: Side) -> Option<f64> {
        match side {
            Side::Over | Side::Under => self.line,
            _ => None,
        }
    }

    fn price(&self, side: Side) -> Option<f64> {
        match side {
            Side::Over => self.over_price,
            Side::Under => self.under_price,
            _ => None,
        }
    }
}

/// SPREAD: projected cover margin against the home handicap
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadResolvers {
    pub projected_margin: Option<f64>,
    pub spread_home: Option<f64>,
    pub home_price: Option<f64>,
    pub away_price: Option<f64>,
    pub sigma: f64,
}

impl MarketResolvers for SpreadResolvers {
    fn edge(&self, side: Side) -> Option<f64> {
        let edge = calculate_spread_edge(self.projected_margin?, self.spread_home?)?;
        match side {
            Side::Home => Some(edge),
            Side::Away => Some(-edge + 0.0),
            _ => None,
        }
    }

    fn fair_price(&self, side: Side) -> Option<f64> {
        let cover = self.projected_margin? + self.spread_home?;
        let p_home = margin_to_win_probability(cover, self.sigma);
        match side {
            Side::Home => probability_to_american(p_home),
            Side::Away => probability_to_american(1.0 - p_home),
            _ => None,
        }
    }

    fn line(&self, side: Side) -> Option<f64> {
        let spread = self.spread_home?;
        match side {
            Side::Home => Some(spread),
            Side::Away => Some(-spread + 0.0),
            _ => None,
        }
    }

    fn price(&self, side: Side) -> Option<f64> {
        match side {
            Side::Home => self.home_price,
            Side::Away => self.away_price,
            _ => None,
        }
    }
}

/// ML: model win probability against the de-vigged market
#[derive(Debug, Clone, Copy, Default)]
pub struct MoneylineResolvers {
    pub home_win_probability: Option<f64>,
    pub h2h_home: Option<f64>,
    pub h2h_away: Option<f64>,
}

impl MarketResolvers for MoneylineResolvers {
    fn edge(&self, side: Side) -> Option<f64> {
        let home_edge =
            calculate_moneyline_edge(self.home_win_probability?, self.h2h_home?, self.h2h_away)?;
        match side {
            Side::Home => Some(home_edge),
            Side::Away => Some(-home_edge + 0.0),
            _ => None,
        }
    }

    fn fair_price(&self, side: Side) -> Option<f64> {
        let p_home = self.home_win_probability?;
        match side {
            Side::Home => probability_to_american(p_home),
            Side::Away => probability_to_american(1.0 - p_home),
            _ => None,
        }
    }

    fn price(&self, side: Side) -> Option<f64> {
        match side {
            Side::Home => self.h2h_home,
            Side::Away => self.h2h_away,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_resolvers_sign_by_side() {
        let r = TotalResolvers {
            projected_total: Some(6.9),
            line: Some(6.5),
            over_price: Some(-115.0),
            under_price: None,
            sigma: 2.2,
        };
        assert_eq!(r.edge(Side::Over), Some(0.4));
        assert_eq!(r.edge(Side::Under), Some(-0.4));
        assert_eq!(r.line(Side::Under), Some(6.5));
        assert_eq!(r.price(Side::Over), Some(-115.0));
        assert_eq!(r.price(Side::Under), None);
        assert!(r.fair_price(Side::Over).unwrap() < 0.0);
        assert!(r.fair_price(Side::Under).unwrap() > 0.0);
        assert_eq!(r.edge(Side::Home), None);
    }

    #[test]
    fn test_total_resolvers_without_projection() {
        let r = TotalResolvers {
            line: Some(6.5),
            sigma: 2.2,
            ..Default::default()
        };
        assert_eq!(r.edge(Side::Over), None);
        assert_eq!(r.fair_price(Side::Over), None);
        assert_eq!(r.line(Side::Over), Some(6.5));
    }

    #[test]
    fn test_spread_resolvers_line_is_side_signed() {
        let r = SpreadResolvers {
            projected_margin: Some(0.5),
            spread_home: Some(-1.5),
            home_price: Some(160.0),
            away_price: Some(-190.0),
            sigma: 2.4,
        };
        assert_eq!(r.line(Side::Home), Some(-1.5));
        assert_eq!(r.line(Side::Away), Some(1.5));
        assert_eq!(r.edge(Side::Away), Some(1.0));
        assert_eq!(r.price(Side::Away), Some(-190.0));
    }

    #[test]
    fn test_moneyline_resolvers() {
        let r = MoneylineResolvers {
            home_win_probability: Some(0.55),
            h2h_home: Some(-110.0),
            h2h_away: Some(-110.0),
        };
        assert_eq!(r.edge(Side::Home), Some(0.05));
        assert_eq!(r.edge(Side::Away), Some(-0.05));
        assert_eq!(r.line(Side::Home), None);
        assert_eq!(r.fair_price(Side::Away), Some(122.0));
    }
}
