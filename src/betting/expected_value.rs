use crate::betting::odds::{validate_probability, AmericanOdds, BetError};

/// Stake used when the caller does not quote one ($1)
pub const DEFAULT_STAKE: f64 = 1.0;

/// A validated wager: model probability, offered odds and stake
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bet {
    true_prob: f64,
    odds: AmericanOdds,
    stake: f64,
}

impl Bet {
    pub fn new(true_prob: f64, odds: i32, stake: f64) -> Result<Self, BetError> {
        let true_prob = validate_probability(true_prob)?;
        if !stake.is_finite() || stake <= 0.0 {
            return Err(BetError::InvalidStake(stake));
        }
        let odds = AmericanOdds::new(odds)?;

        Ok(Self {
            true_prob,
            odds,
            stake,
        })
    }

    pub fn true_prob(&self) -> f64 {
        self.true_prob
    }

    pub fn odds(&self) -> AmericanOdds {
        self.odds
    }

    pub fn stake(&self) -> f64 {
        self.stake
    }

    pub fn profit_if_win(&self) -> f64 {
        self.stake * self.odds.profit_per_unit()
    }

    /// EV = p * profit - (1 - p) * stake
    pub fn expected_value(&self) -> f64 {
        self.true_prob * self.profit_if_win() - (1.0 - self.true_prob) * self.stake
    }

    /// EV per unit staked
    pub fn expected_roi(&self) -> f64 {
        self.expected_value() / self.stake
    }

    /// Model probability minus the probability implied by the odds
    pub fn edge(&self) -> f64 {
        self.true_prob - self.odds.implied_probability()
    }
}

/// Compute the EV of a bet with a given true probability and American odds,
/// for a given stake (use [`DEFAULT_STAKE`] for the $1 case).
pub fn expected_value(true_prob: f64, odds: i32, stake: f64) -> Result<f64, BetError> {
    Ok(Bet::new(true_prob, odds, stake)?.expected_value())
}

/// Positive edge means the book is underpricing the outcome
pub fn edge(true_prob: f64, odds: i32) -> Result<f64, BetError> {
    Ok(Bet::new(true_prob, odds, DEFAULT_STAKE)?.edge())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::betting::odds::american_odds_to_probability;

    #[test]
    fn test_fair_even_odds_have_zero_ev() {
        let ev = expected_value(0.5, 100, DEFAULT_STAKE).unwrap();
        assert!(ev.abs() < 1e-12);
    }

    #[test]
    fn test_plus_150_example() {
        // profit_if_win = 1.5, EV = 0.45 * 1.5 - 0.55 * 1 = 0.125
        let bet = Bet::new(0.45, 150, 1.0).unwrap();
        assert!((bet.profit_if_win() - 1.5).abs() < 1e-12);
        assert!((bet.expected_value() - 0.125).abs() < 1e-12);
        assert!((bet.expected_roi() - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_bet_exposes_validated_inputs() {
        let bet = Bet::new(0.55, -110, 25.0).unwrap();
        assert_eq!(bet.true_prob(), 0.55);
        assert_eq!(bet.odds().value(), -110);
        assert_eq!(bet.stake(), 25.0);

        // Every Bet goes through the checks in Bet::new
        assert!(Bet::new(2.0, -110, 25.0).is_err());
        assert!(Bet::new(0.55, -110, -1.0).is_err());
    }

    #[test]
    fn test_negative_odds_profit() {
        // -200 pays 0.5 per unit: EV = 0.6 * 5 - 0.4 * 10 = -1.0
        let ev = expected_value(0.6, -200, 10.0).unwrap();
        assert!((ev - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_break_even_probability_yields_zero_ev() {
        for odds in [-1000, -250, -150, -110, -100, 100, 105, 150, 300, 2500] {
            let p = american_odds_to_probability(odds).unwrap();
            for stake in [0.5, 1.0, 37.0] {
                let ev = expected_value(p, odds, stake).unwrap();
                assert!(ev.abs() < 1e-9, "odds {} stake {} ev {}", odds, stake, ev);
            }
        }
    }

    #[test]
    fn test_linear_in_stake() {
        for (p, odds) in [(0.45, 150), (0.7, -180), (0.1, 900), (1.0, -110)] {
            let base = expected_value(p, odds, 2.0).unwrap();
            for k in [0.25, 1.0, 3.0, 100.0] {
                let scaled = expected_value(p, odds, 2.0 * k).unwrap();
                assert!((scaled - k * base).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_certain_outcomes() {
        // A sure loss costs the whole stake, a sure win pays the full profit
        assert!((expected_value(0.0, 150, 4.0).unwrap() + 4.0).abs() < 1e-12);
        assert!((expected_value(1.0, 150, 4.0).unwrap() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_edge_sign_matches_ev_sign() {
        assert!(edge(0.45, 150).unwrap() > 0.0);
        assert!(expected_value(0.45, 150, 1.0).unwrap() > 0.0);

        assert!(edge(0.35, 150).unwrap() < 0.0);
        assert!(expected_value(0.35, 150, 1.0).unwrap() < 0.0);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert_eq!(
            expected_value(0.5, 0, 1.0),
            Err(BetError::InvalidOdds(0))
        );
        assert_eq!(
            expected_value(1.2, 150, 1.0),
            Err(BetError::InvalidProbability(1.2))
        );
        assert_eq!(
            expected_value(-0.1, 150, 1.0),
            Err(BetError::InvalidProbability(-0.1))
        );
        assert_eq!(
            expected_value(0.5, 150, 0.0),
            Err(BetError::InvalidStake(0.0))
        );
        assert_eq!(
            expected_value(0.5, 150, -5.0),
            Err(BetError::InvalidStake(-5.0))
        );
        assert!(expected_value(0.5, 150, f64::INFINITY).is_err());
        assert!(expected_value(f64::NAN, 150, 1.0).is_err());
    }
}
