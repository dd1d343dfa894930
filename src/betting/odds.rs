use std::fmt;

/// Errors raised by the odds and EV math
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BetError {
    #[error("Invalid American odds: {0} (must be non-zero)")]
    InvalidOdds(i32),

    #[error("Invalid probability: {0} (must be within [0, 1])")]
    InvalidProbability(f64),

    #[error("Invalid stake: {0} (must be positive)")]
    InvalidStake(f64),
}

/// American sportsbook odds quote.
///
/// Positive values quote the profit on a 100 stake (+150 wins 150),
/// negative values quote the stake needed to profit 100 (-150 risks 150).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AmericanOdds(i32);

impl AmericanOdds {
    pub fn new(odds: i32) -> Result<Self, BetError> {
        if odds == 0 {
            return Err(BetError::InvalidOdds(odds));
        }
        Ok(Self(odds))
    }

    pub fn value(self) -> i32 {
        self.0
    }

    /// Sportsbooks never quote magnitudes below 100
    pub fn is_conventional(self) -> bool {
        self.0.unsigned_abs() >= 100
    }

    /// Break-even win probability embedded in the quote, in (0, 1]
    pub fn implied_probability(self) -> f64 {
        if self.0 > 0 {
            100.0 / (self.0 as f64 + 100.0)
        } else {
            let magnitude = self.0.unsigned_abs() as f64;
            magnitude / (magnitude + 100.0)
        }
    }

    /// Profit returned per unit staked when the bet wins
    pub fn profit_per_unit(self) -> f64 {
        if self.0 > 0 {
            self.0 as f64 / 100.0
        } else {
            100.0 / self.0.unsigned_abs() as f64
        }
    }
}

impl TryFrom<i32> for AmericanOdds {
    type Error = BetError;

    fn try_from(odds: i32) -> Result<Self, Self::Error> {
        Self::new(odds)
    }
}

impl fmt::Display for AmericanOdds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

/// Convert American odds to implied probability.
/// +150 -> 0.400, -150 -> 0.600, 0 is rejected.
pub fn american_odds_to_probability(odds: i32) -> Result<f64, BetError> {
    Ok(AmericanOdds::new(odds)?.implied_probability())
}

/// Fair (zero-vig) American odds for a win probability in (0, 1)
pub fn probability_to_american_odds(prob: f64) -> Result<i32, BetError> {
    if !prob.is_finite() || prob <= 0.0 || prob >= 1.0 {
        return Err(BetError::InvalidProbability(prob));
    }

    let odds = if prob >= 0.5 {
        // Favorite
        -(100.0 * prob / (1.0 - prob)).round()
    } else {
        // Underdog
        (100.0 * (1.0 - prob) / prob).round()
    };

    // Probabilities within f64 epsilon of 0 or 1 overflow the quote
    if odds.abs() > i32::MAX as f64 {
        return Err(BetError::InvalidProbability(prob));
    }

    Ok(odds as i32)
}

pub(crate) fn validate_probability(prob: f64) -> Result<f64, BetError> {
    if !(0.0..=1.0).contains(&prob) {
        return Err(BetError::InvalidProbability(prob));
    }
    Ok(prob)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_odds_are_coin_flip() {
        assert_eq!(american_odds_to_probability(100).unwrap(), 0.5);
        assert_eq!(american_odds_to_probability(-100).unwrap(), 0.5);
    }

    #[test]
    fn test_underdog_and_favorite() {
        assert!((american_odds_to_probability(200).unwrap() - 0.3333).abs() < 0.0001);
        assert!((american_odds_to_probability(150).unwrap() - 0.4).abs() < 1e-12);
        assert!((american_odds_to_probability(-150).unwrap() - 0.6).abs() < 1e-12);
        assert!((american_odds_to_probability(-400).unwrap() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_zero_odds_rejected() {
        assert_eq!(
            american_odds_to_probability(0),
            Err(BetError::InvalidOdds(0))
        );
        assert!(AmericanOdds::try_from(0).is_err());
    }

    #[test]
    fn test_probability_in_open_closed_unit_interval() {
        for odds in [i32::MIN + 1, -10_000, -101, -1, 1, 101, 10_000, i32::MAX] {
            let p = american_odds_to_probability(odds).unwrap();
            assert!(p > 0.0 && p <= 1.0, "odds {} gave {}", odds, p);
        }
    }

    #[test]
    fn test_extreme_negative_odds_do_not_overflow() {
        let p = american_odds_to_probability(i32::MIN).unwrap();
        assert!(p > 0.99 && p <= 1.0);
    }

    #[test]
    fn test_conventional_magnitude() {
        assert!(AmericanOdds::new(100).unwrap().is_conventional());
        assert!(AmericanOdds::new(-110).unwrap().is_conventional());
        assert!(!AmericanOdds::new(50).unwrap().is_conventional());
        assert!(!AmericanOdds::new(-99).unwrap().is_conventional());
    }

    #[test]
    fn test_profit_per_unit() {
        assert!((AmericanOdds::new(150).unwrap().profit_per_unit() - 1.5).abs() < 1e-12);
        assert!((AmericanOdds::new(-200).unwrap().profit_per_unit() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_display_is_signed() {
        assert_eq!(AmericanOdds::new(150).unwrap().to_string(), "+150");
        assert_eq!(AmericanOdds::new(-110).unwrap().to_string(), "-110");
    }

    #[test]
    fn test_probability_to_american_odds() {
        assert_eq!(probability_to_american_odds(0.5).unwrap(), -100);
        assert_eq!(probability_to_american_odds(0.4).unwrap(), 150);
        assert_eq!(probability_to_american_odds(0.6).unwrap(), -150);
        assert_eq!(probability_to_american_odds(0.25).unwrap(), 300);
    }

    #[test]
    fn test_probability_to_american_odds_round_trip() {
        for odds in [-400, -150, -110, 100, 120, 250] {
            let p = american_odds_to_probability(odds).unwrap();
            let back = probability_to_american_odds(p).unwrap();
            // +100 and -100 quote the same price
            if odds.abs() == 100 {
                assert_eq!(back.abs(), 100);
            } else {
                assert_eq!(back, odds);
            }
        }
    }

    #[test]
    fn test_probability_to_american_odds_rejects_bounds() {
        assert!(probability_to_american_odds(0.0).is_err());
        assert!(probability_to_american_odds(1.0).is_err());
        assert!(probability_to_american_odds(-0.2).is_err());
        assert!(probability_to_american_odds(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_probability() {
        assert!(validate_probability(0.0).is_ok());
        assert!(validate_probability(1.0).is_ok());
        assert!(validate_probability(1.01).is_err());
        assert!(validate_probability(f64::NAN).is_err());
    }
}
