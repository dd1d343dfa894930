pub mod expected_value;
pub mod odds;

pub use expected_value::{edge, expected_value, Bet, DEFAULT_STAKE};
pub use odds::{american_odds_to_probability, probability_to_american_odds, AmericanOdds, BetError};
