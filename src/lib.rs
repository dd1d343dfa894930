//! Historical stadium weather lookups and sportsbook odds / EV math.
//!
//! The two halves are independent: [`data`] pulls daily minimum temperatures
//! from the Open-Meteo archive, [`betting`] converts American odds and prices
//! wagers.

pub mod betting;
pub mod config;
pub mod data;
pub mod monitoring;
