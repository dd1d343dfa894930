use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::betting::Bet;
use crate::data::types::DailyTemperatureSeries;

const HEADER: &str = "timestamp,kind,odds,true_prob,stake,implied_prob,ev,date,min_temp_c";

/// Append-only CSV trail of EV evaluations and fetched temperatures
pub struct CsvLogger {
    log_path: String,
}

impl CsvLogger {
    pub fn new(log_path: String) -> Result<Self> {
        // Create CSV file with headers if it doesn't exist
        if !Path::new(&log_path).exists() {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .open(&log_path)
                .with_context(|| format!("Failed to create CSV log: {}", log_path))?;

            writeln!(file, "{}", HEADER)?;
        }

        Ok(Self { log_path })
    }

    /// Log one EV evaluation
    pub fn log_bet(&self, bet: &Bet) -> Result<()> {
        let mut file = self.open()?;

        writeln!(
            file,
            "{},ev,{},{:.4},{:.2},{:.4},{:.4},,",
            Utc::now().to_rfc3339(),
            bet.odds(),
            bet.true_prob(),
            bet.stake(),
            bet.odds().implied_probability(),
            bet.expected_value()
        )?;

        Ok(())
    }

    /// Log one row per daily reading
    pub fn log_series(&self, series: &DailyTemperatureSeries) -> Result<()> {
        let mut file = self.open()?;
        let timestamp = Utc::now().to_rfc3339();

        for entry in series {
            writeln!(
                file,
                "{},min_temp,,,,,,{},{:.1}",
                timestamp, entry.date, entry.min_temp_c
            )?;
        }

        Ok(())
    }

    fn open(&self) -> Result<std::fs::File> {
        OpenOptions::new()
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open CSV log: {}", self.log_path))
    }
}
