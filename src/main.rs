use anyhow::{Context, Result};
use stadium_ev::betting::{self, Bet};
use stadium_ev::config::{Config, EnvConfig};
use stadium_ev::data::{DateRange, WeatherHistoryClient};
use stadium_ev::monitoring::CsvLogger;

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!("Loading configuration...");
    let env_config = EnvConfig::load();
    let mut config = Config::load_or_default(CONFIG_PATH)?;
    config.apply_env(&env_config);
    config.validate()?;

    let csv_logger = if config.monitoring.csv_logging {
        tracing::info!("CSV logging to {}", config.monitoring.csv_log_path);
        Some(CsvLogger::new(config.monitoring.csv_log_path.clone())?)
    } else {
        None
    };

    // Break-even and EV for the configured example bet
    let odds = config.betting.odds()?;
    let model_prob = config.betting.model_probability;
    let stake = config.betting.stake;

    if !odds.is_conventional() {
        tracing::warn!("Odds {} are below the usual 100 magnitude", odds);
    }

    let break_even = betting::american_odds_to_probability(odds.value())?;
    println!("Break-even probability for {} is {:.3}", odds, break_even);

    let ev = betting::expected_value(model_prob, odds.value(), stake)?;
    println!("EV for {} with true p={:.2} is ${:.3}", odds, model_prob, ev);

    // Certain outcomes (p = 0 or 1) have no finite fair quote
    let fair_odds = betting::probability_to_american_odds(model_prob)
        .map(|o| format!("{:+}", o))
        .unwrap_or_else(|_| "n/a".to_string());
    tracing::info!(
        "Model fair odds {}, edge {:+.1}%, expected ROI {:+.1}%",
        fair_odds,
        betting::edge(model_prob, odds.value())? * 100.0,
        ev / stake * 100.0
    );

    if let Some(logger) = &csv_logger {
        logger.log_bet(&Bet::new(model_prob, odds.value(), stake)?)?;
    }

    // Optional weather history lookup
    let (Some(start), Some(end)) = (&env_config.start_date, &env_config.end_date) else {
        tracing::info!("WEATHER_START_DATE / WEATHER_END_DATE not set, skipping weather lookup");
        return Ok(());
    };

    let client = WeatherHistoryClient::new(&config.weather)?;
    let location = client.location();
    let series = client
        .fetch_daily_min_temperatures_str(start, end, None)
        .await
        .with_context(|| {
            format!(
                "Failed to fetch daily minimum temperatures at ({}, {}) for {} to {}",
                location.latitude(),
                location.longitude(),
                start,
                end
            )
        })?;

    println!("date,min_temp_c");
    for entry in &series {
        println!("{},{:.1}", entry.date, entry.min_temp_c);
    }
    tracing::info!(
        "Coldest day {} at {:.1}°C, mean daily minimum {:.1}°C",
        series.min().date,
        series.min().min_temp_c,
        series.mean()
    );

    let range = DateRange::parse(start, end)?;
    let missing = series.missing_dates(&range);
    if !missing.is_empty() {
        println!("# {} day(s) without a reading", missing.len());
    }

    if let Some(logger) = &csv_logger {
        logger.log_series(&series)?;
    }

    Ok(())
}
