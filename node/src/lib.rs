use arcade_execution::{DriftProfile, DriftRange, LayerConfig, MarketConfig};
use arcade_types::{
    casino::{
        CLIMB_TICK_MILLIS, CLIMB_WINDOW_SECS, DUEL_WINDOW_SECS, MIN_WAGER, PICK_POSITIONS,
        PICK_WINDOW_SECS,
    },
    Amount, Decimal,
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;
use tracing::Level;

pub mod console;
pub mod engine;

/// Prices are kept in cents, so the floor must be at least one.
const MIN_FLOOR: f64 = 0.01;

/// Configuration for the [engine::Engine].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub directory: String,
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,

    #[serde(default = "default_min_wager")]
    pub min_wager: Amount,
    #[serde(default = "default_duel_window_secs")]
    pub duel_window_secs: u64,
    #[serde(default = "default_pick_window_secs")]
    pub pick_window_secs: u64,
    #[serde(default = "default_pick_positions")]
    pub pick_positions: u8,
    #[serde(default = "default_climb_window_secs")]
    pub climb_window_secs: u64,
    #[serde(default = "default_climb_tick_millis")]
    pub climb_tick_millis: u64,

    #[serde(default)]
    pub market: MarketSettings,

    #[serde(default = "default_reaper_interval_secs")]
    pub reaper_interval_secs: u64,
    /// Fixed seed for reproducible runs; entropy when absent.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

/// Market section of the configuration file.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MarketSettings {
    pub period_secs: u64,
    pub history_capacity: usize,
    pub floor: f64,
    /// Symmetric drift applied every day, e.g. 0.08 for ±8%.
    pub drift: f64,
    /// Optional weekend drift; weekdays then use `drift`.
    #[serde(default)]
    pub weekend_drift: Option<f64>,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            period_secs: 300,
            history_capacity: 288,
            floor: 1.0,
            drift: 0.08,
            weekend_drift: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

pub struct ValidatedConfig {
    pub directory: PathBuf,
    pub log_level: Level,
    pub json_logs: bool,
    pub layer: LayerConfig,
    pub climb_tick: Duration,
    pub reaper_interval: Duration,
    pub rng_seed: Option<u64>,
}

fn default_min_wager() -> Amount {
    MIN_WAGER
}

fn default_duel_window_secs() -> u64 {
    DUEL_WINDOW_SECS
}

fn default_pick_window_secs() -> u64 {
    PICK_WINDOW_SECS
}

fn default_pick_positions() -> u8 {
    PICK_POSITIONS
}

fn default_climb_window_secs() -> u64 {
    CLIMB_WINDOW_SECS
}

fn default_climb_tick_millis() -> u64 {
    CLIMB_TICK_MILLIS
}

fn default_reaper_interval_secs() -> u64 {
    15
}

fn non_zero(field: &'static str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidNonZero { field, value });
    }
    Ok(value)
}

fn drift(field: &'static str, value: f64) -> Result<DriftRange, ConfigError> {
    if !(0.0..1.0).contains(&value) {
        return Err(ConfigError::OutOfRange { field, value });
    }
    Ok(DriftRange::symmetric(value))
}

impl MarketSettings {
    fn validate(&self) -> Result<MarketConfig, ConfigError> {
        let period_secs = non_zero("market.period_secs", self.period_secs)?;
        non_zero("market.history_capacity", self.history_capacity as u64)?;
        if !self.floor.is_finite() || self.floor < MIN_FLOOR {
            return Err(ConfigError::OutOfRange {
                field: "market.floor",
                value: self.floor,
            });
        }
        let weekday = drift("market.drift", self.drift)?;
        let drift = match self.weekend_drift {
            Some(weekend) => DriftProfile::Weekly {
                weekday,
                weekend: drift("market.weekend_drift", weekend)?,
            },
            None => DriftProfile::Constant(weekday),
        };
        Ok(MarketConfig {
            period: Duration::from_secs(period_secs),
            history_capacity: self.history_capacity,
            floor: Decimal::from_f64(self.floor),
            drift,
        })
    }
}

impl Config {
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;
        non_zero("min_wager", self.min_wager)?;
        non_zero("duel_window_secs", self.duel_window_secs)?;
        non_zero("pick_window_secs", self.pick_window_secs)?;
        non_zero("pick_positions", self.pick_positions as u64)?;
        non_zero("climb_window_secs", self.climb_window_secs)?;
        let climb_tick_millis = non_zero("climb_tick_millis", self.climb_tick_millis)?;
        let reaper_interval_secs = non_zero("reaper_interval_secs", self.reaper_interval_secs)?;
        let market = self.market.validate()?;

        Ok(ValidatedConfig {
            directory: PathBuf::from(self.directory),
            log_level,
            json_logs: self.json_logs,
            layer: LayerConfig {
                min_wager: self.min_wager,
                duel_window_secs: self.duel_window_secs,
                pick_window_secs: self.pick_window_secs,
                pick_positions: self.pick_positions,
                climb_window_secs: self.climb_window_secs,
                market,
            },
            climb_tick: Duration::from_millis(climb_tick_millis),
            reaper_interval: Duration::from_secs(reaper_interval_secs),
            rng_seed: self.rng_seed,
        })
    }
}

#[cfg(test)]
mod tests;
