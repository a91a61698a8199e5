//! Runtime configuration resolved from the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use stocksim_warehouse::{resolve_stocksim_home, WarehouseConfig};

use crate::ValidationError;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(5_000);
pub const TICK_INTERVAL_ENV: &str = "STOCKSIM_TICK_INTERVAL_MS";

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Root for stocksim data (`$STOCKSIM_HOME`, default `~/.stocksim`).
    pub home: PathBuf,
    /// Explicit database file; defaults to `<home>/data/stocksim.duckdb`.
    pub db_path: Option<PathBuf>,
    /// Keep everything in memory instead of opening a database file.
    pub in_memory: bool,
    pub tick_interval: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            home: resolve_stocksim_home(),
            db_path: None,
            in_memory: false,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl SimConfig {
    pub fn from_env() -> Result<Self, ValidationError> {
        let mut config = Self::default();
        if let Ok(raw) = env::var(TICK_INTERVAL_ENV) {
            config.tick_interval = parse_tick_interval(&raw)?;
        }
        Ok(config)
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = home.into();
        self
    }

    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(db_path.into());
        self
    }

    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn warehouse_config(&self) -> WarehouseConfig {
        let mut config = WarehouseConfig::for_home(&self.home);
        if let Some(db_path) = &self.db_path {
            config.db_path = db_path.clone();
        }
        config
    }
}

/// Milliseconds, strictly positive.
pub fn parse_tick_interval(raw: &str) -> Result<Duration, ValidationError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ValidationError::InvalidTickInterval {
            value: raw.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_interval_must_be_positive_millis() {
        assert_eq!(parse_tick_interval("250"), Ok(Duration::from_millis(250)));
        assert!(parse_tick_interval("0").is_err());
        assert!(parse_tick_interval("fast").is_err());
    }

    #[test]
    fn explicit_db_path_overrides_home_layout() {
        let config = SimConfig::default()
            .with_home("/tmp/sim-home")
            .with_db_path("/tmp/other.duckdb");
        let warehouse = config.warehouse_config();
        assert_eq!(warehouse.stocksim_home, PathBuf::from("/tmp/sim-home"));
        assert_eq!(warehouse.db_path, PathBuf::from("/tmp/other.duckdb"));

        let default_layout = SimConfig::default().with_home("/tmp/sim-home").warehouse_config();
        assert_eq!(
            default_layout.db_path,
            PathBuf::from("/tmp/sim-home/data/stocksim.duckdb")
        );
    }
}
