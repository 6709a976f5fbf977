use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::simulator::SimulationSettings;

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub data_dir: PathBuf,
    /// When set, snapshots go to Redis instead of `data_dir`.
    pub redis_url: Option<String>,
    /// Keep snapshots in process memory only. Takes precedence over Redis and files.
    pub ephemeral_storage: bool,
    pub seed_mock_data: bool,
    pub rng_seed: Option<u64>,
    pub simulation: SimulationSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let simulation = SimulationSettings {
            upload_tick: Duration::from_millis(parse_env("UPLOAD_TICK_MS", 200)?),
            upload_ticks_per_file: parse_env("UPLOAD_TICKS_PER_FILE", 5)?,
            batch_size: parse_env("ANALYSIS_BATCH_SIZE", 10)?,
            success_rate: parse_env("ANALYSIS_SUCCESS_RATE", 0.95)?,
            base_delay: Duration::from_millis(parse_env("ANALYSIS_BASE_DELAY_MS", 1500)?),
            jitter: Duration::from_millis(parse_env("ANALYSIS_JITTER_MS", 1000)?),
            stagger: Duration::from_millis(parse_env("ANALYSIS_STAGGER_MS", 200)?),
            item_timeout: Duration::from_millis(parse_env("ANALYSIS_ITEM_TIMEOUT_MS", 30_000)?),
        };

        if simulation.batch_size == 0 {
            anyhow::bail!("ANALYSIS_BATCH_SIZE must be at least 1");
        }
        if !(0.0..=1.0).contains(&simulation.success_rate) {
            anyhow::bail!("ANALYSIS_SUCCESS_RATE must be within 0.0..=1.0");
        }

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            ephemeral_storage: parse_env("EPHEMERAL_STORAGE", false)?,
            seed_mock_data: parse_env("SEED_MOCK_DATA", true)?,
            rng_seed: optional_env("RNG_SEED")?,
            simulation,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(optional_env(key)?.unwrap_or(default))
}

fn optional_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(None),
    }
}
