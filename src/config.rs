// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Crowdcore", "crowdcore"));

/// Platform knobs consumed by the core. Everything is externally supplied
/// via `CROWDCORE_*` environment variables and defaulted if absent.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one snapshot document per collection.
    pub data_dir: PathBuf,
    /// Currency wallets are denominated in.
    pub base_currency: String,
    /// Time-to-live of a one-time code.
    pub otp_ttl: Duration,
    /// Interval between expiry sweeps of the one-time-code cache.
    pub otp_sweep_interval: Duration,
    pub min_investment: Decimal,
    pub max_investment: Decimal,
    pub min_withdrawal: Decimal,
    /// Lower bound fed to the randomized return policy.
    pub base_success_rate: u8,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let data_dir = match std::env::var("CROWDCORE_DATA_DIR") {
            Ok(p) => PathBuf::from(p),
            Err(_) => default_data_dir()?,
        };
        Ok(Self {
            data_dir,
            base_currency: env_or("CROWDCORE_BASE_CURRENCY", "USD"),
            otp_ttl: Duration::from_secs(env_parse("CROWDCORE_OTP_TTL_SECS", 600)?),
            otp_sweep_interval: Duration::from_secs(env_parse("CROWDCORE_OTP_SWEEP_SECS", 60)?),
            min_investment: env_parse("CROWDCORE_MIN_INVESTMENT", Decimal::from(10))?,
            max_investment: env_parse("CROWDCORE_MAX_INVESTMENT", Decimal::from(1_000_000))?,
            min_withdrawal: env_parse("CROWDCORE_MIN_WITHDRAWAL", Decimal::from(25))?,
            base_success_rate: env_parse("CROWDCORE_BASE_SUCCESS_RATE", 50u8)?,
        })
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let proj = directories::ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    Ok(proj.data_dir().to_path_buf())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}
