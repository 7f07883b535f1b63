//! Service configuration
//!
//! Values come from `PROFILE_*` environment variables layered over defaults,
//! e.g. `PROFILE_UPLOAD_DIR=/srv/static/uploads/profiles`.

use std::path::PathBuf;

use chrono_tz::Tz;
use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::reconcile::DEFAULT_MAX_DAILY_GENERATIONS;

/// Profile service settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Directory uploaded profile images are written to
    pub upload_dir: PathBuf,
    /// Public path under which the serving layer exposes `upload_dir`
    pub public_prefix: String,
    /// Daily generation quota reported to clients
    pub max_daily_generations: u32,
    /// IANA timezone that defines the calendar day for quotas
    pub timezone: String,
}

impl ProfileConfig {
    /// Load settings from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:3001")?
            .set_default("upload_dir", "static/uploads/profiles")?
            .set_default("public_prefix", "/static/uploads/profiles")?
            .set_default(
                "max_daily_generations",
                i64::from(DEFAULT_MAX_DAILY_GENERATIONS),
            )?
            .set_default("timezone", "Asia/Seoul")?
            .add_source(Environment::with_prefix("PROFILE").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Parsed reference timezone
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::Message(format!("Invalid timezone {}: {}", self.timezone, e)))
    }
}
