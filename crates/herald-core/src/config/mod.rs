use anyhow::Result;
use chrono::TimeDelta;
use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_GRACE_PERIOD_DAYS, DEFAULT_HORIZON_DAYS, DEFAULT_LOG_LEVEL,
    DEFAULT_MAX_INSTANCES, DEFAULT_TIMEZONE, ENV_PREFIX, MAX_SPAN_DAYS,
};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

/// Parameters handed to the occurrence engine at construction time.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Zone whose wall clock defines "today" and floating rule times.
    pub timezone: String,
    pub horizon_days: i64,
    pub grace_period_days: i64,
    pub max_instances: u16,
}

impl EngineConfig {
    /// ## Summary
    /// Returns the forward search span for upcoming occurrences.
    ///
    /// Saturates at `TimeDelta::MAX` for values that were never validated.
    #[must_use]
    pub fn horizon(&self) -> TimeDelta {
        TimeDelta::try_days(self.horizon_days).unwrap_or(TimeDelta::MAX)
    }

    /// ## Summary
    /// Returns the retention grace period.
    #[must_use]
    pub fn grace_period(&self) -> TimeDelta {
        TimeDelta::try_days(self.grace_period_days).unwrap_or(TimeDelta::MAX)
    }

    /// ## Summary
    /// Checks the numeric bounds of the configuration.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` if the horizon is not in
    /// `1..=MAX_SPAN_DAYS`, the grace period is not in `0..=MAX_SPAN_DAYS`,
    /// or `max_instances` is zero.
    pub fn validate(&self) -> CoreResult<()> {
        if !(1..=MAX_SPAN_DAYS).contains(&self.horizon_days) {
            return Err(CoreError::ConfigError(format!(
                "engine.horizon_days must be between 1 and {MAX_SPAN_DAYS}, got {}",
                self.horizon_days
            )));
        }
        if !(0..=MAX_SPAN_DAYS).contains(&self.grace_period_days) {
            return Err(CoreError::ConfigError(format!(
                "engine.grace_period_days must be between 0 and {MAX_SPAN_DAYS}, got {}",
                self.grace_period_days
            )));
        }
        if self.max_instances == 0 {
            return Err(CoreError::ConfigError(
                "engine.max_instances must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            horizon_days: DEFAULT_HORIZON_DAYS,
            grace_period_days: DEFAULT_GRACE_PERIOD_DAYS,
            max_instances: DEFAULT_MAX_INSTANCES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Returns a configuration builder pre-populated with the engine defaults.
    ///
    /// ## Errors
    /// Returns an error if a default value cannot be set.
    pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("engine.timezone", DEFAULT_TIMEZONE)?
            .set_default("engine.horizon_days", DEFAULT_HORIZON_DAYS)?
            .set_default("engine.grace_period_days", DEFAULT_GRACE_PERIOD_DAYS)?
            .set_default("engine.max_instances", i64::from(DEFAULT_MAX_INSTANCES))?
            .set_default("logging.level", DEFAULT_LOG_LEVEL)?)
    }

    /// ## Summary
    /// Loads configuration from `herald.toml` and environment variables into a `Settings`.
    /// Environment variables (`HERALD__ENGINE__TIMEZONE`, ...) take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        let settings = Self::builder_with_defaults()?
            // TOML file
            .add_source(config::File::with_name(CONFIG_FILE_NAME).required(false))
            // Env
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.engine.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Builds `Settings` from TOML text layered over the defaults.
    ///
    /// ## Errors
    /// Returns an error if the text is not valid TOML, does not deserialize,
    /// or fails validation.
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings = Self::builder_with_defaults()?
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.engine.validate()?;
        Ok(settings)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    tracing::debug!(
        timezone = %settings.engine.timezone,
        horizon_days = settings.engine.horizon_days,
        grace_period_days = settings.engine.grace_period_days,
        "Engine configuration loaded"
    );
    Ok(settings)
}
