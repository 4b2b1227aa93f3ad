use std::env;
use std::str::FromStr;

use anyhow::Context;

use crate::availability::{LocalZone, DEFAULT_DAYS_TO_CHECK, DEFAULT_SLOTS_TO_RETURN};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// The one local zone every wall-clock comparison happens in.
    pub zone: LocalZone,
    pub default_days_to_check: u32,
    pub default_slots_to_return: u32,
    pub max_days_to_check: u32,
    pub max_slots_to_return: u32,
    /// Whitelisted CORS origin; any origin when unset.
    pub cors_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:craftsman.db?mode=rwc".into(),
            host: "0.0.0.0".into(),
            port: 3000,
            zone: LocalZone::utc(),
            default_days_to_check: DEFAULT_DAYS_TO_CHECK,
            default_slots_to_return: DEFAULT_SLOTS_TO_RETURN,
            max_days_to_check: 60,
            max_slots_to_return: 20,
            cors_origin: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let offset_minutes: i32 = parse_var("LOCAL_UTC_OFFSET_MINUTES", 0)?;
        let zone = LocalZone::from_offset_minutes(offset_minutes).with_context(|| {
            format!("LOCAL_UTC_OFFSET_MINUTES out of range: {}", offset_minutes)
        })?;

        let config = Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            zone,
            default_days_to_check: parse_var("DEFAULT_DAYS_TO_CHECK", defaults.default_days_to_check)?,
            default_slots_to_return: parse_var(
                "DEFAULT_SLOTS_TO_RETURN",
                defaults.default_slots_to_return,
            )?,
            max_days_to_check: parse_var("MAX_DAYS_TO_CHECK", defaults.max_days_to_check)?,
            max_slots_to_return: parse_var("MAX_SLOTS_TO_RETURN", defaults.max_slots_to_return)?,
            cors_origin: env::var("CORS_ORIGIN").ok().filter(|o| !o.is_empty()),
        };

        if config.default_days_to_check > config.max_days_to_check
            || config.default_slots_to_return > config.max_slots_to_return
        {
            anyhow::bail!("default search limits exceed the configured maximums");
        }

        Ok(config)
    }

    /// Resolve the caller's limits against defaults and maximums.
    pub fn search_limits(
        &self,
        days_to_check: Option<u32>,
        slots_to_return: Option<u32>,
    ) -> Result<(u32, u32), String> {
        let days = days_to_check.unwrap_or(self.default_days_to_check);
        let slots = slots_to_return.unwrap_or(self.default_slots_to_return);
        if days == 0 || days > self.max_days_to_check {
            return Err(format!(
                "days_to_check must be between 1 and {}",
                self.max_days_to_check
            ));
        }
        if slots == 0 || slots > self.max_slots_to_return {
            return Err(format!(
                "slots_to_return must be between 1 and {}",
                self.max_slots_to_return
            ));
        }
        Ok((days, slots))
    }
}
