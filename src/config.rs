use chrono::{FixedOffset, Offset, Utc};
use std::str::FromStr;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/barbershop";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SLOT_INTERVAL_MINUTES: u32 = 15;
const DEFAULT_MONTHLY_SAMPLE_MINUTES: u32 = 15;

/// Scheduling knobs shared by every service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingConfig {
    /// Step between candidate start times
    pub slot_interval_minutes: u32,
    /// Duration checked by the monthly view when the barber has no activity
    pub monthly_sample_minutes: u32,
    /// Offset of the wall clock that work hours are expressed in
    pub utc_offset: FixedOffset,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            slot_interval_minutes: DEFAULT_SLOT_INTERVAL_MINUTES,
            monthly_sample_minutes: DEFAULT_MONTHLY_SAMPLE_MINUTES,
            utc_offset: utc(),
        }
    }
}

/// Process configuration read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub scheduling: SchedulingConfig,
}

impl AppConfig {
    /// Read every setting from the environment.
    ///
    /// Missing values take their defaults. Unparsable values are logged and
    /// also fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let database_max_connections = parse_positive(
            &lookup,
            "DATABASE_MAX_CONNECTIONS",
            DEFAULT_MAX_CONNECTIONS,
        );
        let slot_interval_minutes =
            parse_positive(&lookup, "SLOT_INTERVAL_MINUTES", DEFAULT_SLOT_INTERVAL_MINUTES);
        let monthly_sample_minutes =
            parse_positive(&lookup, "MONTHLY_SAMPLE_MINUTES", DEFAULT_MONTHLY_SAMPLE_MINUTES);

        let utc_offset = match lookup("SHOP_UTC_OFFSET_MINUTES") {
            None => utc(),
            Some(raw) => i32::from_str(raw.trim())
                .ok()
                .and_then(|minutes| minutes.checked_mul(60))
                .and_then(FixedOffset::east_opt)
                .unwrap_or_else(|| {
                    tracing::warn!(
                        key = "SHOP_UTC_OFFSET_MINUTES",
                        value = %raw,
                        "Invalid UTC offset, using UTC"
                    );
                    utc()
                }),
        };

        Self {
            database_url,
            database_max_connections,
            scheduling: SchedulingConfig {
                slot_interval_minutes,
                monthly_sample_minutes,
                utc_offset,
            },
        }
    }
}

fn parse_positive(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> u32 {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match u32::from_str(raw.trim()) {
        Ok(value) if value > 0 => value,
        _ => {
            tracing::warn!(key, value = %raw, default, "Invalid setting, using default");
            default
        }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}
