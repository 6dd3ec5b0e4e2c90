/// Engine defaults shared across crates
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Forward search span used to decide whether an item is still upcoming.
pub const DEFAULT_HORIZON_DAYS: i64 = 365;

/// Elapsed time after the last occurrence before a one-off item may be cleaned up.
pub const DEFAULT_GRACE_PERIOD_DAYS: i64 = 30;

/// Upper bound on occurrences produced by a single expansion.
pub const DEFAULT_MAX_INSTANCES: u16 = 1000;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Prefix for environment variable overrides, e.g. `HERALD__ENGINE__TIMEZONE`.
pub const ENV_PREFIX: &str = "HERALD";

pub const CONFIG_FILE_NAME: &str = "herald.toml";

/// Upper bound on raw occurrences walked by one query of a rule.
pub const MAX_SCANNED_OCCURRENCES: usize = 1_000_000;

/// Largest accepted horizon or grace period, roughly a century.
pub const MAX_SPAN_DAYS: i64 = 36_525;
