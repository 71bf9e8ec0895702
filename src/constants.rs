//! Application-wide constants and configuration values
//!
//! This module centralizes all magic numbers and configuration constants
//! to improve maintainability and make the codebase more configurable.

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of idle connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 4;

/// Community data pack holding the club/player/league/stadium/cup name tables
pub const DEFAULT_DATA_PACK_URL: &str = "https://elrincondeldt.com/sv/rincon_v1.json";

/// User agent sent with every outgoing request
pub const USER_AGENT: &str = "SoccerverseBot/3.0";

/// Crate directory name used under the platform config/data directories
pub const APP_DIR_NAME: &str = "soccerverse_bot";

/// Default log file name
pub const LOG_FILE_NAME: &str = "soccerverse_bot.log";

/// Number of clubs returned by a search when no limit is given
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Persisted snapshot constants
pub mod snapshot {
    /// File name of the persisted data pack snapshot
    pub const FILE_NAME: &str = "soccerverse_data.json";

    /// Sub directory of the data directory holding snapshots
    pub const DIR_NAME: &str = "mappings";

    /// Format version written into the snapshot metadata
    pub const FORMAT_VERSION: &str = "3.0";
}

/// Refresh policy constants
pub mod refresh {
    use chrono::Weekday;

    /// A snapshot older than this is refreshed by the staleness check
    pub const MAX_AGE_DAYS: i64 = 7;

    /// Weekday of the recurring forced refresh
    pub const SCHEDULE_WEEKDAY: Weekday = Weekday::Sun;

    /// Local hour of the recurring forced refresh
    pub const SCHEDULE_HOUR: u32 = 3;

    /// Local minute of the recurring forced refresh
    pub const SCHEDULE_MINUTE: u32 = 0;

    /// Fixed UTC offset of the schedule (Central European Time)
    pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 1;
}

/// Retry behaviour for transient HTTP failures
pub mod retry {
    /// Attempts made after the first failed one
    pub const MAX_RETRIES: u32 = 3;

    /// First backoff delay, doubled after every retry
    pub const INITIAL_BACKOFF_MS: u64 = 250;

    /// Longest delay a server's `Retry-After` header may impose per retry
    pub const MAX_RETRY_AFTER_SECS: u64 = 10;
}

/// Amount scaling used by the in-game economy
pub mod money {
    /// Raw API amounts are expressed in 1/10000 of a dollar
    pub const RAW_UNITS_PER_DOLLAR: f64 = 10_000.0;
}
