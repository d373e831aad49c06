//! Tushare daily sync constants.

/// Tushare Pro HTTP endpoint. Every operation is a POST of
/// `{api_name, token, params}` against this single URL.
pub const TUSHARE_API_URL: &str = "https://api.tushare.pro";

/// Delay enforced between successive API calls, in milliseconds.
pub const DEFAULT_PACING_MS: u64 = 800;

/// Request timeout for Tushare calls, in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Number of positional fields in a raw `daily` response row.
pub const DAILY_FIELD_COUNT: usize = 11;

/// Positional indices of the raw `daily` response row (0-indexed).
pub mod daily_field {
    pub const TS_CODE: usize = 0;
    pub const TRADE_DATE: usize = 1;
    pub const OPEN: usize = 2;
    pub const HIGH: usize = 3;
    pub const LOW: usize = 4;
    pub const CLOSE: usize = 5;
    pub const PRE_CLOSE: usize = 6;
    pub const CHANGE: usize = 7;
    pub const PCT_CHG: usize = 8;
    pub const VOL: usize = 9;
    pub const AMOUNT: usize = 10;
}

/// Destination column names, in insert order. `date_stamp` is derived from
/// `trade_date` at transform time and has no counterpart in the raw row.
pub mod column {
    pub const TS_CODE: &str = "ts_code";
    pub const TRADE_DATE: &str = "trade_date";
    pub const OPEN: &str = "open";
    pub const HIGH: &str = "high";
    pub const LOW: &str = "low";
    pub const CLOSE: &str = "close";
    pub const PRE_CLOSE: &str = "pre_close";
    pub const CHANGE: &str = "change";
    pub const PCT_CHG: &str = "pct_chg";
    pub const VOL: &str = "vol";
    pub const AMOUNT: &str = "amount";
    pub const DATE_STAMP: &str = "date_stamp";
}

/// Smoke-test universe used when the instrument listing returns nothing and
/// the config does not set `fallback_codes`.
pub const DEFAULT_FALLBACK_CODES: &[&str] = &["000001.SZ", "600519.SH"];
