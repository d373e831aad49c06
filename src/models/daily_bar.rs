use serde::{Deserialize, Serialize};

/// One daily OHLCV bar in destination form.
///
/// `date_stamp` is derived from `trade_date` at transform time and is 0.0
/// when the trade date fails to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub ts_code: String,
    /// Trade date as `YYYYMMDD`.
    pub trade_date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub pre_close: f64,
    pub change: f64,
    pub pct_chg: f64,
    pub vol: f64,
    pub amount: f64,
    /// Epoch second of `trade_date` local midnight.
    pub date_stamp: f64,
}
