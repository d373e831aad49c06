//! Raw tabular rows into typed daily bars.

use crate::constants::{daily_field, DAILY_FIELD_COUNT};
use crate::error::{AppError, Result};
use crate::models::DailyBar;
use crate::services::decode::RawRow;
use crate::utils::to_timestamp;

/// Transform raw `daily` rows into typed records, preserving input order.
///
/// Fails on the first row that is shorter than the fixed schema or carries an
/// uncoercible cell; no partial record is emitted for a bad row.
pub fn transform(rows: &[RawRow]) -> Result<Vec<DailyBar>> {
    let mut bars = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        bars.push(transform_row(idx, row)?);
    }
    Ok(bars)
}

fn transform_row(idx: usize, row: &RawRow) -> Result<DailyBar> {
    if row.len() < DAILY_FIELD_COUNT {
        return Err(AppError::SchemaMismatch {
            row: idx,
            reason: format!("expected {} fields, got {}", DAILY_FIELD_COUNT, row.len()),
        });
    }

    let ts_code = string_field(idx, row, daily_field::TS_CODE, "ts_code")?;
    let trade_date = string_field(idx, row, daily_field::TRADE_DATE, "trade_date")?;
    let date_stamp = to_timestamp(&trade_date);

    Ok(DailyBar {
        ts_code,
        trade_date,
        open: float_field(idx, row, daily_field::OPEN, "open")?,
        high: float_field(idx, row, daily_field::HIGH, "high")?,
        low: float_field(idx, row, daily_field::LOW, "low")?,
        close: float_field(idx, row, daily_field::CLOSE, "close")?,
        pre_close: float_field(idx, row, daily_field::PRE_CLOSE, "pre_close")?,
        change: float_field(idx, row, daily_field::CHANGE, "change")?,
        pct_chg: float_field(idx, row, daily_field::PCT_CHG, "pct_chg")?,
        vol: float_field(idx, row, daily_field::VOL, "vol")?,
        amount: float_field(idx, row, daily_field::AMOUNT, "amount")?,
        date_stamp,
    })
}

fn string_field(row_idx: usize, row: &RawRow, pos: usize, name: &str) -> Result<String> {
    row[pos]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| AppError::SchemaMismatch {
            row: row_idx,
            reason: format!("{} (field {}) is not a string: {}", name, pos, row[pos]),
        })
}

fn float_field(row_idx: usize, row: &RawRow, pos: usize, name: &str) -> Result<f64> {
    row[pos].as_f64().ok_or_else(|| AppError::SchemaMismatch {
        row: row_idx,
        reason: format!("{} (field {}) is not numeric: {}", name, pos, row[pos]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use serde_json::json;

    fn valid_row(ts_code: &str, trade_date: &str) -> RawRow {
        vec![
            json!(ts_code),
            json!(trade_date),
            json!(10.0),
            json!(10.5),
            json!(9.8),
            json!(10.2),
            json!(9.9),
            json!(0.3),
            json!(3.03),
            json!(120000),
            json!(1220000),
        ]
    }

    #[test]
    fn test_valid_row() {
        let bars = transform(&[valid_row("000001.SZ", "20240102")]).unwrap();
        assert_eq!(bars.len(), 1);

        let bar = &bars[0];
        assert_eq!(bar.ts_code, "000001.SZ");
        assert_eq!(bar.trade_date, "20240102");
        assert_eq!(bar.open, 10.0);
        assert_eq!(bar.high, 10.5);
        assert_eq!(bar.low, 9.8);
        assert_eq!(bar.close, 10.2);
        assert_eq!(bar.pre_close, 9.9);
        assert_eq!(bar.change, 0.3);
        assert_eq!(bar.pct_chg, 3.03);
        assert_eq!(bar.vol, 120000.0);
        assert_eq!(bar.amount, 1220000.0);

        let expected_stamp = Local
            .with_ymd_and_hms(2024, 1, 2, 0, 0, 0)
            .earliest()
            .unwrap()
            .timestamp() as f64;
        assert_eq!(bar.date_stamp, expected_stamp);
    }

    #[test]
    fn test_unparseable_trade_date_stamps_zero() {
        let bars = transform(&[valid_row("000001.SZ", "not-a-date")]).unwrap();
        assert_eq!(bars[0].date_stamp, 0.0);
    }

    #[test]
    fn test_short_row_reports_index() {
        let rows = vec![valid_row("000001.SZ", "20240102"), vec![json!("600519.SH")]];
        match transform(&rows).unwrap_err() {
            AppError::SchemaMismatch { row, reason } => {
                assert_eq!(row, 1);
                assert!(reason.contains("expected 11 fields"));
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_cell_fails() {
        let mut row = valid_row("000001.SZ", "20240102");
        row[daily_field::CLOSE] = json!("n/a");
        match transform(&[row]).unwrap_err() {
            AppError::SchemaMismatch { row, reason } => {
                assert_eq!(row, 0);
                assert!(reason.contains("close"));
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_in_string_position_fails() {
        let mut row = valid_row("000001.SZ", "20240102");
        row[daily_field::TS_CODE] = json!(1.0);
        assert!(matches!(
            transform(&[row]).unwrap_err(),
            AppError::SchemaMismatch { row: 0, .. }
        ));
    }

    #[test]
    fn test_order_preserved() {
        let rows = vec![
            valid_row("000001.SZ", "20240104"),
            valid_row("000001.SZ", "20240103"),
            valid_row("000001.SZ", "20240102"),
        ];
        let bars = transform(&rows).unwrap();
        let dates: Vec<&str> = bars.iter().map(|b| b.trade_date.as_str()).collect();
        assert_eq!(dates, vec!["20240104", "20240103", "20240102"]);
    }

    #[test]
    fn test_transform_is_idempotent() {
        let rows = vec![
            valid_row("000001.SZ", "20240102"),
            valid_row("600519.SH", "20240103"),
        ];
        assert_eq!(transform(&rows).unwrap(), transform(&rows).unwrap());
    }
}
