//! Columnar batching and the ClickHouse-backed store.
//!
//! The writer turns typed records into one [`ColumnBatch`] per sync unit:
//! equal-length typed buffers keyed by destination column name, index-aligned
//! so that position `i` across every buffer describes one record. The batch is
//! handed opaquely to a [`ColumnStore`]; how it maps onto the wire is the
//! store's concern.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::config::StoreConfig;
use crate::constants::column;
use crate::error::{AppError, Result};
use crate::models::DailyBar;

/// One typed column buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Str(Vec<String>),
    F64(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Str(values) => values.len(),
            Column::F64(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A set of equal-length column buffers keyed by destination field name.
///
/// Built once per sync unit, inserted once, then discarded.
#[derive(Debug, Clone, Default)]
pub struct ColumnBatch {
    columns: Vec<(String, Column)>,
}

impl ColumnBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named column. Alignment is checked at insert time.
    pub fn push(&mut self, name: impl Into<String>, column: Column) {
        self.columns.push((name.into(), column));
    }

    pub fn columns(&self) -> &[(String, Column)] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(column_name, _)| column_name == name)
            .map(|(_, column)| column)
    }

    /// Number of records described by the batch.
    pub fn row_count(&self) -> usize {
        self.columns
            .first()
            .map(|(_, column)| column.len())
            .unwrap_or(0)
    }

    /// True when every buffer has the same length.
    pub fn is_aligned(&self) -> bool {
        let rows = self.row_count();
        self.columns.iter().all(|(_, column)| column.len() == rows)
    }

    fn str_column(&self, name: &str) -> Result<&[String]> {
        match self.column(name) {
            Some(Column::Str(values)) => Ok(values),
            Some(_) => Err(AppError::Store(format!("column {} is not a string column", name))),
            None => Err(AppError::Store(format!("column {} missing from batch", name))),
        }
    }

    fn f64_column(&self, name: &str) -> Result<&[f64]> {
        match self.column(name) {
            Some(Column::F64(values)) => Ok(values),
            Some(_) => Err(AppError::Store(format!("column {} is not a float column", name))),
            None => Err(AppError::Store(format!("column {} missing from batch", name))),
        }
    }
}

/// Build the destination-shaped batch from typed records, in input order.
pub fn build_daily_batch(records: &[DailyBar]) -> ColumnBatch {
    let mut batch = ColumnBatch::new();
    batch.push(
        column::TS_CODE,
        Column::Str(records.iter().map(|bar| bar.ts_code.clone()).collect()),
    );
    batch.push(
        column::TRADE_DATE,
        Column::Str(records.iter().map(|bar| bar.trade_date.clone()).collect()),
    );
    batch.push(column::OPEN, Column::F64(records.iter().map(|bar| bar.open).collect()));
    batch.push(column::HIGH, Column::F64(records.iter().map(|bar| bar.high).collect()));
    batch.push(column::LOW, Column::F64(records.iter().map(|bar| bar.low).collect()));
    batch.push(column::CLOSE, Column::F64(records.iter().map(|bar| bar.close).collect()));
    batch.push(
        column::PRE_CLOSE,
        Column::F64(records.iter().map(|bar| bar.pre_close).collect()),
    );
    batch.push(
        column::CHANGE,
        Column::F64(records.iter().map(|bar| bar.change).collect()),
    );
    batch.push(
        column::PCT_CHG,
        Column::F64(records.iter().map(|bar| bar.pct_chg).collect()),
    );
    batch.push(column::VOL, Column::F64(records.iter().map(|bar| bar.vol).collect()));
    batch.push(
        column::AMOUNT,
        Column::F64(records.iter().map(|bar| bar.amount).collect()),
    );
    batch.push(
        column::DATE_STAMP,
        Column::F64(records.iter().map(|bar| bar.date_stamp).collect()),
    );
    batch
}

/// Write capability for a column-oriented store.
#[async_trait]
pub trait ColumnStore: Send + Sync {
    /// Bulk-insert every record of `batch` into `table`, returning the row
    /// count written.
    async fn insert(&self, table: &str, batch: &ColumnBatch) -> Result<u64>;
}

#[async_trait]
impl<S: ColumnStore + ?Sized> ColumnStore for std::sync::Arc<S> {
    async fn insert(&self, table: &str, batch: &ColumnBatch) -> Result<u64> {
        (**self).insert(table, batch).await
    }
}

/// Accumulates typed records into destination columns and issues one bulk
/// insert per sync unit.
pub struct BatchWriter<S> {
    store: S,
    table: String,
}

impl<S: ColumnStore> BatchWriter<S> {
    pub fn new(store: S, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Write `records` as one columnar batch.
    ///
    /// Empty input is a no-op returning 0; no zero-row insert is ever issued.
    pub async fn write(&self, records: &[DailyBar]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let batch = build_daily_batch(records);
        debug!(table = %self.table, rows = batch.row_count(), "Inserting columnar batch");
        self.store.insert(&self.table, &batch).await
    }
}

/// Wire row for the daily bar table. Field order matches the destination
/// schema.
#[derive(clickhouse::Row, Serialize)]
struct DailyBarRow<'a> {
    ts_code: &'a str,
    trade_date: &'a str,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    pre_close: f64,
    change: f64,
    pct_chg: f64,
    vol: f64,
    amount: f64,
    date_stamp: f64,
}

/// ClickHouse-backed [`ColumnStore`] over the HTTP interface.
///
/// One client handle is created at startup and reused for the whole run.
#[derive(Clone)]
pub struct ClickHouseStore {
    client: clickhouse::Client,
}

impl ClickHouseStore {
    pub fn new(config: &StoreConfig) -> Self {
        let client = clickhouse::Client::default()
            .with_url(config.url())
            .with_user(config.user.clone())
            .with_password(config.password.clone())
            .with_database(config.database.clone());
        Self { client }
    }

    /// Verify the store is reachable before any identifier is processed.
    pub async fn ping(&self) -> Result<()> {
        self.client
            .query("SELECT 1")
            .fetch_one::<u8>()
            .await
            .map_err(|e| AppError::Store(format!("ClickHouse is not reachable: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl ColumnStore for ClickHouseStore {
    async fn insert(&self, table: &str, batch: &ColumnBatch) -> Result<u64> {
        let rows = batch.row_count();
        if rows == 0 {
            return Ok(0);
        }
        if !batch.is_aligned() {
            return Err(AppError::Store(
                "column buffers are not equal length".to_string(),
            ));
        }

        let ts_code = batch.str_column(column::TS_CODE)?;
        let trade_date = batch.str_column(column::TRADE_DATE)?;
        let open = batch.f64_column(column::OPEN)?;
        let high = batch.f64_column(column::HIGH)?;
        let low = batch.f64_column(column::LOW)?;
        let close = batch.f64_column(column::CLOSE)?;
        let pre_close = batch.f64_column(column::PRE_CLOSE)?;
        let change = batch.f64_column(column::CHANGE)?;
        let pct_chg = batch.f64_column(column::PCT_CHG)?;
        let vol = batch.f64_column(column::VOL)?;
        let amount = batch.f64_column(column::AMOUNT)?;
        let date_stamp = batch.f64_column(column::DATE_STAMP)?;

        let mut insert = self.client.insert(table)?;
        for i in 0..rows {
            insert
                .write(&DailyBarRow {
                    ts_code: &ts_code[i],
                    trade_date: &trade_date[i],
                    open: open[i],
                    high: high[i],
                    low: low[i],
                    close: close[i],
                    pre_close: pre_close[i],
                    change: change[i],
                    pct_chg: pct_chg[i],
                    vol: vol[i],
                    amount: amount[i],
                    date_stamp: date_stamp[i],
                })
                .await?;
        }
        insert.end().await?;

        Ok(rows as u64)
    }
}
