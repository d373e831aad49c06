//! Per-instrument sync orchestration.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::models::{SyncOutcome, SyncStatus, SyncSummary};
use crate::services::decode::{self, Payload};
use crate::services::store::{BatchWriter, ColumnStore};
use crate::services::transform;
use crate::services::tushare::TushareClient;

/// Supplies the identifier universe when the caller has none.
///
/// What a reasonable smoke-test universe is belongs to deployment config,
/// not to the call site.
pub trait UniverseProvider: Send + Sync {
    fn identifiers(&self) -> Vec<String>;
}

/// Fixed universe, typically seeded from `fallback_codes` in config.
pub struct StaticUniverse(Vec<String>);

impl StaticUniverse {
    pub fn new(codes: Vec<String>) -> Self {
        Self(codes)
    }
}

impl UniverseProvider for StaticUniverse {
    fn identifiers(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// Sequential sync pipeline.
///
/// One instrument is fully processed (fetch, decode, transform, insert)
/// before the next begins, with a fixed pacing delay between successive API
/// calls. Nothing overlaps the delay.
pub struct SyncRunner<S> {
    client: TushareClient,
    writer: BatchWriter<S>,
    pacing: Duration,
    fallback: Box<dyn UniverseProvider>,
}

impl<S: ColumnStore> SyncRunner<S> {
    pub fn new(
        client: TushareClient,
        writer: BatchWriter<S>,
        pacing: Duration,
        fallback: Box<dyn UniverseProvider>,
    ) -> Self {
        Self {
            client,
            writer,
            pacing,
            fallback,
        }
    }

    /// Sync every identifier over `[start_date, end_date]`, in input order.
    ///
    /// Every per-identifier failure is captured in its outcome; the run never
    /// aborts early. An empty identifier list falls back to the configured
    /// universe provider.
    pub async fn run(
        &self,
        identifiers: &[String],
        start_date: &str,
        end_date: &str,
    ) -> Vec<SyncOutcome> {
        let fallback_codes;
        let codes = if identifiers.is_empty() {
            fallback_codes = self.fallback.identifiers();
            warn!(
                count = fallback_codes.len(),
                "No identifiers supplied, falling back to configured universe"
            );
            fallback_codes.as_slice()
        } else {
            identifiers
        };

        let total = codes.len();
        let mut outcomes = Vec::with_capacity(total);

        for (idx, ts_code) in codes.iter().enumerate() {
            if idx > 0 {
                sleep(self.pacing).await;
            }
            info!(current = idx + 1, total, ts_code = %ts_code, "Syncing instrument");

            let status = match self.sync_one(ts_code, start_date, end_date).await {
                Ok(status) => status,
                Err(e) => {
                    error!(ts_code = %ts_code, error = %e, "Sync failed, continuing with next instrument");
                    SyncStatus::Failed(e)
                }
            };

            outcomes.push(SyncOutcome {
                ts_code: ts_code.clone(),
                status,
            });
        }

        let summary = SyncSummary::from_outcomes(&outcomes);
        info!(
            succeeded = summary.succeeded,
            empty = summary.empty,
            failed = summary.failed,
            rows = summary.rows_inserted,
            "Sync run finished"
        );
        outcomes
    }

    /// One sync unit: fetch, decode, transform, write.
    async fn sync_one(&self, ts_code: &str, start_date: &str, end_date: &str) -> Result<SyncStatus> {
        let params = HashMap::from([
            ("ts_code".to_string(), ts_code.to_string()),
            ("start_date".to_string(), start_date.to_string()),
            ("end_date".to_string(), end_date.to_string()),
        ]);

        let raw = self.client.call("daily", &params).await?;
        let rows = match decode::decode(&raw)? {
            Payload::Empty => {
                info!(ts_code = %ts_code, "No data for range");
                return Ok(SyncStatus::Empty);
            }
            Payload::Rows(rows) => rows,
        };

        let bars = transform::transform(&rows)?;
        let inserted = self.writer.write(&bars).await?;
        info!(ts_code = %ts_code, rows = inserted, "Inserted rows");
        Ok(SyncStatus::Inserted(inserted))
    }
}
