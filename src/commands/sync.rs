use std::path::Path;
use std::time::Duration;

use chrono::Local;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::models::SyncSummary;
use crate::services::store::{BatchWriter, ClickHouseStore};
use crate::services::sync::{StaticUniverse, SyncRunner};
use crate::services::tushare::TushareClient;

pub async fn run(
    start_date: String,
    end_date: Option<String>,
    codes: Option<String>,
    pacing_ms: u64,
    config_path: Option<&Path>,
) {
    if let Err(e) = run_inner(start_date, end_date, codes, pacing_ms, config_path).await {
        error!(error = %e, "Sync run aborted");
        std::process::exit(1);
    }
}

async fn run_inner(
    start_date: String,
    end_date: Option<String>,
    codes: Option<String>,
    pacing_ms: u64,
    config_path: Option<&Path>,
) -> Result<()> {
    // Fail fast on configuration and store reachability before any identifier
    // is processed.
    let config = AppConfig::load(config_path)?;
    let store = ClickHouseStore::new(&config.store);
    store.ping().await?;

    let end_date = end_date.unwrap_or_else(|| Local::now().format("%Y%m%d").to_string());
    let client = TushareClient::new(config.token.clone())?;

    let codes: Vec<String> = match codes {
        Some(list) => list
            .split(',')
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect(),
        None => match client.list_instruments().await {
            Ok(codes) => {
                info!(count = codes.len(), "Fetched instrument universe");
                codes
            }
            Err(e) => {
                warn!(error = %e, "Instrument listing failed, using fallback universe");
                Vec::new()
            }
        },
    };

    info!(
        start_date = %start_date,
        end_date = %end_date,
        instruments = codes.len(),
        pacing_ms,
        table = %config.store.table,
        "Starting daily sync"
    );

    let writer = BatchWriter::new(store, config.store.table.clone());
    let fallback = Box::new(StaticUniverse::new(config.fallback_codes.clone()));
    let runner = SyncRunner::new(client, writer, Duration::from_millis(pacing_ms), fallback);

    let outcomes = runner.run(&codes, &start_date, &end_date).await;
    let summary = SyncSummary::from_outcomes(&outcomes);

    println!(
        "Synced {} instruments: {} inserted ({} rows), {} empty, {} failed",
        summary.total(),
        summary.succeeded,
        summary.rows_inserted,
        summary.empty,
        summary.failed
    );

    Ok(())
}
