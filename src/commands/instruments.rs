use std::path::Path;

use tracing::error;

use crate::config::AppConfig;
use crate::error::Result;
use crate::services::tushare::TushareClient;

pub async fn run(config_path: Option<&Path>) {
    if let Err(e) = run_inner(config_path).await {
        error!(error = %e, "Instrument listing failed");
        std::process::exit(1);
    }
}

async fn run_inner(config_path: Option<&Path>) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let client = TushareClient::new(config.token)?;

    let codes = client.list_instruments().await?;
    for code in &codes {
        println!("{}", code);
    }
    eprintln!("{} instruments listed", codes.len());

    Ok(())
}
