use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::constants::DEFAULT_PACING_MS;

#[derive(Parser)]
#[command(name = "tushare-sync")]
#[command(about = "Tushare daily bar sync into ClickHouse", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pull daily bars and bulk-load them into the store
    Sync {
        /// First trade date to pull (YYYYMMDD)
        #[arg(long, default_value = "20240101")]
        start_date: String,

        /// Last trade date to pull (YYYYMMDD, defaults to today)
        #[arg(long)]
        end_date: Option<String>,

        /// Comma-separated ts_codes; defaults to the stock_basic listing
        #[arg(long)]
        codes: Option<String>,

        /// Delay between successive API calls, in milliseconds
        #[arg(long, default_value_t = DEFAULT_PACING_MS)]
        pacing_ms: u64,

        /// Path to config.json
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the listed-instrument universe
    Instruments {
        /// Path to config.json
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            start_date,
            end_date,
            codes,
            pacing_ms,
            config,
        } => {
            commands::sync::run(start_date, end_date, codes, pacing_ms, config.as_deref()).await;
        }
        Commands::Instruments { config } => {
            commands::instruments::run(config.as_deref()).await;
        }
    }
}
