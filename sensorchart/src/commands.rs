use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sensorchart", version, about = "Sensor time-series charting CLI")]
pub struct Cli {
    /// Config file (defaults to $SENSORCHART_CONFIG, then ./sensorchart.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the sensors found in a feed snapshot
    Sensors {
        snapshot: PathBuf,
        #[arg(long, alias = "jq")]
        json_query: bool,
    },
    /// Build the single-sensor chart
    Render {
        snapshot: PathBuf,
        /// Sensor to show; remembered for the next run
        #[arg(long)]
        sensor: Option<String>,
        /// Window ordinal (0 = 15 minutes .. 3 = 1 week)
        #[arg(long)]
        window: Option<usize>,
        /// Channel group to show (tsl2591, as7341); repeatable
        #[arg(long = "show")]
        show: Vec<String>,
        /// Evaluation time in epoch seconds (defaults to now)
        #[arg(long)]
        now: Option<i64>,
        #[arg(long, alias = "jq")]
        json_query: bool,
    },
    /// Build the multi-sensor overview
    Overview {
        snapshot: PathBuf,
        /// Window ordinal (0 = 15m .. 5 = 1w)
        #[arg(long)]
        window: Option<usize>,
        #[arg(long)]
        now: Option<i64>,
        #[arg(long, alias = "jq")]
        json_query: bool,
    },
}
