use crate::tuning::{parse_bounds, DEFAULT_TUNING_FILE};
use clap::{Args, Parser, Subcommand};
use segment_reader::ThresholdBounds;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "reading_logger")]
#[command(about = "Log readings of a seven-segment LED display from camera frames")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Re-read one frame file every tick and log its reading.
    Watch(WatchArgs),

    /// Read every image in a directory once, concurrently.
    Batch(BatchArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Tuning file with the threshold and focus values.
    #[arg(long, global = true, default_value = DEFAULT_TUNING_FILE)]
    pub config: PathBuf,

    /// Directory the results file is created in.
    #[arg(long, global = true, default_value = ".")]
    pub results_dir: PathBuf,

    /// Write the mask and display-region images of every frame here.
    #[arg(long, global = true)]
    pub dump_dir: Option<PathBuf>,

    /// Threshold override: lh,ls,lv,hh,hs,hv.
    #[arg(long, global = true, value_parser = parse_bounds)]
    pub bounds: Option<ThresholdBounds>,

    /// Write the effective tuning values back to the tuning file on exit.
    #[arg(long, global = true)]
    pub save_config: bool,

    /// Write one JSON object per line instead of the bare reading.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    /// Frame file to sample; may be refreshed by an external capture process.
    #[arg(long)]
    pub frame: PathBuf,

    /// Stop after this many ticks. Runs until Ctrl-C otherwise.
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Sampling period in milliseconds.
    #[arg(long, default_value = "1000")]
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    /// Directory of frame images.
    #[arg(long)]
    pub frames: PathBuf,

    /// Worker tasks (default: one per CPU).
    #[arg(long)]
    pub workers: Option<usize>,
}
