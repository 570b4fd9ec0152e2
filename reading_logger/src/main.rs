mod cli;
mod frame_source;
mod results;
mod tuning;

use anyhow::Context;
use clap::Parser;
use cli::{BatchArgs, Cli, Commands, WatchArgs};
use log::{info, warn};
use results::{ResultRecord, ResultsLog};
use segment_reader::core_modules::utils::image_helper::image_helper;
use segment_reader::{
    BatchDecoder, DecoderConfig, DisplayDecoder, FrameAnalysis, Reading, ThresholdBounds, UnreadableCause,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tuning::TuningConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Logging & Argument Parsing ---
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // --- 2. Tuning ---
    let mut tuning = TuningConfig::load(&cli.common.config)?;
    if let Some(bounds) = cli.common.bounds {
        tuning.bounds = bounds;
    }
    if !tuning.bounds.is_well_formed() {
        warn!(
            "threshold bounds {:?} have a lower value above an upper one; nothing will be selected",
            tuning.bounds.to_values()
        );
    }
    info!(
        "threshold {:?}, camera focus {}",
        tuning.bounds.to_values(),
        tuning.camera_focus()
    );

    // --- 3. Outputs ---
    let mut results = ResultsLog::create(&cli.common.results_dir, cli.common.json)?;
    if let Some(dir) = &cli.common.dump_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating dump directory {}", dir.display()))?;
    }
    let dump_dir = cli.common.dump_dir.as_deref();

    // --- 4. Run ---
    match cli.command {
        Commands::Watch(args) => {
            let decoder = DisplayDecoder::new(DecoderConfig::default())?;
            run_watch(&args, &decoder, tuning.bounds, &mut results, dump_dir).await?;
        }
        Commands::Batch(args) => {
            run_batch(&args, DecoderConfig::default(), tuning.bounds, &mut results, dump_dir).await?;
        }
    }
    info!("{} readings written to {}", results.lines_written(), results.path().display());

    // --- 5. Persist Tuning ---
    if cli.common.save_config {
        tuning.save(&cli.common.config)?;
        info!("tuning values saved to {}", cli.common.config.display());
    }

    Ok(())
}

/// Samples `args.frame` once per tick until the tick budget runs out or Ctrl-C.
async fn run_watch(
    args: &WatchArgs,
    decoder: &DisplayDecoder,
    bounds: ThresholdBounds,
    results: &mut ResultsLog,
    dump_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(Duration::from_millis(args.interval_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut tick = 0u64;
    while args.ticks.is_none_or(|budget| tick < budget) {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut ctrl_c => {
                info!("interrupted after {tick} ticks");
                break;
            }
        }

        let reading = match frame_source::load_frame(&args.frame) {
            Ok(frame) => {
                let analysis = decoder.decode(&frame, &bounds);
                dump(dump_dir, tick, &analysis);
                analysis.reading
            }
            Err(err) => {
                warn!("tick {tick}: {err:#}");
                Reading::Unreadable(UnreadableCause::NoDisplayFound)
            }
        };

        info!("laser reading: {reading}");
        results.record(&ResultRecord::new(tick, &args.frame, reading))?;
        tick += 1;
    }
    Ok(())
}

/// Reads every frame in `args.frames` on a worker pool; one line per frame in
/// file-name order.
async fn run_batch(
    args: &BatchArgs,
    config: DecoderConfig,
    bounds: ThresholdBounds,
    results: &mut ResultsLog,
    dump_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let paths: Vec<PathBuf> = frame_source::list_frames(&args.frames)?;
    if paths.is_empty() {
        warn!("no image files in {}", args.frames.display());
        return Ok(());
    }
    let frames = paths
        .iter()
        .map(|path| frame_source::load_frame(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let batch = BatchDecoder::new(config, args.workers)?;
    info!("decoding {} frames on {} workers", frames.len(), batch.worker_count());
    let analyses = batch.decode_all(frames, bounds).await?;
    batch.shutdown().await;

    for (tick, (path, analysis)) in (0u64..).zip(paths.iter().zip(&analyses)) {
        dump(dump_dir, tick, analysis);
        info!("{}: {}", path.display(), analysis.reading);
        results.record(&ResultRecord::new(tick, path, analysis.reading))?;
    }
    Ok(())
}

fn dump(dump_dir: Option<&Path>, tick: u64, analysis: &FrameAnalysis) {
    let Some(dir) = dump_dir else {
        return;
    };
    if let Err(err) = image_helper::dump_analysis(dir, tick, analysis) {
        warn!("tick {tick}: could not write diagnostic images: {err}");
    }
}
