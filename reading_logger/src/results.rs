use anyhow::Context;
use chrono::{DateTime, Local};
use segment_reader::Reading;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One logged tick, as written by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord {
    pub tick: u64,
    pub timestamp: DateTime<Local>,
    /// Frame file the reading came from.
    pub source: String,
    pub reading: Reading,
    pub value: Option<f64>,
}

impl ResultRecord {
    pub fn new(tick: u64, source: &Path, reading: Reading) -> Self {
        Self {
            tick,
            timestamp: Local::now(),
            source: source.display().to_string(),
            reading,
            value: reading.value(),
        }
    }
}

/// Append-only results file, one line per tick.
pub struct ResultsLog {
    path: PathBuf,
    writer: BufWriter<File>,
    json: bool,
    lines: u64,
}

/// `results_<YYYY-MM-DD_HH-MM-SS.ffffff>.txt`
pub fn results_file_name(now: &DateTime<Local>) -> String {
    format!("results_{}.txt", now.format("%Y-%m-%d_%H-%M-%S%.6f"))
}

impl ResultsLog {
    /// Creates a fresh, uniquely named results file in `dir`.
    pub fn create(dir: &Path, json: bool) -> anyhow::Result<Self> {
        std::fs::create_dir_all(dir).with_context(|| format!("creating results directory {}", dir.display()))?;
        let path = dir.join(results_file_name(&Local::now()));
        let file = File::create(&path).with_context(|| format!("creating results file {}", path.display()))?;
        log::info!("writing results to {}", path.display());
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            json,
            lines: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    /// Appends one line and flushes, so a killed logger loses at most the tick
    /// in progress.
    pub fn record(&mut self, record: &ResultRecord) -> anyhow::Result<()> {
        if self.json {
            serde_json::to_writer(&mut self.writer, record).context("serializing result")?;
            self.writer.write_all(b"\n")?;
        } else {
            writeln!(self.writer, "{}", record.reading)?;
        }
        self.writer.flush().context("flushing results file")?;
        self.lines += 1;
        Ok(())
    }
}
