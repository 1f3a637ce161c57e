use crate::lineage_registry::LineageRegistry;
use crate::lineage_tree::DivisionTree;
pub use capsim_data::{BacteriumSnapshot, LiveEvent, PopulationStats};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Endpoints and growth state of the whole population at one export tick.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PopulationFrame {
    pub tick: u64,
    pub time: f64,
    pub bacteria: Vec<BacteriumSnapshot>,
}

/// Parameters a run was started with, written once next to its logs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunManifest {
    pub config_fingerprint: String,
    pub seed: u64,
    pub started_at: String,
}

/// Append-only JSON-lines writer for run events and population frames.
///
/// The dummy logger writes nothing, which is what tests and benches use.
pub struct HistoryLogger {
    live_file: Option<BufWriter<File>>,
    frame_file: Option<BufWriter<File>>,
    log_dir: PathBuf,
}

impl std::fmt::Debug for HistoryLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryLogger")
            .field("log_dir", &self.log_dir)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

fn append(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BufWriter::new(file))
}

impl HistoryLogger {
    pub fn new_at<P: AsRef<Path>>(dir: P) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
        Ok(Self {
            live_file: Some(append(&dir.join("live.jsonl"))?),
            frame_file: Some(append(&dir.join("snapshots.jsonl"))?),
            log_dir: dir.to_path_buf(),
        })
    }

    pub fn new_dummy() -> Self {
        Self {
            live_file: None,
            frame_file: None,
            log_dir: PathBuf::new(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.live_file.is_some()
    }

    pub fn write_manifest(&self, manifest: &RunManifest) -> anyhow::Result<()> {
        if self.is_enabled() {
            let file = File::create(self.log_dir.join("run.json"))?;
            serde_json::to_writer_pretty(BufWriter::new(file), manifest)?;
        }
        Ok(())
    }

    pub fn log_event(&mut self, event: &LiveEvent) -> anyhow::Result<()> {
        if let Some(ref mut file) = self.live_file {
            let json = serde_json::to_string(event)?;
            writeln!(file, "{}", json)?;
        }
        Ok(())
    }

    pub fn log_frame(&mut self, frame: &PopulationFrame) -> anyhow::Result<()> {
        if let Some(ref mut file) = self.frame_file {
            let json = serde_json::to_string(frame)?;
            writeln!(file, "{}", json)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        if let Some(ref mut file) = self.live_file {
            file.flush()?;
        }
        if let Some(ref mut file) = self.frame_file {
            file.flush()?;
        }
        Ok(())
    }

    /// Archives the lineage registry (gzip JSON) and its division tree (DOT).
    pub fn archive_lineage(&self, registry: &LineageRegistry) -> anyhow::Result<()> {
        if self.is_enabled() {
            registry.save(self.log_dir.join("lineage.json.gz"))?;
            let dot = DivisionTree::build(registry).to_dot();
            std::fs::write(self.log_dir.join("divisions.dot"), dot)?;
        }
        Ok(())
    }

    pub fn get_snapshots(&self) -> anyhow::Result<Vec<(u64, PopulationStats)>> {
        let file = match File::open(self.log_dir.join("live.jsonl")) {
            Ok(f) => f,
            Err(_) => return Ok(vec![]),
        };
        let reader = BufReader::new(file);
        let mut snapshots = Vec::new();
        for l in reader.lines().map_while(Result::ok) {
            if let Ok(LiveEvent::Snapshot { tick, stats, .. }) =
                serde_json::from_str::<LiveEvent>(&l)
            {
                snapshots.push((tick, stats));
            }
        }
        Ok(snapshots)
    }

    pub fn get_frames(&self) -> anyhow::Result<Vec<PopulationFrame>> {
        let file = match File::open(self.log_dir.join("snapshots.jsonl")) {
            Ok(f) => f,
            Err(_) => return Ok(vec![]),
        };
        let reader = BufReader::new(file);
        let mut frames = Vec::new();
        for l in reader.lines().map_while(Result::ok) {
            if let Ok(frame) = serde_json::from_str::<PopulationFrame>(&l) {
                frames.push(frame);
            }
        }
        Ok(frames)
    }
}

impl Drop for HistoryLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "Failed to flush history logs");
        }
    }
}
